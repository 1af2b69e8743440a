//! This module implements the error type surfaced by every fallible
//! operation in the container subsystem.
//!
//! Errors partition into four kinds (argument, usage, callback-propagated,
//! resource exhaustion); see the crate-level documentation for the
//! taxonomy. All four are variants of one flat [`ErrorKind`] enum, following
//! the same shape used throughout this codebase's own error types: a single
//! enum, a hand-written [`Display`] impl, and `From` impls for the handful
//! of external error types that get wrapped rather than converted.

use std::error;
use std::fmt::{self, Display};

/// Every error this crate can produce, named after the host-visible error
/// code it corresponds to.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    /// `Array.length = n` where `n` is negative or not an integer.
    ArrayLengthNotPositiveInteger,

    /// An index or count argument fell outside the range the operation
    /// accepts (e.g. a negative `deleteCount`, sort flags out of range).
    ArgumentOutOfRange { what: &'static str },

    /// `Vector.get`/`set`/`delete` with an index `>= length` (get/delete) or
    /// `> length` (set).
    VectorIndexOutOfRange { index: u32, length: u32 },

    /// An operation would change the length of a `fixed` Vector.
    VectorFixedLengthChange,

    /// A method closure (a callable with a bound receiver) was invoked with
    /// a non-null, different `this`.
    CallbackMethodThisNotNull,

    /// A single-item-only XMLList method was called on a list whose length
    /// is not exactly 1.
    XMLListOneItemOnly { length: usize },

    /// A property or node reference that should exist does not.
    UndefinedReference { what: &'static str },

    /// A value could not be coerced/cast to the type an operation required.
    CastError { expected: &'static str, found: &'static str },

    /// Capacity overflow beyond `u32::MAX` entries, or an allocation that
    /// could not be satisfied.
    OutOfMemory,

    /// An error raised by a user-supplied comparator or iteration callback
    /// (`sort`, `sortOn`, `every`, `some`, `filter`, `map`, `forEach`),
    /// propagated as-is to the caller.
    Callback(Box<ErrorKind>),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ArrayLengthNotPositiveInteger => {
                write!(f, "Array length must be a positive integer")
            }

            ErrorKind::ArgumentOutOfRange { what } => {
                write!(f, "argument out of range: {what}")
            }

            ErrorKind::VectorIndexOutOfRange { index, length } => {
                write!(
                    f,
                    "Vector index {index} out of range (length is {length})"
                )
            }

            ErrorKind::VectorFixedLengthChange => {
                write!(f, "cannot change the length of a fixed-length Vector")
            }

            ErrorKind::CallbackMethodThisNotNull => {
                write!(
                    f,
                    "cannot invoke a method closure with a non-null `this` value"
                )
            }

            ErrorKind::XMLListOneItemOnly { length } => {
                write!(
                    f,
                    "this method only operates on an XMLList with a single item, but the list has {length}"
                )
            }

            ErrorKind::UndefinedReference { what } => {
                write!(f, "undefined reference: {what}")
            }

            ErrorKind::CastError { expected, found } => {
                write!(f, "cannot cast {found} to {expected}")
            }

            ErrorKind::OutOfMemory => write!(f, "out of memory"),

            ErrorKind::Callback(inner) => write!(f, "{inner}"),
        }
    }
}

impl error::Error for ErrorKind {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ErrorKind::Callback(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

impl ErrorKind {
    /// Returns `true` for errors that are synchronously thrown as a direct
    /// consequence of an argument value, before any container state was
    /// mutated.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::ArrayLengthNotPositiveInteger
                | ErrorKind::ArgumentOutOfRange { .. }
                | ErrorKind::VectorIndexOutOfRange { .. }
        )
    }

    /// Returns `true` for errors raised because an operation is not valid
    /// given the container's current state (as opposed to a bad argument).
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::VectorFixedLengthChange
                | ErrorKind::CallbackMethodThisNotNull
                | ErrorKind::XMLListOneItemOnly { .. }
        )
    }

    /// Wrap `self` as having originated from a user-supplied callback.
    pub fn into_callback_error(self) -> ErrorKind {
        ErrorKind::Callback(Box::new(self))
    }
}

pub type Result<T> = std::result::Result<T, ErrorKind>;

//! ECMAScript coercions and the array-index parsing rules.
//!
//! The concrete AS3 value representation (the tagged union of null / bool /
//! number / string / object that the host's dynamic-object system exposes)
//! is out of scope for this crate. Instead, containers are generic over any
//! `V: EcmaValue`, and this module defines the coercions the core needs on
//! top of that trait plus the canonical string->index parser.

use std::borrow::Cow;

/// The four standard ECMAScript coercions the containers rely on, plus the
/// handful of constructors/predicates needed to recognise `undefined`/`null`
/// without assuming a concrete value representation.
pub trait EcmaValue: Clone + std::fmt::Debug {
    fn to_uint32(&self) -> u32;
    fn to_number(&self) -> f64;
    fn to_string_value(&self) -> Cow<'_, str>;
    fn to_boolean(&self) -> bool;

    fn is_undefined(&self) -> bool;
    fn is_null(&self) -> bool;

    fn undefined() -> Self;
    fn null() -> Self;

    /// Construct a host number value, e.g. to report an index back to AS3
    /// code (iteration-callback arguments, `sort(RETURNINDEXEDARRAY)`).
    fn from_number(n: f64) -> Self;

    /// Read a named own/inherited property off this value, as `sortOn`'s
    /// per-key extraction does. Primitive values (numbers, strings,
    /// booleans, `undefined`, `null`) have no properties and return `None`.
    fn get_property(&self, name: &str) -> Option<Self>;
}

/// A validated AS3 array index: any `u32` other than `u32::MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArrayIndex(u32);

impl ArrayIndex {
    pub const MAX: u32 = u32::MAX - 1;

    pub fn new(value: u32) -> Option<Self> {
        if value == u32::MAX {
            None
        } else {
            Some(ArrayIndex(value))
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Coerce an arbitrary host value to an array index: non-negative,
    /// non-fractional values below `u32::MAX` coerce directly; everything
    /// else round-trips through `ToString` and the canonical decimal parser.
    pub fn from_value<V: EcmaValue>(value: &V) -> Option<Self> {
        let n = value.to_number();
        if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n < u32::MAX as f64 {
            return Self::new(n as u32);
        }

        parse_array_index(&value.to_string_value(), false).and_then(Self::new)
    }
}

impl From<ArrayIndex> for u32 {
    fn from(index: ArrayIndex) -> u32 {
        index.0
    }
}

/// Canonical decimal parser for string -> array index.
///
/// A string coerces to an index iff it is the canonical decimal
/// representation (no leading zeroes, except the literal `"0"`) of a value
/// in `[0, u32::MAX)`. `allow_leading_zeroes` is only ever set when
/// re-deriving a key from an already-validated `u32` (e.g. when rebuilding
/// hash-table chains from numeric keys); it must never be set for untrusted
/// host input.
pub fn parse_array_index(s: &str, allow_leading_zeroes: bool) -> Option<u32> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    if !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if !allow_leading_zeroes && bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }

    let value: u64 = s.parse().ok()?;
    if value >= u32::MAX as u64 {
        return None;
    }

    Some(value as u32)
}

//! `mariana-containers` implements the core dynamic container subsystem of
//! an ActionScript 3 / AVM2 runtime: the `Array` object, the typed `Vector`,
//! and `XMLList`. See each module for the collaborator traits a host
//! implements to plug its own value and object representations in.
//!
//! The concrete AS3 value representation, the host's dynamic-object and
//! prototype-chain system, and its XML tree are all out of scope: this
//! crate is generic over a handful of collaborator traits ([`EcmaValue`],
//! [`HostObject`], [`Callable`], [`XmlNode`]) that a host implements once to
//! plug its own representations in. See [`coercion`] and [`host`] for the
//! seam.

mod array;
mod cell;
mod coercion;
mod error;
mod hash_table;
mod host;
#[cfg(test)]
mod properties;
mod sort;
#[cfg(test)]
mod test_support;
mod vector;
mod xmllist;

pub use array::{Array, ConcatArg, SortResult, DENSE_SMALL, DENSE_TO_HASH, HASH_TO_DENSE, MAX_PREALLOC};
pub use cell::Value;
pub use coercion::{parse_array_index, ArrayIndex, EcmaValue};
pub use error::{ErrorKind, Result};
pub use host::{Callable, HostObject, XmlNode};
pub use sort::SortFlags;
pub use vector::{Vector, VectorElement};
pub use xmllist::{Assignment, GeneralisedName, Link, LinkTarget, QName, XMLList};

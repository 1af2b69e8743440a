//! The Array container: adaptive storage plus the full AS3 method surface
//! on top of it.

mod object;
mod storage;

pub use object::{Array, ConcatArg, SortResult};
pub use storage::{DENSE_SMALL, DENSE_TO_HASH, HASH_TO_DENSE, MAX_PREALLOC};

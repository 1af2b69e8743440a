//! Adaptive dense/hash storage engine for Array.
//!
//! One wrapper type, two backing representations, transitions fully
//! encapsulated behind the wrapper's methods — the same idiom as this
//! codebase's own adaptive-representation container, whose `AttrsRep` enum
//! picks between an empty/two-field/map backing depending on the workload.
//! Here the choice is dense-vector-vs-hash-table, driven by load factor
//! rather than element count.

use crate::cell::Value;
use crate::coercion::EcmaValue;
use crate::error::{ErrorKind, Result};
use crate::hash_table::HashTable;

/// Below this `total_count`, an array always stays dense regardless of
/// load factor.
pub const DENSE_SMALL: usize = 16;

/// Load factor threshold (numerator over 64) below which dense storage is
/// abandoned in favour of a hash table.
pub const DENSE_TO_HASH: u64 = 32;

/// Load factor threshold (numerator over 64) above which a hash-backed
/// array transitions back to dense storage.
pub const HASH_TO_DENSE: u64 = 36;

/// Cap on constructor preallocation; arrays logically larger than this
/// simply start with empty backing storage.
pub const MAX_PREALLOC: u32 = 1 << 20;

/// Largest length for which dense storage is permitted at all.
const DENSE_LENGTH_LIMIT: u64 = i32::MAX as u64;

fn load_factor_64(non_empty_count: usize, length: u32) -> u64 {
    if length == 0 {
        return 64;
    }
    (non_empty_count as u128 * 64 / length as u128) as u64
}

/// `total_count` (not `non_empty_count`) gates the small-array exemption: a
/// sparsely-filled but small-backing-store dense array (few slots ever
/// touched) must stay dense, independent of how many of those slots are
/// still live.
fn dense_disallowed(length: u32, total_count: usize, non_empty_count: usize) -> bool {
    if length as u64 > DENSE_LENGTH_LIMIT {
        return true;
    }
    total_count > DENSE_SMALL && load_factor_64(non_empty_count, length) < DENSE_TO_HASH
}

/// `length` (not `non_empty_count`) gates the small-array exemption here:
/// a hash array never has `length <= DENSE_SMALL` to begin with (see
/// `dense_disallowed`), so once one does fall that low it always converts
/// back, regardless of how few of its slots are live.
fn should_become_dense(length: u32, non_empty_count: usize) -> bool {
    length as usize <= DENSE_SMALL
        || (length as u64 <= DENSE_LENGTH_LIMIT && load_factor_64(non_empty_count, length) >= HASH_TO_DENSE)
}

#[derive(Clone, Debug)]
enum Repr<V> {
    /// `total_count` is one past the highest non-empty index; no Empty
    /// cell exists at or after it.
    Dense { values: Vec<Value<V>>, total_count: usize },
    Hash(HashTable<V>),
}

#[derive(Clone, Debug)]
pub(crate) struct ArrayStorage<V> {
    repr: Repr<V>,
    length: u32,
}

impl<V: EcmaValue> ArrayStorage<V> {
    pub fn new() -> Self {
        ArrayStorage {
            repr: Repr::Dense {
                values: Vec::new(),
                total_count: 0,
            },
            length: 0,
        }
    }

    /// Construct with a logical length, preallocating backing storage up
    /// to `MAX_PREALLOC` to bound the memory an attacker-controlled length
    /// can force this to allocate.
    pub fn with_length(length: u32) -> Self {
        let prealloc = length.min(MAX_PREALLOC) as usize;
        ArrayStorage {
            repr: Repr::Dense {
                values: std::iter::repeat_with(|| Value::Empty).take(prealloc).collect(),
                total_count: 0,
            },
            length,
        }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn is_dense(&self) -> bool {
        matches!(self.repr, Repr::Dense { .. })
    }

    pub fn non_empty_count(&self) -> usize {
        match &self.repr {
            Repr::Dense { values, .. } => values.iter().filter(|v| !v.is_empty()).count(),
            Repr::Hash(t) => t.non_empty_count,
        }
    }

    pub fn get(&self, index: u32) -> Value<V> {
        match &self.repr {
            Repr::Dense { values, .. } => values
                .get(index as usize)
                .cloned()
                .unwrap_or(Value::Empty),
            Repr::Hash(t) => t.get(index).clone(),
        }
    }

    pub fn has(&self, index: u32) -> bool {
        !self.get(index).is_empty()
    }

    /// Assign `value` at `index`. The caller is responsible for having
    /// already rejected `index == u32::MAX`: that index is never a valid
    /// array index and must fall through to the host property setter
    /// instead of reaching storage at all.
    pub fn set(&mut self, index: u32, value: Value<V>) {
        debug_assert!(index != u32::MAX);
        self.length = self.length.max(index.saturating_add(1));

        match &mut self.repr {
            Repr::Dense { values, total_count } => {
                let idx = index as usize;
                if idx >= values.len() {
                    values.resize_with((idx + 1).max(values.len() * 2), || Value::Empty);
                }
                let was_empty = values[idx].is_empty();
                values[idx] = value;
                if !was_empty || idx + 1 > *total_count {
                    *total_count = (*total_count).max(idx + 1);
                }
            }
            Repr::Hash(t) => {
                t.set(index, value);
            }
        }

        self.maybe_transition();
    }

    pub fn delete(&mut self, index: u32) {
        match &mut self.repr {
            Repr::Dense { values, total_count } => {
                if let Some(slot) = values.get_mut(index as usize) {
                    *slot = Value::Empty;
                }
                if index as usize + 1 == *total_count {
                    while *total_count > 0 && values[*total_count - 1].is_empty() {
                        *total_count -= 1;
                    }
                }
            }
            Repr::Hash(t) => {
                t.delete(index);
            }
        }

        self.maybe_transition();
    }

    /// `Array.length = n`: delete everything at or beyond `n`, then update
    /// the logical length.
    pub fn set_length(&mut self, n: u32) -> Result<()> {
        if n < self.length {
            match &mut self.repr {
                Repr::Dense { values, total_count } => {
                    for v in values.iter_mut().skip(n as usize) {
                        *v = Value::Empty;
                    }
                    *total_count = (*total_count).min(n as usize);
                }
                Repr::Hash(t) => {
                    let keys_to_drop: Vec<u32> = t
                        .iter()
                        .map(|(k, _)| k)
                        .filter(|&k| k >= n)
                        .collect();
                    for k in keys_to_drop {
                        t.delete(k);
                    }
                }
            }
        }
        self.length = n;
        self.maybe_transition();
        Ok(())
    }

    fn maybe_transition(&mut self) {
        let length = self.length;
        let non_empty = self.non_empty_count();

        match &self.repr {
            Repr::Dense { total_count, .. } if dense_disallowed(length, *total_count, non_empty) => {
                self.transition_to_hash();
            }
            Repr::Hash(_) if should_become_dense(length, non_empty) => {
                self.transition_to_dense();
            }
            _ => {}
        }
    }

    fn transition_to_hash(&mut self) {
        let old = std::mem::replace(
            &mut self.repr,
            Repr::Dense {
                values: Vec::new(),
                total_count: 0,
            },
        );
        if let Repr::Dense { values, .. } = old {
            self.repr = Repr::Hash(HashTable::from_dense(values));
        }
    }

    fn transition_to_dense(&mut self) {
        let old = std::mem::replace(&mut self.repr, Repr::Hash(HashTable::new()));
        if let Repr::Hash(table) = old {
            let values = table.into_dense(self.length);
            let total_count = values
                .iter()
                .rposition(|v| !v.is_empty())
                .map(|i| i + 1)
                .unwrap_or(0);
            self.repr = Repr::Dense { values, total_count };
        }
    }

    /// Iterate over every live `(index, value)` pair in storage order
    /// (ascending index for dense, table order for hash).
    pub fn iter(&self) -> Box<dyn Iterator<Item = (u32, &Value<V>)> + '_> {
        match &self.repr {
            Repr::Dense { values, .. } => Box::new(
                values
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| !v.is_empty())
                    .map(|(i, v)| (i as u32, v)),
            ),
            Repr::Hash(t) => Box::new(t.iter()),
        }
    }

    /// `shift`/`unshift`/`reverse`/`splice`'s tail-shift step need to
    /// rewrite every key at once; `rekey` implements that uniformly across
    /// representations. `f` maps an old index to a new one, or `None` to
    /// drop the entry. After rekeying, `length` is updated to
    /// `new_length` and a representation transition is (re-)evaluated.
    pub fn rekey(&mut self, f: impl Fn(u32) -> Option<u32>, new_length: u32) {
        match &mut self.repr {
            Repr::Dense { values, total_count } => {
                let old: Vec<Value<V>> = std::mem::take(values);
                let old_total = *total_count;
                let mut new_values: Vec<Value<V>> = Vec::with_capacity(old.len());
                new_values.resize_with(old.len(), || Value::Empty);
                let mut new_total = 0usize;
                for (i, v) in old.into_iter().enumerate().take(old_total) {
                    if v.is_empty() {
                        continue;
                    }
                    if let Some(new_key) = f(i as u32) {
                        let idx = new_key as usize;
                        if idx >= new_values.len() {
                            new_values.resize_with(idx + 1, || Value::Empty);
                        }
                        new_values[idx] = v;
                        new_total = new_total.max(idx + 1);
                    }
                }
                *values = new_values;
                *total_count = new_total;
            }
            Repr::Hash(t) => t.rekey_all(f),
        }
        self.length = new_length;
        self.maybe_transition();
    }

    /// Clear and reset to a fresh dense empty array of the given length
    /// (used by `splice`'s in-place same-count overwrite path, which never
    /// needs a representation change).
    pub fn dense_values_mut(&mut self) -> Option<&mut Vec<Value<V>>> {
        match &mut self.repr {
            Repr::Dense { values, .. } => Some(values),
            Repr::Hash(_) => None,
        }
    }

    pub fn touch_total_count(&mut self, at_least: usize) {
        if let Repr::Dense { total_count, .. } = &mut self.repr {
            *total_count = (*total_count).max(at_least);
        }
    }
}

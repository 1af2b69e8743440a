//! The index hash table: an open-addressing-by-chaining structure keyed by
//! `u32` array indices, sharing its `values` buffer with dense-mode storage
//! so that dense<->hash transitions reuse it rather than reallocating.
//!
//! Each slot in `links` plays two roles at once: as the entry for whichever
//! key currently occupies that slot (`key`, `next_in_chain`), and — since
//! the bucket count always equals the slot count — as the head pointer for
//! the bucket whose index equals the slot's own index (`chain_head`). This
//! sidecar encoding means no separate buckets array is allocated.

use crate::cell::Value;
use crate::coercion::EcmaValue;

const NONE: i32 = -1;
const MIN_CAPACITY: usize = 4;

#[derive(Clone, Debug)]
pub(crate) struct HashLink {
    pub key: u32,
    pub next_in_chain: i32,
    pub chain_head: i32,
}

impl HashLink {
    fn empty() -> Self {
        HashLink {
            key: 0,
            next_in_chain: NONE,
            chain_head: NONE,
        }
    }
}

/// Hash-mode backing storage for an Array.
#[derive(Clone, Debug)]
pub(crate) struct HashTable<V> {
    pub values: Vec<Value<V>>,
    pub links: Vec<HashLink>,
    /// Number of slots ever handed out (live or freed).
    pub total_count: usize,
    pub non_empty_count: usize,
    pub freelist_head: i32,
}

fn bucket_of(key: u32, bucket_count: usize) -> usize {
    (key & 0x7FFF_FFFF) as usize % bucket_count
}

impl<V: EcmaValue> HashTable<V> {
    pub fn new() -> Self {
        HashTable {
            values: Vec::new(),
            links: Vec::new(),
            total_count: 0,
            non_empty_count: 0,
            freelist_head: NONE,
        }
    }

    /// Reuse an existing dense buffer as the initial hash-mode values
    /// buffer: dense index `i` becomes key `i` for every slot.
    pub fn from_dense(values: Vec<Value<V>>) -> Self {
        let total_count = values.len();
        let non_empty_count = values.iter().filter(|v| !v.is_empty()).count();
        let mut links: Vec<HashLink> = (0..total_count as u32)
            .map(|key| HashLink {
                key,
                next_in_chain: NONE,
                chain_head: NONE,
            })
            .collect();

        let mut table = HashTable {
            values,
            links: std::mem::take(&mut links),
            total_count,
            non_empty_count,
            freelist_head: NONE,
        };
        table.reset_chains();
        table
    }

    /// Allocate a fresh dense buffer sized to `length`, placing each live
    /// value at the index equal to its key, for the hash->dense transition.
    pub fn into_dense(self, length: u32) -> Vec<Value<V>> {
        let mut out: Vec<Value<V>> = (0..length).map(|_| Value::Empty).collect();
        for (slot, value) in self.values.into_iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let key = self.links[slot].key;
            if (key as u64) < length as u64 {
                out[key as usize] = value;
            }
        }
        out
    }

    pub fn get(&self, key: u32) -> &Value<V> {
        if self.links.is_empty() {
            return &Value::Empty;
        }
        let b = bucket_of(key, self.links.len());
        let mut slot = self.links[b].chain_head;
        while slot != NONE {
            let s = slot as usize;
            if self.links[s].key == key {
                return &self.values[s];
            }
            slot = self.links[s].next_in_chain;
        }
        &Value::Empty
    }

    pub fn has(&self, key: u32) -> bool {
        !self.get(key).is_empty()
    }

    /// Insert or overwrite `key`. Returns `true` if this created a new
    /// entry.
    pub fn set(&mut self, key: u32, value: Value<V>) -> bool {
        self.ensure_capacity_for_insert();
        let b = bucket_of(key, self.links.len());

        let mut slot = self.links[b].chain_head;
        while slot != NONE {
            let s = slot as usize;
            if self.links[s].key == key {
                let was_empty = self.values[s].is_empty();
                self.values[s] = value;
                if was_empty {
                    self.non_empty_count += 1;
                    return true;
                }
                return false;
            }
            slot = self.links[s].next_in_chain;
        }

        let slot = self.allocate_slot();
        let b = bucket_of(key, self.links.len());
        self.links[slot].key = key;
        self.links[slot].next_in_chain = self.links[b].chain_head;
        self.links[b].chain_head = slot as i32;
        self.values[slot] = value;
        self.non_empty_count += 1;
        true
    }

    pub fn delete(&mut self, key: u32) -> bool {
        if self.links.is_empty() {
            return false;
        }
        let b = bucket_of(key, self.links.len());
        let mut prev: i32 = NONE;
        let mut slot = self.links[b].chain_head;
        while slot != NONE {
            let s = slot as usize;
            if self.links[s].key == key {
                let next = self.links[s].next_in_chain;
                if prev == NONE {
                    self.links[b].chain_head = next;
                } else {
                    self.links[prev as usize].next_in_chain = next;
                }
                self.links[s].next_in_chain = self.freelist_head;
                self.freelist_head = slot;
                self.values[s] = Value::Empty;
                self.non_empty_count -= 1;
                return true;
            }
            prev = slot;
            slot = self.links[s].next_in_chain;
        }
        false
    }

    /// Rebuild bucket and freelist chains from `values`/`links[i].key`
    /// alone. Required after bulk key rewriting (reverse, splice, unshift)
    /// and after growth.
    pub fn reset_chains(&mut self) {
        for link in &mut self.links {
            link.chain_head = NONE;
        }
        self.freelist_head = NONE;

        // Walk in reverse so that prepending during the forward walk
        // mentally reconstructs in a stable, deterministic order; no
        // caller observes chain order directly.
        for slot in (0..self.total_count).rev() {
            if self.values[slot].is_empty() {
                self.links[slot].next_in_chain = self.freelist_head;
                self.freelist_head = slot as i32;
            } else {
                let bucket_count = self.links.len();
                let b = bucket_of(self.links[slot].key, bucket_count);
                self.links[slot].next_in_chain = self.links[b].chain_head;
                self.links[b].chain_head = slot as i32;
            }
        }
    }

    fn allocate_slot(&mut self) -> usize {
        if self.freelist_head != NONE {
            let slot = self.freelist_head as usize;
            self.freelist_head = self.links[slot].next_in_chain;
            return slot;
        }

        if self.total_count < self.values.len() {
            let slot = self.total_count;
            self.total_count += 1;
            return slot;
        }

        self.grow();
        let slot = self.total_count;
        self.total_count += 1;
        slot
    }

    fn ensure_capacity_for_insert(&mut self) {
        if self.links.is_empty() {
            self.resize_to(MIN_CAPACITY);
        }
    }

    fn grow(&mut self) {
        let new_capacity = (self.values.len() * 2).max(MIN_CAPACITY);
        self.resize_to(new_capacity);
    }

    fn resize_to(&mut self, new_capacity: usize) {
        self.values.resize_with(new_capacity, || Value::Empty);
        self.links.resize_with(new_capacity, HashLink::empty);
        self.reset_chains();
    }

    /// Rewrite every live key via `f`, dropping entries for which `f`
    /// returns `None`, then rebuild chains. Used by `shift`/`unshift`/
    /// `reverse`/`splice` in hash mode, which must renumber every live key
    /// at once rather than move individual slots.
    pub fn rekey_all(&mut self, f: impl Fn(u32) -> Option<u32>) {
        for slot in 0..self.total_count {
            if self.values[slot].is_empty() {
                continue;
            }
            match f(self.links[slot].key) {
                Some(new_key) => self.links[slot].key = new_key,
                None => {
                    self.values[slot] = Value::Empty;
                    self.non_empty_count -= 1;
                }
            }
        }
        self.reset_chains();
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Value<V>)> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_empty())
            .map(|(slot, v)| (self.links[slot].key, v))
    }
}

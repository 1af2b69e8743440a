//! The AS3 Array method surface on top of
//! the adaptive storage engine. Grounded on this codebase's own persistent
//! list wrapper: a thin value-semantics type around a storage core, with the
//! richer traversal operations (`map`/`filter`/`fold`-equivalents) built out
//! of the same handful of primitives.

use std::cmp::Ordering;

use itertools::Itertools;

use crate::cell::Value;
use crate::coercion::EcmaValue;
use crate::error::{ErrorKind, Result};
use crate::host::{Callable, HostObject};
use crate::sort::{all_adjacent_distinct, try_sort_by, SortFlags};

use super::storage::ArrayStorage;

#[derive(Clone, Debug)]
pub struct Array<V> {
    pub(crate) storage: ArrayStorage<V>,
}

/// One argument to `concat`: either a single element to append as-is, or the
/// (already hole-preserving) contents of an Array/Vector to splice in
/// element-by-element; `concat` never deep-flattens nested arrays.
pub enum ConcatArg<V> {
    Element(V),
    Spread(Vec<Value<V>>),
}

/// The three "non-mutating in place" destinies `sort` can have, and the one
/// destiny `sortOn` shares with it.
pub enum SortResult<V> {
    /// The array was re-ordered in place.
    Mutated,
    /// `UNIQUESORT` was set and some two keys compared equal; the array is
    /// untouched (host surfaces this as the literal `0`).
    NotUnique,
    /// `length` exceeded `2^31 - 1`; the array is untouched.
    Unchanged,
    /// `RETURNINDEXEDARRAY` was set: the permutation, as a fresh Array.
    Indices(Array<V>),
}

fn normalize_index(i: i64, length: u32) -> u32 {
    let length = length as i64;
    let v = if i < 0 { (length + i).max(0) } else { i.min(length) };
    v as u32
}

/// Resolve slot `index`: `Some(value)` if the slot is live (own or, failing
/// that, found on the prototype chain), `None` if it is a true hole with no
/// inherited value either — the basis for `for`-`in`-style enumeration
/// skipping holes.
fn has_resolved<V: EcmaValue>(storage: &ArrayStorage<V>, index: u32, host: &dyn HostObject<V>) -> Option<V> {
    let cell = storage.get(index);
    if !cell.is_empty() {
        Some(cell.as_host_value())
    } else {
        host.lookup_in_chain(&index.to_string())
    }
}

fn resolved_get<V: EcmaValue>(storage: &ArrayStorage<V>, index: u32, host: &dyn HostObject<V>) -> V {
    has_resolved(storage, index, host).unwrap_or_else(V::undefined)
}

fn append_cell<V: EcmaValue>(result: &mut Array<V>, idx: &mut u32, cell: Value<V>) {
    if !cell.is_empty() {
        result.storage.set(*idx, cell);
    } else {
        let _ = result.storage.set_length(*idx + 1);
    }
    *idx += 1;
}

fn compare_values<V: EcmaValue>(
    comparator: Option<&dyn Callable<V>>,
    flags: SortFlags,
    a: &V,
    b: &V,
) -> Result<Ordering> {
    if let Some(cmp) = comparator {
        let result = cmp.invoke_checked(None, &[a.clone(), b.clone()])?;
        let n = result.to_number();
        return Ok(if n < 0.0 {
            Ordering::Less
        } else if n > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        });
    }

    if flags.contains(SortFlags::NUMERIC) {
        let (x, y) = (a.to_number(), b.to_number());
        return Ok(x.partial_cmp(&y).unwrap_or(Ordering::Equal));
    }

    let (mut sa, mut sb) = (a.to_string_value().into_owned(), b.to_string_value().into_owned());
    if flags.contains(SortFlags::CASEINSENSITIVE) {
        sa = sa.to_lowercase();
        sb = sb.to_lowercase();
    }
    Ok(sa.cmp(&sb))
}

impl<V: EcmaValue> Array<V> {
    pub fn new() -> Self {
        Array {
            storage: ArrayStorage::new(),
        }
    }

    pub fn with_length(length: u32) -> Self {
        Array {
            storage: ArrayStorage::with_length(length),
        }
    }

    pub fn length(&self) -> u32 {
        self.storage.length()
    }

    /// `Array.length = n`. The caller is responsible for having already
    /// rejected non-integer/negative arguments with
    /// [`ErrorKind::ArrayLengthNotPositiveInteger`].
    pub fn set_length(&mut self, n: u32) -> Result<()> {
        self.storage.set_length(n)
    }

    pub fn get(&self, index: u32) -> Value<V> {
        self.storage.get(index)
    }

    pub fn get_with_prototype(&self, host: &dyn HostObject<V>, index: u32) -> V {
        resolved_get(&self.storage, index, host)
    }

    pub fn has(&self, index: u32) -> bool {
        self.storage.has(index)
    }

    /// `index == u32::MAX` is not a valid array index; callers must route it
    /// to the host's dynamic-property setter instead of calling this.
    pub fn set(&mut self, index: u32, value: V) {
        self.storage.set(index, Value::from_host_value(value));
    }

    pub fn delete(&mut self, index: u32) -> bool {
        let had = self.storage.has(index);
        self.storage.delete(index);
        had
    }

    pub fn push(&mut self, values: impl IntoIterator<Item = V>) -> u32 {
        let length = self.storage.length();
        let mut next = length;
        for v in values {
            if next == u32::MAX {
                break;
            }
            self.storage.set(next, Value::from_host_value(v));
            next += 1;
        }
        self.storage.length()
    }

    pub fn pop(&mut self) -> V {
        let length = self.storage.length();
        if length == 0 {
            return V::undefined();
        }
        let last = length - 1;
        let cell = self.storage.get(last);
        if !cell.is_empty() {
            self.storage.delete(last);
        }
        let _ = self.storage.set_length(last);
        cell.as_host_value()
    }

    pub fn shift(&mut self) -> V {
        let length = self.storage.length();
        if length == 0 {
            return V::undefined();
        }
        let first = self.storage.get(0);
        self.storage.rekey(|k| if k == 0 { None } else { Some(k - 1) }, length - 1);
        first.as_host_value()
    }

    pub fn unshift(&mut self, values: impl ExactSizeIterator<Item = V>) -> u32 {
        let count = values.len() as u32;
        if count == 0 {
            return self.storage.length();
        }
        let length = self.storage.length();
        let new_length = (length as u64 + count as u64).min(u32::MAX as u64) as u32;
        self.storage.rekey(
            move |k| {
                let shifted = k as u64 + count as u64;
                if shifted >= u32::MAX as u64 {
                    None
                } else {
                    Some(shifted as u32)
                }
            },
            new_length,
        );
        for (i, v) in values.into_iter().enumerate() {
            if i as u32 >= count {
                break;
            }
            self.storage.set(i as u32, Value::from_host_value(v));
        }
        self.storage.length()
    }

    pub fn reverse(&mut self) {
        let length = self.storage.length();
        self.storage.rekey(move |k| Some(length - 1 - k), length);
    }

    pub fn slice(&self, host: &dyn HostObject<V>, start: i64, end: i64) -> Array<V> {
        let length = self.storage.length();
        let s = normalize_index(start, length);
        let mut e = normalize_index(end, length);
        let cap = s.saturating_add(i32::MAX as u32);
        if e > cap {
            e = cap;
        }

        let mut result = Array::new();
        for i in s..e {
            let v = resolved_get(&self.storage, i, host);
            result.storage.set(i - s, Value::from_host_value(v));
        }
        result
    }

    pub fn concat(&self, args: &[ConcatArg<V>]) -> Array<V> {
        let own: Vec<Value<V>> = (0..self.storage.length()).map(|i| self.storage.get(i)).collect();
        let groups = std::iter::once(own).chain(args.iter().map(|arg| match arg {
            ConcatArg::Element(v) => vec![Value::from_host_value(v.clone())],
            ConcatArg::Spread(cells) => cells.clone(),
        }));

        let mut result = Array::new();
        let mut idx: u32 = 0;
        for cell in groups.concat() {
            append_cell(&mut result, &mut idx, cell);
        }
        result
    }

    /// Every live cell, in storage order, paired with its index — the shape
    /// `concat`'s spread argument and `Vector::to_concat_arg` both need.
    pub fn dense_snapshot(&self) -> Vec<Value<V>> {
        (0..self.storage.length()).map(|i| self.storage.get(i)).collect()
    }

    pub fn splice(
        &mut self,
        host: &dyn HostObject<V>,
        start: i64,
        delete_count: i64,
        new_values: Vec<V>,
    ) -> Array<V> {
        let length = self.storage.length();
        let start = normalize_index(start, length);
        let max_delete = length - start;
        let delete_count = delete_count.clamp(0, max_delete as i64) as u32;
        let insert_count = new_values.len() as u32;

        let mut removed = Array::new();
        for i in 0..delete_count {
            let v = resolved_get(&self.storage, start + i, host);
            removed.storage.set(i, Value::from_host_value(v));
        }

        if delete_count == insert_count {
            for (i, v) in new_values.into_iter().enumerate() {
                self.storage.set(start + i as u32, Value::from_host_value(v));
            }
        } else if insert_count < delete_count {
            let shift = delete_count - insert_count;
            let new_length = length - shift;
            self.storage.rekey(
                move |k| {
                    if k < start {
                        Some(k)
                    } else if k < start + delete_count {
                        None
                    } else {
                        Some(k - shift)
                    }
                },
                new_length,
            );
            for (i, v) in new_values.into_iter().enumerate() {
                self.storage.set(start + i as u32, Value::from_host_value(v));
            }
        } else {
            let shift = insert_count - delete_count;
            let new_length = length + shift;
            self.storage.rekey(
                move |k| {
                    if k < start {
                        Some(k)
                    } else if k < start + delete_count {
                        None
                    } else {
                        Some(k + shift)
                    }
                },
                new_length,
            );
            for (i, v) in new_values.into_iter().enumerate() {
                self.storage.set(start + i as u32, Value::from_host_value(v));
            }
        }

        removed
    }

    pub fn index_of(&self, host: &dyn HostObject<V>, search: &V, from_index: i64) -> i64
    where
        V: PartialEq,
    {
        let length = self.storage.length();
        let start = normalize_index(from_index, length);
        for i in start..length {
            if let Some(v) = has_resolved(&self.storage, i, host) {
                if &v == search {
                    return i as i64;
                }
            }
        }
        -1
    }

    pub fn last_index_of(&self, host: &dyn HostObject<V>, search: &V, from_index: i64) -> i64
    where
        V: PartialEq,
    {
        let length = self.storage.length();
        if length == 0 {
            return -1;
        }
        let start = if from_index < 0 {
            let v = length as i64 + from_index;
            if v < 0 {
                return -1;
            }
            v as u32
        } else {
            (from_index as u32).min(length - 1)
        };

        let mut i = start;
        loop {
            if let Some(v) = has_resolved(&self.storage, i, host) {
                if &v == search {
                    return i as i64;
                }
            }
            if i == 0 {
                break;
            }
            i -= 1;
        }
        -1
    }

    pub fn join(&self, host: &dyn HostObject<V>, sep: &str) -> String {
        let length = self.storage.length();
        let mut parts = Vec::with_capacity(length as usize);
        for i in 0..length {
            let v = resolved_get(&self.storage, i, host);
            if v.is_undefined() || v.is_null() {
                parts.push(String::new());
            } else {
                parts.push(v.to_string_value().into_owned());
            }
        }
        parts.join(sep)
    }

    pub fn to_string(&self, host: &dyn HostObject<V>) -> String {
        self.join(host, ",")
    }

    /// AS3 locale-sensitive formatting of elements is a host concern this
    /// crate doesn't implement; this renders identically to [`Array::to_string`].
    pub fn to_locale_string(&self, host: &dyn HostObject<V>) -> String {
        self.to_string(host)
    }

    pub fn for_each(&self, host: &dyn HostObject<V>, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<()> {
        for i in 0..self.storage.length() {
            if let Some(v) = has_resolved(&self.storage, i, host) {
                callback.invoke_checked(this_arg.clone(), &[v, V::from_number(i as f64)])?;
            }
        }
        Ok(())
    }

    pub fn every(&self, host: &dyn HostObject<V>, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<bool> {
        for i in 0..self.storage.length() {
            if let Some(v) = has_resolved(&self.storage, i, host) {
                let result = callback.invoke_checked(this_arg.clone(), &[v, V::from_number(i as f64)])?;
                if !result.to_boolean() {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    pub fn some(&self, host: &dyn HostObject<V>, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<bool> {
        for i in 0..self.storage.length() {
            if let Some(v) = has_resolved(&self.storage, i, host) {
                let result = callback.invoke_checked(this_arg.clone(), &[v, V::from_number(i as f64)])?;
                if result.to_boolean() {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    pub fn filter(&self, host: &dyn HostObject<V>, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<Array<V>> {
        let mut result = Array::new();
        let mut out_idx = 0u32;
        for i in 0..self.storage.length() {
            if let Some(v) = has_resolved(&self.storage, i, host) {
                let keep = callback
                    .invoke_checked(this_arg.clone(), &[v.clone(), V::from_number(i as f64)])?
                    .to_boolean();
                if keep {
                    result.storage.set(out_idx, Value::from_host_value(v));
                    out_idx += 1;
                }
            }
        }
        Ok(result)
    }

    pub fn map(&self, host: &dyn HostObject<V>, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<Array<V>> {
        let mut result = Array::new();
        let length = self.storage.length();
        for i in 0..length {
            if let Some(v) = has_resolved(&self.storage, i, host) {
                let mapped = callback.invoke_checked(this_arg.clone(), &[v, V::from_number(i as f64)])?;
                result.storage.set(i, Value::from_host_value(mapped));
            }
        }
        let _ = result.storage.set_length(length.max(result.length()));
        Ok(result)
    }

    pub fn sort(
        &mut self,
        host: &dyn HostObject<V>,
        comparator: Option<&dyn Callable<V>>,
        flags: SortFlags,
    ) -> Result<SortResult<V>> {
        let length = self.storage.length();
        if length as u64 > i32::MAX as u64 {
            return Ok(SortResult::Unchanged);
        }

        let mut defined: Vec<(u32, V)> = Vec::new();
        let mut undefined_indices: Vec<u32> = Vec::new();
        let mut hole_indices: Vec<u32> = Vec::new();

        for i in 0..length {
            match has_resolved(&self.storage, i, host) {
                Some(v) if !v.is_undefined() => defined.push((i, v)),
                Some(_) => undefined_indices.push(i),
                None => hole_indices.push(i),
            }
        }

        try_sort_by(&mut defined, |a, b| compare_values(comparator, flags, &a.1, &b.1))?;
        if flags.contains(SortFlags::DESCENDING) {
            defined.reverse();
        }

        if flags.contains(SortFlags::UNIQUESORT) {
            let distinct = all_adjacent_distinct(&defined, |a, b| compare_values(comparator, flags, &a.1, &b.1))?;
            if !distinct || undefined_indices.len() > 1 {
                return Ok(SortResult::NotUnique);
            }
        }

        if flags.contains(SortFlags::RETURNINDEXEDARRAY) {
            let mut indices = Array::new();
            let mut slot = 0u32;
            for (orig, _) in &defined {
                indices.storage.set(slot, Value::Object(V::from_number(*orig as f64)));
                slot += 1;
            }
            for &orig in &undefined_indices {
                indices.storage.set(slot, Value::Object(V::from_number(orig as f64)));
                slot += 1;
            }
            for &orig in &hole_indices {
                indices.storage.set(slot, Value::Object(V::from_number(orig as f64)));
                slot += 1;
            }
            return Ok(SortResult::Indices(indices));
        }

        let mut new_storage = ArrayStorage::with_length(length);
        let mut slot = 0u32;
        for (_, v) in &defined {
            new_storage.set(slot, Value::from_host_value(v.clone()));
            slot += 1;
        }
        for _ in &undefined_indices {
            new_storage.set(slot, Value::UndefinedSlot);
            slot += 1;
        }
        self.storage = new_storage;
        Ok(SortResult::Mutated)
    }

    /// `sortOn`: sorts by one or more property keys read off each element
    /// via [`EcmaValue::get_property`]. Always uses the general per-property
    /// comparator rather than precomputing a uniform-flags key matrix —
    /// both produce identical orderings, see DESIGN.md.
    pub fn sort_on(
        &mut self,
        host: &dyn HostObject<V>,
        names: &[String],
        options: &[SortFlags],
    ) -> Result<SortResult<V>> {
        let length = self.storage.length();
        if length as u64 > i32::MAX as u64 {
            return Ok(SortResult::Unchanged);
        }
        let flag_at = |i: usize| options.get(i).copied().unwrap_or_default();

        let mut defined: Vec<(u32, V)> = Vec::new();
        let mut undefined_indices: Vec<u32> = Vec::new();
        let mut hole_indices: Vec<u32> = Vec::new();

        for i in 0..length {
            match has_resolved(&self.storage, i, host) {
                // sortOn groups null together with undefined.
                Some(v) if v.is_undefined() || v.is_null() => undefined_indices.push(i),
                Some(v) => defined.push((i, v)),
                None => hole_indices.push(i),
            }
        }

        let key_cmp = |a: &(u32, V), b: &(u32, V)| -> Result<Ordering> {
            for (i, name) in names.iter().enumerate() {
                let ka = a.1.get_property(name).unwrap_or_else(V::undefined);
                let kb = b.1.get_property(name).unwrap_or_else(V::undefined);
                let flags = flag_at(i);
                let mut ord = compare_values(None, flags, &ka, &kb)?;
                if flags.contains(SortFlags::DESCENDING) {
                    ord = ord.reverse();
                }
                if ord != Ordering::Equal {
                    return Ok(ord);
                }
            }
            Ok(Ordering::Equal)
        };

        try_sort_by(&mut defined, key_cmp)?;

        let any_uniquesort = (0..names.len()).any(|i| flag_at(i).contains(SortFlags::UNIQUESORT));
        if any_uniquesort {
            let distinct = all_adjacent_distinct(&defined, key_cmp)?;
            if !distinct || undefined_indices.len() > 1 {
                return Ok(SortResult::NotUnique);
            }
        }

        let any_returnindexedarray = (0..names.len()).any(|i| flag_at(i).contains(SortFlags::RETURNINDEXEDARRAY));
        if any_returnindexedarray {
            let mut indices = Array::new();
            let mut slot = 0u32;
            for (orig, _) in &defined {
                indices.storage.set(slot, Value::Object(V::from_number(*orig as f64)));
                slot += 1;
            }
            for &orig in &undefined_indices {
                indices.storage.set(slot, Value::Object(V::from_number(orig as f64)));
                slot += 1;
            }
            for &orig in &hole_indices {
                indices.storage.set(slot, Value::Object(V::from_number(orig as f64)));
                slot += 1;
            }
            return Ok(SortResult::Indices(indices));
        }

        let mut new_storage = ArrayStorage::with_length(length);
        let mut slot = 0u32;
        for (_, v) in &defined {
            new_storage.set(slot, Value::from_host_value(v.clone()));
            slot += 1;
        }
        for _ in &undefined_indices {
            new_storage.set(slot, Value::UndefinedSlot);
            slot += 1;
        }
        self.storage = new_storage;
        Ok(SortResult::Mutated)
    }
}

impl<V: EcmaValue> Default for Array<V> {
    fn default() -> Self {
        Array::new()
    }
}

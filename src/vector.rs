//! `Vector.<T>`: a fixed-type, dense array with
//! strict bounds and an optional length lock. Grounded on the same
//! storage-plus-thin-wrapper shape as `Array`, simplified because a Vector
//! never transitions representation and never has holes.

use crate::coercion::EcmaValue;
use crate::error::{ErrorKind, Result};
use crate::host::Callable;
use crate::sort::{try_sort_by, SortFlags};

/// How a Vector's element type converts to and from the host's generic
/// value representation. One implementation per AS3 `Vector.<T>`
/// instantiation (`int`, `uint`, `Number`, `String`, or a class reference);
/// the crate ships no concrete instantiations since the coercions
/// (`ToInt32`/`ToUint32`/`ToNumber`/`ToString`/class-cast) belong to the
/// host's numeric/object system (§1 non-goals).
pub trait VectorElement<V: EcmaValue>: Clone + std::fmt::Debug + PartialEq {
    fn coerce(value: &V) -> Self;
    fn to_host_value(&self) -> V;
    fn zero() -> Self;
}

#[derive(Clone, Debug)]
pub struct Vector<V, T> {
    data: Vec<T>,
    len: u32,
    fixed: bool,
    _marker: std::marker::PhantomData<V>,
}

fn normalize_index(i: i64, length: u32) -> u32 {
    let length = length as i64;
    let v = if i < 0 { (length + i).max(0) } else { i.min(length) };
    v as u32
}

impl<V: EcmaValue, T: VectorElement<V>> Vector<V, T> {
    pub fn new(fixed: bool) -> Self {
        Vector {
            data: Vec::new(),
            len: 0,
            fixed,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn with_length(length: u32, fixed: bool) -> Self {
        Vector {
            data: std::iter::repeat_with(T::zero).take(length as usize).collect(),
            len: length,
            fixed,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn length(&self) -> u32 {
        self.len
    }

    pub fn fixed(&self) -> bool {
        self.fixed
    }

    pub fn set_fixed(&mut self, fixed: bool) {
        self.fixed = fixed;
    }

    pub fn get(&self, index: u32) -> Result<V> {
        if index >= self.len {
            return Err(ErrorKind::VectorIndexOutOfRange {
                index,
                length: self.len,
            });
        }
        Ok(self.data[index as usize].to_host_value())
    }

    /// `set(i, v)`: `i == len` (and not fixed) extends the vector by one;
    /// `i < len` overwrites; anything else fails.
    pub fn set(&mut self, index: u32, value: V) -> Result<()> {
        if index < self.len {
            self.data[index as usize] = T::coerce(&value);
            return Ok(());
        }
        if index == self.len {
            if self.fixed {
                return Err(ErrorKind::VectorFixedLengthChange);
            }
            self.data.push(T::coerce(&value));
            self.len += 1;
            return Ok(());
        }
        Err(ErrorKind::VectorIndexOutOfRange {
            index,
            length: self.len,
        })
    }

    /// A no-op: Vector slots cannot become holes.
    pub fn delete(&mut self, _index: u32) -> bool {
        false
    }

    pub fn push(&mut self, values: impl IntoIterator<Item = V>) -> Result<u32> {
        if self.fixed {
            return Err(ErrorKind::VectorFixedLengthChange);
        }
        for v in values {
            self.data.push(T::coerce(&v));
            self.len += 1;
        }
        Ok(self.len)
    }

    pub fn pop(&mut self) -> Result<V> {
        if self.fixed {
            return Err(ErrorKind::VectorFixedLengthChange);
        }
        match self.data.pop() {
            Some(v) => {
                self.len -= 1;
                Ok(v.to_host_value())
            }
            None => Ok(T::zero().to_host_value()),
        }
    }

    pub fn shift(&mut self) -> Result<V> {
        if self.fixed {
            return Err(ErrorKind::VectorFixedLengthChange);
        }
        if self.data.is_empty() {
            return Ok(T::zero().to_host_value());
        }
        let v = self.data.remove(0);
        self.len -= 1;
        Ok(v.to_host_value())
    }

    pub fn unshift(&mut self, values: impl IntoIterator<Item = V>) -> Result<u32> {
        if self.fixed {
            return Err(ErrorKind::VectorFixedLengthChange);
        }
        let mut prefix: Vec<T> = values.into_iter().map(|v| T::coerce(&v)).collect();
        self.len += prefix.len() as u32;
        prefix.extend(std::mem::take(&mut self.data));
        self.data = prefix;
        Ok(self.len)
    }

    pub fn reverse(&mut self) {
        self.data.reverse();
    }

    pub fn slice(&self, start: i64, end: i64) -> Vector<V, T> {
        let s = normalize_index(start, self.len);
        let e = normalize_index(end, self.len).max(s);
        Vector {
            data: self.data[s as usize..e as usize].to_vec(),
            len: e - s,
            fixed: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Succeeds on a fixed Vector only when `deleteCount == newValues.len()`.
    pub fn splice(&mut self, start: i64, delete_count: i64, new_values: Vec<V>) -> Result<Vector<V, T>> {
        let start = normalize_index(start, self.len);
        let max_delete = self.len - start;
        let delete_count = delete_count.clamp(0, max_delete as i64) as u32;
        let insert_count = new_values.len() as u32;

        if self.fixed && delete_count != insert_count {
            return Err(ErrorKind::VectorFixedLengthChange);
        }

        let removed: Vec<T> = self
            .data
            .splice(
                start as usize..(start + delete_count) as usize,
                new_values.iter().map(T::coerce),
            )
            .collect();
        self.len = self.len - delete_count + insert_count;

        Ok(Vector {
            data: removed,
            len: delete_count,
            fixed: false,
            _marker: std::marker::PhantomData,
        })
    }

    pub fn index_of(&self, search: &V, from_index: i64) -> i64 {
        let start = normalize_index(from_index, self.len);
        let needle = T::coerce(search);
        for i in start..self.len {
            if self.data[i as usize] == needle {
                return i as i64;
            }
        }
        -1
    }

    pub fn last_index_of(&self, search: &V, from_index: i64) -> i64 {
        if self.len == 0 {
            return -1;
        }
        let start = if from_index < 0 {
            let v = self.len as i64 + from_index;
            if v < 0 {
                return -1;
            }
            v as u32
        } else {
            (from_index as u32).min(self.len - 1)
        };
        let needle = T::coerce(search);
        let mut i = start;
        loop {
            if self.data[i as usize] == needle {
                return i as i64;
            }
            if i == 0 {
                break;
            }
            i -= 1;
        }
        -1
    }

    pub fn join(&self, sep: &str) -> String {
        self.data
            .iter()
            .map(|v| v.to_host_value().to_string_value().into_owned())
            .collect::<Vec<_>>()
            .join(sep)
    }

    pub fn to_string(&self) -> String {
        self.join(",")
    }

    pub fn for_each(&self, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<()> {
        for (i, v) in self.data.iter().enumerate() {
            callback.invoke_checked(this_arg.clone(), &[v.to_host_value(), V::from_number(i as f64)])?;
        }
        Ok(())
    }

    pub fn every(&self, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<bool> {
        for (i, v) in self.data.iter().enumerate() {
            let r = callback.invoke_checked(this_arg.clone(), &[v.to_host_value(), V::from_number(i as f64)])?;
            if !r.to_boolean() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn some(&self, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<bool> {
        for (i, v) in self.data.iter().enumerate() {
            let r = callback.invoke_checked(this_arg.clone(), &[v.to_host_value(), V::from_number(i as f64)])?;
            if r.to_boolean() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn filter(&self, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<Vector<V, T>> {
        let mut out = Vec::new();
        for (i, v) in self.data.iter().enumerate() {
            let keep = callback
                .invoke_checked(this_arg.clone(), &[v.to_host_value(), V::from_number(i as f64)])?
                .to_boolean();
            if keep {
                out.push(v.clone());
            }
        }
        let len = out.len() as u32;
        Ok(Vector {
            data: out,
            len,
            fixed: false,
            _marker: std::marker::PhantomData,
        })
    }

    pub fn map(&self, callback: &dyn Callable<V>, this_arg: Option<V>) -> Result<Vector<V, T>> {
        let mut out = Vec::with_capacity(self.data.len());
        for (i, v) in self.data.iter().enumerate() {
            let mapped = callback.invoke_checked(this_arg.clone(), &[v.to_host_value(), V::from_number(i as f64)])?;
            out.push(T::coerce(&mapped));
        }
        let len = out.len() as u32;
        Ok(Vector {
            data: out,
            len,
            fixed: false,
            _marker: std::marker::PhantomData,
        })
    }

    /// `sort` with a comparator uses the safe-comparator kernel;
    /// `RETURNINDEXEDARRAY` has no meaning for a Vector and is ignored.
    pub fn sort(&mut self, comparator: Option<&dyn Callable<V>>, flags: SortFlags) -> Result<()> {
        let mut values: Vec<V> = self.data.iter().map(|v| v.to_host_value()).collect();
        try_sort_by(&mut values, |a, b| compare(comparator, flags, a, b))?;
        if flags.contains(SortFlags::DESCENDING) {
            values.reverse();
        }
        self.data = values.iter().map(T::coerce).collect();
        Ok(())
    }
}

fn compare<V: EcmaValue>(
    comparator: Option<&dyn Callable<V>>,
    flags: SortFlags,
    a: &V,
    b: &V,
) -> Result<std::cmp::Ordering> {
    use std::cmp::Ordering;
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

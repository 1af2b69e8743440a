//! The Array element cell: a three-state slot distinguishing a hole from a
//! present-but-`undefined` value from a present object reference. Modelled
//! as a tagged sum rather than reusing a null pointer as a sentinel, so
//! that "null" and "undefined" both remain first-class.

use crate::coercion::EcmaValue;

#[derive(Clone, Debug)]
pub enum Value<V> {
    /// A hole: never assigned, or deleted. `has_element` is false.
    Empty,

    /// Present, reads as `undefined`. `has_element` is true.
    UndefinedSlot,

    /// Present, carries a host value (possibly the distinguished `null`
    /// object).
    Object(V),
}

impl<V: EcmaValue> Value<V> {
    pub fn has_element(&self) -> bool {
        !matches!(self, Value::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// The value as seen by AS3 code reading this slot: a hole and an
    /// explicit `undefined` both read as `undefined`.
    pub fn as_host_value(&self) -> V {
        match self {
            Value::Empty | Value::UndefinedSlot => V::undefined(),
            Value::Object(v) => v.clone(),
        }
    }

    pub fn from_host_value(value: V) -> Self {
        if value.is_undefined() {
            Value::UndefinedSlot
        } else {
            Value::Object(value)
        }
    }
}

/// Equality between two cells is reference equality on the carried value;
/// `Empty`/`UndefinedSlot` are unequal to everything else, including each
/// other's identical variant compared structurally below only via `==` on
/// the enum discriminant (callers needing host-level equality should compare
/// `as_host_value()` through the host's own equality, not this impl).
impl<V: PartialEq> PartialEq for Value<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::UndefinedSlot, Value::UndefinedSlot) => true,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestValue;

    #[test]
    fn empty_has_no_element() {
        let cell: Value<TestValue> = Value::Empty;
        assert!(!cell.has_element());
        assert!(cell.as_host_value().is_undefined());
    }

    #[test]
    fn undefined_slot_has_element() {
        let cell: Value<TestValue> = Value::UndefinedSlot;
        assert!(cell.has_element());
        assert!(cell.as_host_value().is_undefined());
    }

    #[test]
    fn object_roundtrips() {
        let v = TestValue::Number(42.0);
        let cell = Value::from_host_value(v.clone());
        assert!(matches!(cell, Value::Object(_)));
        assert_eq!(cell.as_host_value(), v);
    }
}

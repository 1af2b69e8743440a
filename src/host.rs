//! Collaborator traits: the seam between this crate and the
//! host's dynamic-object system, callable values, and XML tree. A host
//! embeds against the containers by implementing these traits for its own
//! types; nothing in this crate assumes a concrete representation for any
//! of them.
//!
//! Shape follows the conventional AVM2 host-object surface (see e.g.
//! ruffle's `TObject` trait): a handful of `try_*` accessors plus a
//! prototype-chain walk.

use crate::coercion::EcmaValue;
use crate::error::ErrorKind;

/// The outer "dynamic object with traits + prototype chain + dynamic
/// properties" that an Array/Vector lives inside. Used by hole resolution
/// (falling through to inherited properties) and by the property-binding
/// bridge for names that don't parse as an array index.
pub trait HostObject<V: EcmaValue> {
    fn has_property(&self, name: &str) -> bool;
    fn try_get_property(&self, name: &str) -> Option<V>;
    fn try_set_property(&mut self, name: &str, value: V) -> bool;
    fn delete_property(&mut self, name: &str) -> bool;

    /// The next object up the prototype chain, if any.
    fn prototype(&self) -> Option<&dyn HostObject<V>>;

    /// Walk the prototype chain looking up `name`, as hole resolution does.
    fn lookup_in_chain(&self, name: &str) -> Option<V> {
        if let Some(v) = self.try_get_property(name) {
            return Some(v);
        }
        self.prototype()?.lookup_in_chain(name)
    }
}

/// A callable value: a plain function, or a method closure with a bound
/// receiver. Used to invoke user comparators and the `every`/`some`/
/// `filter`/`map`/`forEach` callbacks.
pub trait Callable<V: EcmaValue> {
    /// Attempt to invoke `self` with the given `this` and arguments. A
    /// method closure invoked with a `this` other than `None`/`undefined`
    /// must fail with [`ErrorKind::CallbackMethodThisNotNull`] rather than
    /// silently overriding its bound receiver.
    fn try_invoke(&self, this: Option<V>, args: &[V]) -> Result<V, ErrorKind>;

    /// True if this callable has a bound receiver that must not be
    /// overridden by a caller-supplied `this`.
    fn is_method_closure(&self) -> bool;

    /// Enforce the `this`-binding rule described on [`try_invoke`], then
    /// delegate.
    fn invoke_checked(&self, this: Option<V>, args: &[V]) -> Result<V, ErrorKind> {
        if self.is_method_closure() {
            if let Some(this) = &this {
                if !this.is_undefined() && !this.is_null() {
                    return Err(ErrorKind::CallbackMethodThisNotNull);
                }
            }
        }
        self.try_invoke(this, args)
    }
}

/// A handle to a node in an external XML tree. `Eq` is reference identity:
/// two handles are equal iff they name the same node.
pub trait XmlNode: Clone + PartialEq + std::fmt::Debug {
    fn parent(&self) -> Option<Self>;
    fn child_at(&self, index: usize) -> Option<Self>;
    fn insert_child_after(&self, after: Option<&Self>, child: Self);
    fn replace_child(&self, old: &Self, new: Self);
    fn delete_child_or_attr(&self, child: &Self);

    fn create_text_node(&self, text: &str) -> Self;
    fn create_element(&self, uri: Option<&str>, local_name: &str) -> Self;
    fn create_attribute(&self, uri: Option<&str>, local_name: &str, value: &str) -> Self;

    /// Overwrite an attribute or text node's value in place: assigning a
    /// string into an attribute slot sets the attribute's text.
    fn set_text(&self, value: &str);

    /// Merge runs of adjacent text/CDATA children into one text node,
    /// dropping empty runs, recursively.
    fn normalize(&self);

    /// Resolve a generalised name against this node, returning
    /// every matching descendant-or-self node in document order.
    fn fetch_by_generalised_name(&self, name: &crate::xmllist::GeneralisedName) -> Vec<Self>;

    fn is_element(&self) -> bool;
    fn is_attribute(&self) -> bool;
    fn local_name(&self) -> Option<String>;
    fn uri(&self) -> Option<&str>;

    /// Overwrite this node's local name in place.
    fn set_local_name(&self, name: &str);

    /// One of `"element"`, `"attribute"`, `"text"`, `"comment"`, or
    /// `"processing-instruction"`.
    fn node_kind(&self) -> &'static str;

    /// Simple content: text/attribute data with no element children.
    fn has_simple_content(&self) -> bool;
    fn text_content(&self) -> String;
}

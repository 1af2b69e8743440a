//! A minimal concrete `EcmaValue`/`HostObject`/`Callable` used only by this
//! crate's own unit and property tests, standing in for the AVM2 host
//! object system that real embedders provide.

#![cfg(test)]

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::coercion::EcmaValue;
use crate::error::ErrorKind;
use crate::host::{Callable, HostObject, XmlNode};
use crate::xmllist::GeneralisedName;

#[derive(Clone, Debug)]
pub enum TestValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    /// A plain property bag, standing in for an AS3 object literal. Equality
    /// is reference identity (`Rc::ptr_eq`), matching `===` on an object.
    Object(Rc<RefCell<FxHashMap<String, TestValue>>>),
}

impl TestValue {
    pub fn str(s: &str) -> Self {
        TestValue::Str(Rc::from(s))
    }

    pub fn object(pairs: &[(&str, TestValue)]) -> Self {
        let mut map = FxHashMap::default();
        for (k, v) in pairs {
            map.insert((*k).to_string(), v.clone());
        }
        TestValue::Object(Rc::new(RefCell::new(map)))
    }
}

impl PartialEq for TestValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TestValue::Undefined, TestValue::Undefined) => true,
            (TestValue::Null, TestValue::Null) => true,
            (TestValue::Bool(a), TestValue::Bool(b)) => a == b,
            (TestValue::Number(a), TestValue::Number(b)) => a == b,
            (TestValue::Str(a), TestValue::Str(b)) => a == b,
            (TestValue::Object(a), TestValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl EcmaValue for TestValue {
    fn to_uint32(&self) -> u32 {
        let n = self.to_number();
        if !n.is_finite() {
            return 0;
        }
        n.trunc().rem_euclid(4294967296.0) as u32
    }

    fn to_number(&self) -> f64 {
        match self {
            TestValue::Undefined => f64::NAN,
            TestValue::Null => 0.0,
            TestValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            TestValue::Number(n) => *n,
            TestValue::Str(s) => s.parse().unwrap_or(f64::NAN),
            TestValue::Object(rc) => Rc::as_ptr(rc) as usize as f64,
        }
    }

    fn to_string_value(&self) -> Cow<'_, str> {
        match self {
            TestValue::Undefined => Cow::Borrowed("undefined"),
            TestValue::Null => Cow::Borrowed("null"),
            TestValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            TestValue::Number(n) => Cow::Owned(n.to_string()),
            TestValue::Str(s) => Cow::Owned(s.to_string()),
            TestValue::Object(_) => Cow::Borrowed("[object Object]"),
        }
    }

    fn to_boolean(&self) -> bool {
        match self {
            TestValue::Undefined | TestValue::Null => false,
            TestValue::Bool(b) => *b,
            TestValue::Number(n) => *n != 0.0 && !n.is_nan(),
            TestValue::Str(s) => !s.is_empty(),
            TestValue::Object(_) => true,
        }
    }

    fn is_undefined(&self) -> bool {
        matches!(self, TestValue::Undefined)
    }

    fn is_null(&self) -> bool {
        matches!(self, TestValue::Null)
    }

    fn undefined() -> Self {
        TestValue::Undefined
    }

    fn null() -> Self {
        TestValue::Null
    }

    fn from_number(n: f64) -> Self {
        TestValue::Number(n)
    }

    fn get_property(&self, name: &str) -> Option<Self> {
        match self {
            TestValue::Object(props) => props.borrow().get(name).cloned(),
            _ => None,
        }
    }
}

/// A tiny dynamic-property bag standing in for the host object system, used
/// to exercise hole resolution / prototype fallback.
#[derive(Default)]
pub struct TestObject {
    props: RefCell<FxHashMap<String, TestValue>>,
    pub proto: Option<Box<TestObject>>,
}

impl HostObject<TestValue> for TestObject {
    fn has_property(&self, name: &str) -> bool {
        self.props.borrow().contains_key(name)
    }

    fn try_get_property(&self, name: &str) -> Option<TestValue> {
        self.props.borrow().get(name).cloned()
    }

    fn try_set_property(&mut self, name: &str, value: TestValue) -> bool {
        self.props.borrow_mut().insert(name.to_string(), value);
        true
    }

    fn delete_property(&mut self, name: &str) -> bool {
        self.props.borrow_mut().remove(name).is_some()
    }

    fn prototype(&self) -> Option<&dyn HostObject<TestValue>> {
        self.proto.as_deref().map(|p| p as &dyn HostObject<TestValue>)
    }
}

impl TestObject {
    pub fn with(pairs: &[(&str, TestValue)]) -> Self {
        let obj = TestObject::default();
        for (k, v) in pairs {
            obj.props.borrow_mut().insert((*k).to_string(), v.clone());
        }
        obj
    }
}

/// A closure-like callable backed by a plain Rust function, for comparator
/// and iteration-callback tests.
pub struct TestCallable<F> {
    pub f: F,
    pub method_closure: bool,
}

impl<F> TestCallable<F>
where
    F: Fn(Option<TestValue>, &[TestValue]) -> Result<TestValue, ErrorKind>,
{
    pub fn new(f: F) -> Self {
        TestCallable {
            f,
            method_closure: false,
        }
    }
}

impl<F> Callable<TestValue> for TestCallable<F>
where
    F: Fn(Option<TestValue>, &[TestValue]) -> Result<TestValue, ErrorKind>,
{
    fn try_invoke(&self, this: Option<TestValue>, args: &[TestValue]) -> Result<TestValue, ErrorKind> {
        (self.f)(this, args)
    }

    fn is_method_closure(&self) -> bool {
        self.method_closure
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TestXmlKind {
    Element,
    Text,
    Attribute,
    Comment,
    ProcessingInstruction,
}

#[derive(Debug)]
struct TestXmlNodeMutable {
    text: String,
    // `setLocalName` needs to mutate this, so it lives behind the `RefCell`
    // rather than alongside `uri`/`kind`, which never change.
    local_name: Option<String>,
    children: Vec<TestXmlNode>,
    attributes: Vec<TestXmlNode>,
    parent: Option<Weak<TestXmlNodeInner>>,
}

#[derive(Debug)]
struct TestXmlNodeInner {
    kind: TestXmlKind,
    // Identity never changes after construction, so this lives outside the
    // `RefCell` and `uri()` can hand back a plain `&str`.
    uri: Option<String>,
    mutable: RefCell<TestXmlNodeMutable>,
}

/// A tiny in-memory XML tree standing in for a host's real DOM, used to
/// exercise `XMLList`'s materialise-on-write and query logic.
#[derive(Clone, Debug)]
pub struct TestXmlNode(Rc<TestXmlNodeInner>);

impl PartialEq for TestXmlNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl TestXmlNode {
    fn new(kind: TestXmlKind, uri: Option<&str>, local_name: Option<&str>, text: &str) -> Self {
        TestXmlNode(Rc::new(TestXmlNodeInner {
            kind,
            uri: uri.map(str::to_string),
            mutable: RefCell::new(TestXmlNodeMutable {
                text: text.to_string(),
                local_name: local_name.map(str::to_string),
                children: Vec::new(),
                attributes: Vec::new(),
                parent: None,
            }),
        }))
    }

    pub fn element(local_name: &str) -> Self {
        TestXmlNode::new(TestXmlKind::Element, None, Some(local_name), "")
    }

    pub fn text(content: &str) -> Self {
        TestXmlNode::new(TestXmlKind::Text, None, None, content)
    }

    fn set_parent(&self, parent: Option<&TestXmlNode>) {
        self.0.mutable.borrow_mut().parent = parent.map(|p| Rc::downgrade(&p.0));
    }

    fn matches(&self, uri: &Option<String>, local_name: &Option<String>) -> bool {
        uri.as_deref().map_or(true, |u| self.0.uri.as_deref() == Some(u))
            && local_name
                .as_deref()
                .map_or(true, |n| self.0.mutable.borrow().local_name.as_deref() == Some(n))
    }
}

impl XmlNode for TestXmlNode {
    fn parent(&self) -> Option<Self> {
        self.0
            .mutable
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(TestXmlNode)
    }

    fn child_at(&self, index: usize) -> Option<Self> {
        self.0.mutable.borrow().children.get(index).cloned()
    }

    fn insert_child_after(&self, after: Option<&Self>, child: Self) {
        child.set_parent(Some(self));
        let mut data = self.0.mutable.borrow_mut();
        let pos = match after {
            None => 0,
            Some(after) => data
                .children
                .iter()
                .position(|c| c == after)
                .map(|i| i + 1)
                .unwrap_or(data.children.len()),
        };
        data.children.insert(pos, child);
    }

    fn replace_child(&self, old: &Self, new: Self) {
        new.set_parent(Some(self));
        let mut data = self.0.mutable.borrow_mut();
        if let Some(pos) = data.children.iter().position(|c| c == old) {
            data.children[pos] = new;
        }
        drop(data);
        old.set_parent(None);
    }

    fn delete_child_or_attr(&self, child: &Self) {
        let mut data = self.0.mutable.borrow_mut();
        if let Some(pos) = data.children.iter().position(|c| c == child) {
            data.children.remove(pos);
        } else if let Some(pos) = data.attributes.iter().position(|c| c == child) {
            data.attributes.remove(pos);
        }
        drop(data);
        child.set_parent(None);
    }

    fn create_text_node(&self, text: &str) -> Self {
        TestXmlNode::new(TestXmlKind::Text, None, None, text)
    }

    fn create_element(&self, uri: Option<&str>, local_name: &str) -> Self {
        TestXmlNode::new(TestXmlKind::Element, uri, Some(local_name), "")
    }

    fn create_attribute(&self, uri: Option<&str>, local_name: &str, value: &str) -> Self {
        TestXmlNode::new(TestXmlKind::Attribute, uri, Some(local_name), value)
    }

    fn set_text(&self, value: &str) {
        self.0.mutable.borrow_mut().text = value.to_string();
    }

    fn normalize(&self) {
        let mut data = self.0.mutable.borrow_mut();
        let mut merged: Vec<TestXmlNode> = Vec::new();
        for child in data.children.drain(..) {
            if child.0.kind == TestXmlKind::Text {
                if child.0.mutable.borrow().text.is_empty() {
                    continue;
                }
                if let Some(last) = merged.last() {
                    if last.0.kind == TestXmlKind::Text {
                        let extra = child.0.mutable.borrow().text.clone();
                        last.0.mutable.borrow_mut().text.push_str(&extra);
                        continue;
                    }
                }
            }
            merged.push(child);
        }
        data.children = merged;
        let children = data.children.clone();
        drop(data);
        for child in &children {
            if child.0.kind == TestXmlKind::Element {
                child.normalize();
            }
        }
    }

    fn fetch_by_generalised_name(&self, name: &GeneralisedName) -> Vec<Self> {
        match name {
            GeneralisedName::Index(i) => self.child_at(*i as usize).into_iter().collect(),
            GeneralisedName::Element { uri, local_name } => self
                .0
                .mutable
                .borrow()
                .children
                .iter()
                .filter(|c| c.0.kind == TestXmlKind::Element && c.matches(uri, local_name))
                .cloned()
                .collect(),
            GeneralisedName::Attribute { uri, local_name } => self
                .0
                .mutable
                .borrow()
                .attributes
                .iter()
                .filter(|a| a.matches(uri, local_name))
                .cloned()
                .collect(),
            GeneralisedName::AnyChild => self.0.mutable.borrow().children.clone(),
            GeneralisedName::Text => self
                .0
                .mutable
                .borrow()
                .children
                .iter()
                .filter(|c| c.0.kind == TestXmlKind::Text)
                .cloned()
                .collect(),
            GeneralisedName::Comment => self
                .0
                .mutable
                .borrow()
                .children
                .iter()
                .filter(|c| c.0.kind == TestXmlKind::Comment)
                .cloned()
                .collect(),
            GeneralisedName::ProcessingInstruction { target } => self
                .0
                .mutable
                .borrow()
                .children
                .iter()
                .filter(|c| {
                    c.0.kind == TestXmlKind::ProcessingInstruction
                        && target.as_deref().map_or(true, |t| c.0.mutable.borrow().local_name.as_deref() == Some(t))
                })
                .cloned()
                .collect(),
            GeneralisedName::Descendants(inner) => {
                let mut out = Vec::new();
                let children = self.0.mutable.borrow().children.clone();
                for child in children {
                    out.extend(child.fetch_by_generalised_name(inner));
                    if child.0.kind == TestXmlKind::Element {
                        out.extend(child.fetch_by_generalised_name(name));
                    }
                }
                out
            }
        }
    }

    fn is_element(&self) -> bool {
        self.0.kind == TestXmlKind::Element
    }

    fn is_attribute(&self) -> bool {
        self.0.kind == TestXmlKind::Attribute
    }

    fn local_name(&self) -> Option<String> {
        self.0.mutable.borrow().local_name.clone()
    }

    fn set_local_name(&self, name: &str) {
        self.0.mutable.borrow_mut().local_name = Some(name.to_string());
    }

    fn uri(&self) -> Option<&str> {
        self.0.uri.as_deref()
    }

    fn node_kind(&self) -> &'static str {
        match self.0.kind {
            TestXmlKind::Element => "element",
            TestXmlKind::Text => "text",
            TestXmlKind::Attribute => "attribute",
            TestXmlKind::Comment => "comment",
            TestXmlKind::ProcessingInstruction => "processing-instruction",
        }
    }

    fn has_simple_content(&self) -> bool {
        match self.0.kind {
            TestXmlKind::Text | TestXmlKind::Attribute => true,
            TestXmlKind::Comment | TestXmlKind::ProcessingInstruction => false,
            TestXmlKind::Element => !self.0.mutable.borrow().children.iter().any(|c| c.is_element()),
        }
    }

    fn text_content(&self) -> String {
        match self.0.kind {
            TestXmlKind::Text | TestXmlKind::Attribute => self.0.mutable.borrow().text.clone(),
            TestXmlKind::Comment | TestXmlKind::ProcessingInstruction => String::new(),
            TestXmlKind::Element => {
                let mut out = String::new();
                for child in &self.0.mutable.borrow().children {
                    out.push_str(&child.text_content());
                }
                out
            }
        }
    }
}

//! The XMLList core: an ordered sequence of XML-node references, optionally
//! *linked* to a property-access expression so that writes can materialise
//! new nodes on an external tree. Grounded directly on ruffle's AVM2
//! `XmlListObject`, the closest real-world analogue to this linked-list
//! behaviour.

use crate::error::{ErrorKind, Result};
use crate::host::XmlNode;

use super::name::{GeneralisedName, Link, LinkTarget, QName};

/// What is being assigned into a slot: the write-path mirror of the read
/// side's three node "shapes".
pub enum Assignment<N> {
    /// A coerced-to-string primitive; becomes a text node (or overwrites an
    /// existing attribute/text node's value).
    Text(String),
    Node(N),
    List(XMLList<N>),
}

#[derive(Clone, Debug)]
pub struct XMLList<N> {
    items: Vec<N>,
    link: Option<Link<N>>,
}

impl<N: XmlNode> XMLList<N> {
    pub fn new() -> Self {
        XMLList {
            items: Vec::new(),
            link: None,
        }
    }

    pub fn from_items(items: Vec<N>) -> Self {
        XMLList { items, link: None }
    }

    pub fn linked(items: Vec<N>, link: Link<N>) -> Self {
        XMLList {
            items,
            link: Some(link),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[N] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&N> {
        self.items.get(index)
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    fn query(&self, name: &GeneralisedName) -> XMLList<N> {
        let mut out = Vec::new();
        for item in &self.items {
            out.extend(item.fetch_by_generalised_name(name));
        }
        XMLList::from_items(out)
    }

    pub fn child(&self, name: &GeneralisedName) -> XMLList<N> {
        self.query(name)
    }

    pub fn children(&self) -> XMLList<N> {
        self.query(&GeneralisedName::AnyChild)
    }

    pub fn descendants(&self, name: &GeneralisedName) -> XMLList<N> {
        self.query(&GeneralisedName::Descendants(Box::new(name.clone())))
    }

    pub fn elements(&self, local_name: Option<&str>) -> XMLList<N> {
        self.query(&GeneralisedName::Element {
            uri: None,
            local_name: local_name.map(str::to_string),
        })
    }

    pub fn attribute(&self, local_name: &str) -> XMLList<N> {
        self.query(&GeneralisedName::Attribute {
            uri: None,
            local_name: Some(local_name.to_string()),
        })
    }

    pub fn attributes(&self) -> XMLList<N> {
        self.query(&GeneralisedName::Attribute {
            uri: None,
            local_name: None,
        })
    }

    pub fn text(&self) -> XMLList<N> {
        self.query(&GeneralisedName::Text)
    }

    pub fn comments(&self) -> XMLList<N> {
        self.query(&GeneralisedName::Comment)
    }

    pub fn processing_instructions(&self, target: Option<&str>) -> XMLList<N> {
        self.query(&GeneralisedName::ProcessingInstruction {
            target: target.map(str::to_string),
        })
    }

    /// The node used to manufacture a brand-new text node when appending to
    /// an unlinked list with no existing items to borrow tree context from:
    /// the link's target node if linked, else the first existing item.
    fn factory_node(&self) -> Option<N> {
        match &self.link {
            Some(Link {
                target: LinkTarget::Node(n),
                ..
            }) => Some(n.clone()),
            _ => self.items.first().cloned(),
        }
    }

    /// Write at `index`. `index >= len`
    /// appends or materialises; `index < len` replaces in place.
    pub fn set(&mut self, index: usize, value: Assignment<N>) -> Result<()> {
        if index >= self.items.len() {
            self.append_or_materialise(index, value)
        } else {
            self.replace_at(index, value)
        }
    }

    fn append_or_materialise(&mut self, index: usize, value: Assignment<N>) -> Result<()> {
        let link = self.link.clone();
        match link {
            None => {
                match value {
                    Assignment::Text(text) => {
                        let factory = self
                            .factory_node()
                            .ok_or(ErrorKind::UndefinedReference { what: "xml tree context for new text node" })?;
                        self.insert_item(index, factory.create_text_node(&text));
                    }
                    Assignment::Node(node) => self.insert_item(index, node),
                    Assignment::List(list) => {
                        for (offset, item) in list.items.into_iter().enumerate() {
                            self.insert_item(index + offset, item);
                        }
                    }
                }
                Ok(())
            }
            Some(link) => self.materialise_on_target(index, &link, value),
        }
    }

    fn insert_item(&mut self, index: usize, node: N) {
        if index >= self.items.len() {
            self.items.push(node);
        } else {
            self.items.insert(index, node);
        }
    }

    /// Resolve the link's target to a single element node to materialise
    /// against: a `Node` target is used directly; a
    /// `List` target collapses if it has exactly one item, blocks if it has
    /// more than one, and fails if it is empty.
    fn resolve_target_element(link: &Link<N>) -> Result<N> {
        match &link.target {
            LinkTarget::Node(n) => Ok(n.clone()),
            LinkTarget::List(list) => match list.items.len() {
                1 => Ok(list.items[0].clone()),
                0 => Err(ErrorKind::UndefinedReference { what: "linked XMLList target has no elements" }),
                _ => Err(ErrorKind::ArgumentOutOfRange { what: "linked XMLList target has more than one element" }),
            },
        }
    }

    fn materialise_on_target(&mut self, index: usize, link: &Link<N>, value: Assignment<N>) -> Result<()> {
        let target = Self::resolve_target_element(link)?;
        let text = match &value {
            Assignment::Text(t) => t.clone(),
            Assignment::Node(n) => n.text_content(),
            Assignment::List(l) => l
                .items
                .first()
                .map(|n| n.text_content())
                .unwrap_or_default(),
        };

        let new_node = if link.is_attribute {
            let name = link.local_name.as_deref().unwrap_or("");
            target.create_attribute(link.uri.as_deref(), name, &text)
        } else if let Assignment::Node(n) = value {
            target.insert_child_after(target.child_at(target_last_child_index(&target)).as_ref(), n.clone());
            n
        } else {
            let name = link.local_name.as_deref().unwrap_or("");
            let element = target.create_element(link.uri.as_deref(), name);
            if !text.is_empty() {
                element.insert_child_after(None, element.create_text_node(&text));
            }
            let after = target.child_at(target_last_child_index(&target));
            target.insert_child_after(after.as_ref(), element.clone());
            element
        };

        self.insert_item(index, new_node);
        Ok(())
    }

    fn replace_at(&mut self, index: usize, value: Assignment<N>) -> Result<()> {
        let old = self.items[index].clone();

        match value {
            Assignment::Text(text) => {
                if old.is_attribute() || !old.is_element() {
                    old.set_text(&text);
                } else {
                    let replacement = old.create_text_node(&text);
                    self.swap_in(index, &old, replacement);
                }
            }
            Assignment::Node(node) => {
                self.swap_in(index, &old, node);
            }
            Assignment::List(list) => {
                if list.is_empty() {
                    self.delete(index);
                } else {
                    let mut iter = list.items.into_iter();
                    let first = iter.next().unwrap();
                    self.swap_in(index, &old, first);
                    for (offset, sibling) in iter.enumerate() {
                        self.insert_item(index + 1 + offset, sibling);
                    }
                }
            }
        }
        Ok(())
    }

    fn swap_in(&mut self, index: usize, old: &N, new_node: N) {
        if let Some(parent) = old.parent() {
            parent.replace_child(old, new_node.clone());
        }
        self.items[index] = new_node;
    }

    /// Remove the item at `index` from this list and, if it has a parent,
    /// from the parent's child list too.
    pub fn delete(&mut self, index: usize) {
        if index >= self.items.len() {
            return;
        }
        let node = self.items.remove(index);
        if let Some(parent) = node.parent() {
            parent.delete_child_or_attr(&node);
        }
    }

    /// Delegate query-name deletion to each item individually.
    pub fn delete_by_name(&mut self, name: &GeneralisedName) {
        for item in &self.items {
            for matched in item.fetch_by_generalised_name(name) {
                if let Some(parent) = matched.parent() {
                    parent.delete_child_or_attr(&matched);
                }
            }
        }
    }

    /// Merge runs of consecutive text/CDATA children into one text node,
    /// recursively, dropping empty runs. Delegates the
    /// node-local merge to [`XmlNode::normalize`]; detached/removed nodes
    /// fall out of this list's own items if a normalize pass removed them
    /// from their parent.
    pub fn normalize(&mut self) {
        for item in &self.items {
            item.normalize();
        }
        let single = self.items.len() == 1;
        self.items.retain(|item| single || item.parent().is_some());
    }

    fn require_single(&self) -> Result<&N> {
        if self.items.len() != 1 {
            return Err(ErrorKind::XMLListOneItemOnly { length: self.items.len() });
        }
        Ok(&self.items[0])
    }

    pub fn local_name(&self) -> Result<Option<String>> {
        Ok(self.require_single()?.local_name())
    }

    pub fn namespace_uri(&self) -> Result<Option<String>> {
        Ok(self.require_single()?.uri().map(str::to_string))
    }

    /// The qualified name `(uri, localName)` of the sole item.
    pub fn name(&self) -> Result<QName> {
        let node = self.require_single()?;
        Ok(QName {
            uri: node.uri().map(str::to_string),
            local_name: node.local_name().unwrap_or_default(),
        })
    }

    /// One of `"element"`, `"attribute"`, `"text"`, `"comment"`, or
    /// `"processing-instruction"`, for the sole item.
    pub fn node_kind(&self) -> Result<&'static str> {
        Ok(self.require_single()?.node_kind())
    }

    pub fn append_child(&mut self, child: N) -> Result<()> {
        let target = self.require_single()?.clone();
        let last = target_last_child_index(&target);
        target.insert_child_after(target.child_at(last).as_ref(), child);
        Ok(())
    }

    pub fn prepend_child(&mut self, child: N) -> Result<()> {
        let target = self.require_single()?.clone();
        target.insert_child_after(None, child);
        Ok(())
    }

    pub fn insert_child_after(&mut self, after: Option<&N>, child: N) -> Result<()> {
        let target = self.require_single()?.clone();
        target.insert_child_after(after, child);
        Ok(())
    }

    /// Insert `child` into the sole item's children, immediately before
    /// `before` (or at the end, if `before` is `None` or not actually a
    /// child of the sole item).
    pub fn insert_child_before(&mut self, before: Option<&N>, child: N) -> Result<()> {
        let target = self.require_single()?.clone();
        let prev = match before {
            None => target.child_at(target_last_child_index(&target)),
            Some(before) => {
                let mut i = 0;
                let mut prev = None;
                while let Some(sibling) = target.child_at(i) {
                    if &sibling == before {
                        break;
                    }
                    prev = Some(sibling);
                    i += 1;
                }
                prev
            }
        };
        target.insert_child_after(prev.as_ref(), child);
        Ok(())
    }

    /// Discard all of the sole item's existing children and replace them
    /// with `children`, in order.
    pub fn set_children(&mut self, children: XMLList<N>) -> Result<()> {
        let target = self.require_single()?.clone();
        while let Some(child) = target.child_at(0) {
            target.delete_child_or_attr(&child);
        }
        for child in children.items {
            let last = target_last_child_index(&target);
            target.insert_child_after(target.child_at(last).as_ref(), child);
        }
        Ok(())
    }

    /// Replace the last child of the sole item matching `name` with `value`;
    /// a no-op if nothing matches. Mirrors `replace_at`'s handling of each
    /// [`Assignment`] shape, but rewrites the target's own child list via
    /// the host rather than this list's items.
    pub fn replace(&mut self, name: &GeneralisedName, value: Assignment<N>) -> Result<()> {
        let target = self.require_single()?.clone();
        let Some(old) = target.fetch_by_generalised_name(name).into_iter().last() else {
            return Ok(());
        };

        match value {
            Assignment::Text(text) => {
                if old.is_attribute() || !old.is_element() {
                    old.set_text(&text);
                } else {
                    let replacement = old.create_text_node(&text);
                    target.replace_child(&old, replacement);
                }
            }
            Assignment::Node(node) => {
                target.replace_child(&old, node);
            }
            Assignment::List(list) => {
                if list.is_empty() {
                    target.delete_child_or_attr(&old);
                } else {
                    let mut iter = list.items.into_iter();
                    let first = iter.next().unwrap();
                    target.replace_child(&old, first.clone());
                    let mut after = first;
                    for sibling in iter {
                        target.insert_child_after(Some(&after), sibling.clone());
                        after = sibling;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn child_index(&self) -> Result<usize> {
        let node = self.require_single()?.clone();
        let parent = node.parent().ok_or(ErrorKind::UndefinedReference { what: "parent of XML node" })?;
        let mut i = 0;
        while let Some(sibling) = parent.child_at(i) {
            if sibling == node {
                return Ok(i);
            }
            i += 1;
        }
        Err(ErrorKind::UndefinedReference { what: "XML node not found among its parent's children" })
    }

    pub fn set_local_name(&mut self, name: &str) -> Result<()> {
        self.require_single()?.set_local_name(name);
        Ok(())
    }

    pub fn to_string_value(&self) -> String {
        if self.has_simple_content() {
            self.items.iter().map(|n| n.text_content()).collect::<Vec<_>>().join("")
        } else {
            self.to_xml_string()
        }
    }

    pub fn to_xml_string(&self) -> String {
        self.items.iter().map(|n| n.text_content()).collect::<Vec<_>>().join("\n")
    }

    fn has_simple_content(&self) -> bool {
        self.items.len() <= 1 && self.items.iter().all(|n| n.has_simple_content())
    }
}

/// Index of `target`'s last existing child (0 if it has none), so callers
/// can pass `target.child_at(this)` as the `after` argument to
/// `insert_child_after` when appending.
fn target_last_child_index<N: XmlNode>(target: &N) -> usize {
    let mut i = 0;
    while target.child_at(i).is_some() {
        i += 1;
    }
    i.saturating_sub(1)
}

impl<N: XmlNode> Default for XMLList<N> {
    fn default() -> Self {
        XMLList::new()
    }
}

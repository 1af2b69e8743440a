//! Generalised names: the query vocabulary XMLList's read operations and
//! the `fetch_by_generalised_name` collaborator method share. `None` fields
//! act as wildcards.

#[derive(Clone, Debug, PartialEq)]
pub enum GeneralisedName {
    /// A plain integer index into a list (`list[3]`).
    Index(u32),

    /// An element child matching `(uri, localName)`.
    Element { uri: Option<String>, local_name: Option<String> },

    /// An attribute matching `(uri, localName)`.
    Attribute { uri: Option<String>, local_name: Option<String> },

    /// Any element child at all (`children()`).
    AnyChild,

    /// Every descendant-or-self matching the wrapped name (`descendants()`).
    Descendants(Box<GeneralisedName>),

    Text,
    Comment,
    ProcessingInstruction { target: Option<String> },
}

/// The qualified name of a single node, as returned by `XMLList::name`.
#[derive(Clone, Debug, PartialEq)]
pub struct QName {
    pub uri: Option<String>,
    pub local_name: String,
}

/// A linked XMLList's back-reference: "the list you would get from reading
/// `target[uri::localName]`".
#[derive(Clone, Debug)]
pub struct Link<N> {
    pub target: LinkTarget<N>,
    pub uri: Option<String>,
    pub local_name: Option<String>,
    pub is_attribute: bool,
}

#[derive(Clone, Debug)]
pub enum LinkTarget<N> {
    Node(N),
    List(Box<super::XMLList<N>>),
}

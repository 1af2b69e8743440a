//! XMLList: an ordered sequence of XML-node references, optionally linked
//! to a property-access expression.

mod list;
mod name;

pub use list::{Assignment, XMLList};
pub use name::{GeneralisedName, Link, LinkTarget, QName};

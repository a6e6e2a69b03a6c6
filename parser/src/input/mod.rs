//! Input trees handed to the DOM builders.
//!
//! Both trees can be assembled directly or produced from text by the thin
//! `parse` adapters.

pub mod json;
pub mod xml;

pub use json::{JsonKind, JsonMember, JsonPrimitive, JsonValue};
pub use xml::{XmlAttribute, XmlContent, XmlElement};

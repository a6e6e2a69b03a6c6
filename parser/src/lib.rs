//! Reads YANG instance data from XML and JSON, validates it against a schema
//! and merges several inputs into one instance tree.
//!
//! The pipeline per input is:
//!
//! 1. an input tree ([`XmlElement`] or [`JsonValue`]), assembled directly or
//!    parsed from text,
//! 2. a [`DomDocument`], the format-agnostic raw data,
//! 3. a schema-validated instance tree in the session's [`InstanceArena`].
//!
//! [`DataSession::build_combined_tree`] finally merges all instance trees.
//! Every problem found along the way is recorded in the session's
//! [`FindingsManager`](yang_data_core::FindingsManager) rather than returned
//! as an error.
//!
//! # Example
//!
//! ```
//! use yang_data_core::{ModuleSchema, ParserFindingType, SchemaModel, SchemaNodeDef};
//! use yang_data_parser::DataSession;
//!
//! let schema = SchemaModel::new(vec![ModuleSchema::new("acme", "urn:acme").with_node(
//!     SchemaNodeDef::container("system").with_child(SchemaNodeDef::leaf("hostname", "string")),
//! )])
//! .unwrap();
//!
//! let mut session = DataSession::new();
//! session.add_xml_text(
//!     "running.xml",
//!     r#"<data><system xmlns="urn:acme"><hostname>core-1</hostname></system></data>"#,
//! );
//! session.add_json_text("candidate.json", r#"{"acme:system": {"hostname": "core-2"}}"#);
//!
//! let root = session.build_combined_tree(&schema);
//! let system = session.arena().find_container(root, "urn:acme", "system").unwrap();
//! assert_eq!(session.arena().leaf_value(system, "urn:acme", "hostname"), Some("core-1"));
//! assert!(session.findings().has_finding_of_type(ParserFindingType::P073LeafValueAlreadySet));
//! ```

pub mod dom;
pub mod error;
pub mod input;
pub mod instance;
pub mod session;

pub use dom::{
    AnnotationValue, DocumentSet, DomDocument, DomNode, DomValue, PrefixResolver, SourceDataType,
};
pub use error::{DataError, Result};
pub use input::{
    JsonKind, JsonMember, JsonPrimitive, JsonValue, XmlAttribute, XmlContent, XmlElement,
};
pub use instance::builder::{TopLevelFilter, translate_document};
pub use instance::merge::{merge_into, merge_trees};
pub use instance::{
    DomRef, InstanceArena, InstanceId, InstanceKind, InstanceNode, InstanceSnapshot,
    StructureChildren,
};
pub use session::DataSession;

//! Findings, severities and schema lookup shared by the YANG instance-data
//! readers.
//!
//! - [`Finding`]: a structured diagnostic with a stable type code, message,
//!   position and the object it refers to.
//! - [`FindingsManager`]: the per-session collector. It grades findings with
//!   a [`SeverityCalculator`], drops suppressed ones and indexes the rest by
//!   document, data node, module and statement.
//! - [`ModuleTypePathFilter`] and [`ModuleSeverityFilter`]: string-configured
//!   suppression filters.
//! - [`DataSchema`] and [`SchemaNode`]: the schema view instance translation
//!   needs, with [`SchemaModel`] as an in-memory implementation.
//! - [`DataConfig`]: YAML session configuration.
//!
//! # Example
//!
//! ```
//! use yang_data_core::*;
//!
//! let config = DataConfig::from_yaml_str(
//!     r#"
//! version: "1.0"
//! findings:
//!   severities:
//!     P073_LEAF_VALUE_ALREADY_SET: warning
//!   filters: ["*;P079_*;*"]
//! "#,
//! )
//! .unwrap();
//!
//! let mut findings = config.findings.build_manager().unwrap();
//! findings.add_finding(Finding::new(ParserFindingType::P079EmptyDataFile, "empty"));
//! findings.add_finding(Finding::new(ParserFindingType::P073LeafValueAlreadySet, "conflict"));
//!
//! assert_eq!(findings.len(), 1);
//! assert!(!findings.has_findings_with_severity(FindingSeverity::Error));
//! ```

mod config;
mod error;
mod filter;
mod finding;
mod finding_type;
mod manager;
mod model;
mod schema;
mod severity;

pub use config::{DataConfig, DataFilterConfig, FindingsConfig};
pub use error::{CoreError, Result};
pub use filter::{FindingFilter, ModuleSeverityFilter, ModuleTypePathFilter, PredicateFilter};
pub use finding::{DocumentId, DomNodeId, Finding, FindingSubject, FindingTarget};
pub use finding_type::{FindingCategory, ParserFindingType};
pub use manager::FindingsManager;
pub use model::{ModuleSchema, SchemaModel, SchemaNodeDef};
pub use schema::{
    DataSchema, SchemaNode, SchemaNodeKind, find_schema_node, find_schema_node_by_name,
    flatten_candidates,
};
pub use severity::{FindingSeverity, SeverityCalculator};

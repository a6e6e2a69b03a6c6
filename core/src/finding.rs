//! Structured diagnostic records.

use serde::{Deserialize, Serialize};

use crate::finding_type::ParserFindingType;

/// Identifier of one input document within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub u32);

/// Index of a node within one document's DOM arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomNodeId(pub usize);

impl DomNodeId {
    /// The document root of every DOM arena.
    pub const ROOT: DomNodeId = DomNodeId(0);
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// What a finding is about. At most one object is referenced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingSubject {
    /// Not tied to any document or model.
    General,
    /// A whole input document.
    Document {
        document: DocumentId,
        input_name: String,
    },
    /// One node of an input document's DOM.
    DataNode {
        document: DocumentId,
        input_name: String,
        node: DomNodeId,
    },
    /// A schema module.
    Model { module: String },
    /// A statement within a schema module, identified by its schema path.
    Statement { module: String, schema_path: String },
}

/// An object findings can be attached to and queried by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingTarget {
    Document(DocumentId),
    DataNode(DocumentId, DomNodeId),
    Model(String),
    Statement(String, String),
}

/// A single diagnostic.
///
/// Findings compare by all of their fields; the findings manager stores each
/// distinct finding once.
///
/// # Examples
///
/// ```
/// use yang_data_core::{DocumentId, DomNodeId, Finding, ParserFindingType};
///
/// let finding = Finding::on_data_node(
///     ParserFindingType::P080NullValue,
///     "Leaf '/top/name' does not have a value.",
///     DocumentId(0),
///     "input.json",
///     DomNodeId(3),
/// )
/// .at(4, 12);
///
/// assert_eq!(
///     finding.to_string(),
///     "input.json / line 4 / char 12 P080_NULL_VALUE: Leaf '/top/name' does not have a value."
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub finding_type: String,
    pub message: String,
    /// 1-based line, 0 when unknown.
    #[serde(default)]
    pub line: usize,
    /// 1-based column, 0 when unknown.
    #[serde(default)]
    pub column: usize,
    pub subject: FindingSubject,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message_text: Option<String>,
}

impl Finding {
    /// A finding not tied to any object.
    pub fn new(finding_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            finding_type: finding_type.into(),
            message: message.into(),
            line: 0,
            column: 0,
            subject: FindingSubject::General,
            error_message_text: None,
        }
    }

    pub fn on_document(
        finding_type: impl Into<String>,
        message: impl Into<String>,
        document: DocumentId,
        input_name: impl Into<String>,
    ) -> Self {
        Self {
            subject: FindingSubject::Document {
                document,
                input_name: input_name.into(),
            },
            ..Self::new(finding_type, message)
        }
    }

    pub fn on_data_node(
        finding_type: impl Into<String>,
        message: impl Into<String>,
        document: DocumentId,
        input_name: impl Into<String>,
        node: DomNodeId,
    ) -> Self {
        Self {
            subject: FindingSubject::DataNode {
                document,
                input_name: input_name.into(),
                node,
            },
            ..Self::new(finding_type, message)
        }
    }

    pub fn on_model(
        finding_type: impl Into<String>,
        message: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            subject: FindingSubject::Model {
                module: module.into(),
            },
            ..Self::new(finding_type, message)
        }
    }

    pub fn on_statement(
        finding_type: impl Into<String>,
        message: impl Into<String>,
        module: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Self {
        Self {
            subject: FindingSubject::Statement {
                module: module.into(),
                schema_path: schema_path.into(),
            },
            ..Self::new(finding_type, message)
        }
    }

    /// Sets the source position.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_error_message_text(mut self, text: impl Into<String>) -> Self {
        self.error_message_text = Some(text.into());
        self
    }

    /// Whether this finding carries the given built-in type.
    pub fn is(&self, finding_type: ParserFindingType) -> bool {
        self.finding_type == finding_type.as_str()
    }

    /// Module the finding belongs to, for model and statement findings.
    pub fn module_name(&self) -> Option<&str> {
        match &self.subject {
            FindingSubject::Model { module } | FindingSubject::Statement { module, .. } => {
                Some(module)
            }
            _ => None,
        }
    }

    pub fn schema_path(&self) -> Option<&str> {
        match &self.subject {
            FindingSubject::Statement { schema_path, .. } => Some(schema_path),
            _ => None,
        }
    }

    /// Every object this finding is attached to.
    ///
    /// A data-node finding also belongs to its document, and a statement
    /// finding also belongs to its module.
    pub fn targets(&self) -> Vec<FindingTarget> {
        match &self.subject {
            FindingSubject::General => Vec::new(),
            FindingSubject::Document { document, .. } => vec![FindingTarget::Document(*document)],
            FindingSubject::DataNode { document, node, .. } => vec![
                FindingTarget::DataNode(*document, *node),
                FindingTarget::Document(*document),
            ],
            FindingSubject::Model { module } => vec![FindingTarget::Model(module.clone())],
            FindingSubject::Statement {
                module,
                schema_path,
            } => vec![
                FindingTarget::Statement(module.clone(), schema_path.clone()),
                FindingTarget::Model(module.clone()),
            ],
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let origin = match &self.subject {
            FindingSubject::General => None,
            FindingSubject::Document { input_name, .. }
            | FindingSubject::DataNode { input_name, .. } => Some(input_name.as_str()),
            FindingSubject::Model { module } | FindingSubject::Statement { module, .. } => {
                Some(module.as_str())
            }
        };

        if let Some(origin) = origin {
            write!(f, "{origin}")?;
            if self.line > 0 {
                write!(f, " / line {}", self.line)?;
            }
            if self.column > 0 {
                write!(f, " / char {}", self.column)?;
            }
            write!(f, " ")?;
        }

        write!(f, "{}: {}", self.finding_type, self.message)?;
        if let Some(text) = &self.error_message_text {
            write!(f, " ({text})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_finding_display() {
        let f = Finding::new("P000_UNSPECIFIED_ERROR", "boom").with_error_message_text("detail");
        assert_eq!(f.to_string(), "P000_UNSPECIFIED_ERROR: boom (detail)");
        assert!(f.targets().is_empty());
    }

    #[test]
    fn test_data_node_finding_targets_node_and_document() {
        let f = Finding::on_data_node("X", "m", DocumentId(2), "a.xml", DomNodeId(7));
        assert_eq!(
            f.targets(),
            vec![
                FindingTarget::DataNode(DocumentId(2), DomNodeId(7)),
                FindingTarget::Document(DocumentId(2)),
            ]
        );
    }

    #[test]
    fn test_statement_finding_exposes_module_and_path() {
        let f = Finding::on_statement("X", "m", "mod-a", "/top/leaf");
        assert_eq!(f.module_name(), Some("mod-a"));
        assert_eq!(f.schema_path(), Some("/top/leaf"));
        assert_eq!(f.targets().len(), 2);
    }

    #[test]
    fn test_display_skips_unknown_position() {
        let f = Finding::on_document("P079_EMPTY_DATA_FILE", "empty", DocumentId(0), "in.xml");
        assert_eq!(f.to_string(), "in.xml P079_EMPTY_DATA_FILE: empty");
    }

    #[test]
    fn test_equal_findings_hash_equal() {
        use std::collections::HashSet;
        let a = Finding::new("X", "same").at(1, 1);
        let b = Finding::new("X", "same").at(1, 1);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }
}

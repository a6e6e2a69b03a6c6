//! Built-in finding type codes and their categories.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Broad classification of what went wrong with a piece of instance data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingCategory {
    /// No schema node corresponds to a data node.
    StructuralMismatch,
    /// The same instance is declared twice within one input.
    DuplicateInstance,
    /// A leaf, leaf-list entry or list key has no usable value.
    MissingValue,
    /// Two inputs disagree on the value of a leaf.
    ConflictingMerge,
    /// An annotation does not have the expected shape.
    MalformedAnnotation,
    /// A prefix has no namespace mapping.
    UnresolvableNamespace,
    /// The document itself is not shaped like instance data.
    MalformedDocument,
    /// Unexpected internal failure.
    Internal,
}

/// Finding types raised while reading and combining instance data.
///
/// Finding types form an open taxonomy: [`crate::Finding`] stores the code as
/// a string, so callers may raise codes of their own next to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParserFindingType {
    #[serde(rename = "P000_UNSPECIFIED_ERROR")]
    P000UnspecifiedError,
    #[serde(rename = "P015_INVALID_SYNTAX_IN_DOCUMENT")]
    P015InvalidSyntaxInDocument,
    #[serde(rename = "P069_UNEXPECTED_JSON_VALUE")]
    P069UnexpectedJsonValue,
    #[serde(rename = "P070_WRONG_JSON_VALUE_TYPE")]
    P070WrongJsonValueType,
    #[serde(rename = "P071_INCORRECT_ROOT_ELEMENT_OF_DATA_FILE")]
    P071IncorrectRootElementOfDataFile,
    #[serde(rename = "P072_MISSING_KEY_VALUE")]
    P072MissingKeyValue,
    #[serde(rename = "P073_LEAF_VALUE_ALREADY_SET")]
    P073LeafValueAlreadySet,
    #[serde(rename = "P075_CORRESPONDING_SCHEMA_NODE_NOT_FOUND")]
    P075CorrespondingSchemaNodeNotFound,
    #[serde(rename = "P076_DUPLICATE_INSTANCE_DATA")]
    P076DuplicateInstanceData,
    #[serde(rename = "P077_UNRESOLVABLE_PREFIX")]
    P077UnresolvablePrefix,
    #[serde(rename = "P079_EMPTY_DATA_FILE")]
    P079EmptyDataFile,
    #[serde(rename = "P080_NULL_VALUE")]
    P080NullValue,
}

impl ParserFindingType {
    pub const ALL: [ParserFindingType; 12] = [
        Self::P000UnspecifiedError,
        Self::P015InvalidSyntaxInDocument,
        Self::P069UnexpectedJsonValue,
        Self::P070WrongJsonValueType,
        Self::P071IncorrectRootElementOfDataFile,
        Self::P072MissingKeyValue,
        Self::P073LeafValueAlreadySet,
        Self::P075CorrespondingSchemaNodeNotFound,
        Self::P076DuplicateInstanceData,
        Self::P077UnresolvablePrefix,
        Self::P079EmptyDataFile,
        Self::P080NullValue,
    ];

    /// Stable string code, as stored on a [`crate::Finding`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P000UnspecifiedError => "P000_UNSPECIFIED_ERROR",
            Self::P015InvalidSyntaxInDocument => "P015_INVALID_SYNTAX_IN_DOCUMENT",
            Self::P069UnexpectedJsonValue => "P069_UNEXPECTED_JSON_VALUE",
            Self::P070WrongJsonValueType => "P070_WRONG_JSON_VALUE_TYPE",
            Self::P071IncorrectRootElementOfDataFile => {
                "P071_INCORRECT_ROOT_ELEMENT_OF_DATA_FILE"
            }
            Self::P072MissingKeyValue => "P072_MISSING_KEY_VALUE",
            Self::P073LeafValueAlreadySet => "P073_LEAF_VALUE_ALREADY_SET",
            Self::P075CorrespondingSchemaNodeNotFound => {
                "P075_CORRESPONDING_SCHEMA_NODE_NOT_FOUND"
            }
            Self::P076DuplicateInstanceData => "P076_DUPLICATE_INSTANCE_DATA",
            Self::P077UnresolvablePrefix => "P077_UNRESOLVABLE_PREFIX",
            Self::P079EmptyDataFile => "P079_EMPTY_DATA_FILE",
            Self::P080NullValue => "P080_NULL_VALUE",
        }
    }

    pub fn category(self) -> FindingCategory {
        match self {
            Self::P075CorrespondingSchemaNodeNotFound => FindingCategory::StructuralMismatch,
            Self::P076DuplicateInstanceData => FindingCategory::DuplicateInstance,
            Self::P072MissingKeyValue | Self::P080NullValue => FindingCategory::MissingValue,
            Self::P073LeafValueAlreadySet => FindingCategory::ConflictingMerge,
            Self::P069UnexpectedJsonValue => FindingCategory::MalformedAnnotation,
            Self::P077UnresolvablePrefix => FindingCategory::UnresolvableNamespace,
            Self::P015InvalidSyntaxInDocument
            | Self::P070WrongJsonValueType
            | Self::P071IncorrectRootElementOfDataFile
            | Self::P079EmptyDataFile => FindingCategory::MalformedDocument,
            Self::P000UnspecifiedError => FindingCategory::Internal,
        }
    }
}

impl std::fmt::Display for ParserFindingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserFindingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::InvalidFindingType(s.to_string()))
    }
}

impl AsRef<str> for ParserFindingType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<ParserFindingType> for String {
    fn from(value: ParserFindingType) -> Self {
        value.as_str().to_string()
    }
}

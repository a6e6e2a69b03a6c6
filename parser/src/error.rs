//! Error types for the instance-data pipeline.
//!
//! Problems with the input data are reported as findings, never through these
//! errors. A [`DataError`] means a tokenizer failed or an internal invariant
//! did not hold.

use thiserror::Error;
use yang_data_core::{CoreError, DocumentId};

use crate::instance::InstanceId;

#[derive(Debug, Error)]
pub enum DataError {
    /// XML text is not well-formed.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// JSON text is not well-formed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An instance id does not refer to a live node.
    #[error("Instance {0:?} is not present in the arena")]
    DanglingInstance(InstanceId),

    /// Children were requested from a leaf-like instance.
    #[error("Instance {0:?} cannot hold child instances")]
    NotStructural(InstanceId),

    /// A schema node was matched whose kind cannot carry instance data.
    #[error("Schema node '{0}' cannot be instantiated")]
    UnexpectedSchemaKind(String),

    /// A document was handed over numbered out of sequence.
    #[error("Document {found} was inserted where {expected} was expected")]
    UnexpectedDocumentId {
        expected: DocumentId,
        found: DocumentId,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, DataError>;

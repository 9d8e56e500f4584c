//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid requests against the tree or format model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid schema format: {0:?}")]
    InvalidFormat(String),

    #[error("format index {index} out of range (have {len} formats)")]
    FormatIndexOutOfRange { index: usize, len: usize },

    #[error("unknown tree node: {0}")]
    UnknownNode(String),

    #[error("unknown schema: {0}")]
    UnknownSchema(String),
}

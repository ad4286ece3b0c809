//! Error types for query and document operations.

use elastiq_mapping::MappingError;
use thiserror::Error;

/// Elastiq error type.
#[derive(Error, Debug)]
pub enum ElastiqError {
    /// Document or index not found.
    #[error("Document not found: {index}/{id}")]
    NotFound {
        /// Index name.
        index: String,
        /// Document ID, empty for index-level operations.
        id: String,
    },

    /// Document or index already exists.
    #[error("Already exists: {index}/{id}")]
    AlreadyExists {
        /// Index name.
        index: String,
        /// Document ID, empty for index-level operations.
        id: String,
    },

    /// Comparison operator no strategy handles.
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Operator token claimed by two strategies.
    #[error("Operator '{0}' is already registered")]
    ConflictingOperator(String),

    /// Operand of the wrong shape for its operator or operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Request rejected by the store.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Store could not be reached or answered unexpectedly.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Operation issued without a target index.
    #[error("No index selected")]
    MissingIndex,

    /// Malformed configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mapping definition error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ElastiqError {
    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ElastiqError::NotFound { .. })
    }

    /// Whether this is an already-exists error.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ElastiqError::AlreadyExists { .. })
    }
}

impl From<opensearch::Error> for ElastiqError {
    fn from(err: opensearch::Error) -> Self {
        ElastiqError::Transport(err.to_string())
    }
}

/// Result type alias for elastiq operations.
pub type Result<T> = std::result::Result<T, ElastiqError>;

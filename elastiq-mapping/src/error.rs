//! Error types for mapping definitions.

use crate::field_type::FieldType;
use thiserror::Error;

/// Mapping definition error type.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Wire type name not known to the mapping DSL.
    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    /// Options rejected by the field type they were given for.
    #[error("Invalid options for {field_type} field '{field}': {reason}")]
    InvalidOptions {
        /// Field name.
        field: String,
        /// Field type the options were parsed for.
        field_type: FieldType,
        /// Parser message.
        reason: String,
    },

    /// Field definition that is not a JSON object.
    #[error("Invalid definition for field '{field}': {reason}")]
    InvalidDefinition {
        /// Field name.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;

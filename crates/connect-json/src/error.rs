//! Error types for connect-json.

use connect_types::{DataError, SchemaError, SchemaType};
use thiserror::Error;

/// Errors that can occur during JSON conversion.
#[derive(Error, Debug)]
pub enum JsonConverterError {
    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid schema JSON: {0}")]
    InvalidSchema(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Expected a value for a {expected} schema, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("Null value for required {0} schema with no default")]
    MissingRequired(SchemaType),

    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("Cannot encode non-finite float: {0}")]
    NonFiniteFloat(f64),

    #[error("Value {value} out of range for {schema_type}")]
    OutOfRange {
        schema_type: SchemaType,
        value: String,
    },

    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl JsonConverterError {
    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::SchemaMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

/// Result type alias for connect-json operations.
pub type Result<T> = std::result::Result<T, JsonConverterError>;

//! Error types for record conversion.

use connect_types::{DataError, SchemaError, SchemaType, SinkRecord};
use thiserror::Error;

/// Why a single record could not be converted.
///
/// None of these are retried here; the caller decides whether to abort,
/// skip, or dead-letter the record.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Key is used as document id and can not be null")]
    NullKey,

    #[error("{key_type} is not supported as the document id")]
    UnsupportedKeyType { key_type: String },

    #[error("Could not decode embedded document key: {0}")]
    KeyDecoding(String),

    #[error("Document id resolved to an empty string")]
    EmptyId,

    #[error("Null value for a required {schema_type} field with no default value")]
    MissingRequiredValue { schema_type: SchemaType },

    #[error("Rewritten schema does not correspond to the original: {0}")]
    InternalSchemaMismatch(String),

    #[error("Expected a {expected} value, found {found}")]
    UnexpectedValue { expected: String, found: &'static str },

    #[error("Payload encoding failed: {0}")]
    Codec(#[source] Box<dyn std::error::Error + Send + Sync>),
}

// Builder and struct errors can only come from schemas or values the
// rewriters produced themselves.
impl From<SchemaError> for ConvertError {
    fn from(e: SchemaError) -> Self {
        ConvertError::InternalSchemaMismatch(e.to_string())
    }
}

impl From<DataError> for ConvertError {
    fn from(e: DataError) -> Self {
        ConvertError::InternalSchemaMismatch(e.to_string())
    }
}

/// A [`ConvertError`] tagged with the location of the offending record.
#[derive(Error, Debug)]
#[error("Failed to convert record {topic}-{partition}@{offset}: {source}")]
pub struct RecordError {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    #[source]
    pub source: ConvertError,
}

impl RecordError {
    pub fn new(record: &SinkRecord, source: ConvertError) -> Self {
        Self {
            topic: record.topic.clone(),
            partition: record.partition,
            offset: record.offset,
            source,
        }
    }

    pub fn kind(&self) -> &ConvertError {
        &self.source
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

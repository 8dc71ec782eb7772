//! Error types for connect-types.

use crate::schema::SchemaType;
use thiserror::Error;

/// Errors raised while constructing a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Cannot add field '{field}' to a {schema_type} schema")]
    FieldOnNonStruct {
        field: String,
        schema_type: SchemaType,
    },

    #[error("Default value of type {found} does not conform to a {schema_type} schema")]
    InvalidDefault {
        schema_type: SchemaType,
        found: &'static str,
    },

    #[error("Invalid decimal scale parameter: {0}")]
    InvalidScale(String),
}

/// Errors raised while building or reading struct values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Schema of type {0} cannot back a struct value")]
    NotAStruct(SchemaType),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Value of type {found} is not valid for field '{field}' of type {expected}")]
    FieldValueMismatch {
        field: String,
        expected: SchemaType,
        found: &'static str,
    },
}

//! Document id resolution.
//!
//! Three mutually exclusive modes:
//!
//! - [`IdMode::EmbeddedKey`] - the key is a JSON object `{"uuid": …, "index": …}`;
//!   `uuid` is the id and `index` selects the destination `<topic>-<index>`
//! - [`IdMode::Synthetic`] - `topic+partition+offset`, ignoring the key
//! - [`IdMode::DirectKey`] - the key itself, when it is an integer or a string

use crate::error::{ConvertError, Result};
use connect_types::{Converter, Schema, SinkRecord, Value};
use tracing::trace;

/// Key field holding the document id in embedded-key mode.
pub const EMBEDDED_ID_FIELD: &str = "uuid";
/// Key field holding the index suffix in embedded-key mode.
pub const EMBEDDED_INDEX_FIELD: &str = "index";

/// How the document id is derived from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMode {
    EmbeddedKey,
    Synthetic,
    DirectKey,
}

/// A resolved document id and, in embedded-key mode, the destination it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    pub id: String,
    pub index_override: Option<String>,
}

impl ResolvedId {
    fn plain(id: String) -> Self {
        Self {
            id,
            index_override: None,
        }
    }
}

/// Resolve the document id of `record` in the given mode.
///
/// `converter` is only used in embedded-key mode, to render the key as JSON.
pub fn resolve_id<C: Converter>(
    record: &SinkRecord,
    mode: IdMode,
    converter: &C,
) -> Result<ResolvedId> {
    let resolved = match mode {
        IdMode::EmbeddedKey => embedded_key_id(record, converter)?,
        IdMode::Synthetic => ResolvedId::plain(synthetic_id(record)),
        IdMode::DirectKey => {
            ResolvedId::plain(direct_key_id(record.key_schema.as_ref(), &record.key)?)
        }
    };
    if resolved.id.is_empty() {
        return Err(ConvertError::EmptyId);
    }
    trace!(?mode, id = %resolved.id, "Resolved document id");
    Ok(resolved)
}

/// `topic+partition+offset`, unique per source record.
pub fn synthetic_id(record: &SinkRecord) -> String {
    format!("{}+{}+{}", record.topic, record.partition, record.offset)
}

/// Canonical string form of an integer or string key.
pub fn direct_key_id(key_schema: Option<&Schema>, key: &Value) -> Result<String> {
    if key.is_null() {
        return Err(ConvertError::NullKey);
    }

    let schema_type = match key_schema {
        Some(schema) => schema.schema_type(),
        None => key.schema_type().ok_or_else(|| ConvertError::UnsupportedKeyType {
            key_type: format!("Untyped {} key", key.type_name()),
        })?,
    };

    if !(schema_type.is_integer() || schema_type == connect_types::SchemaType::String) {
        return Err(ConvertError::UnsupportedKeyType {
            key_type: schema_type.to_string(),
        });
    }

    match key {
        Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => {
            Ok(key.as_i64().unwrap_or_default().to_string())
        }
        Value::String(s) => Ok(s.clone()),
        // Logical types on integer schemas keep their epoch representation.
        Value::Date(d) => Ok(connect_types::logical::date_to_days(*d).to_string()),
        Value::Time(t) => Ok(connect_types::logical::time_to_millis(*t).to_string()),
        Value::Timestamp(ts) => Ok(connect_types::logical::timestamp_to_millis(ts).to_string()),
        other => Err(ConvertError::UnexpectedValue {
            expected: schema_type.to_string(),
            found: other.type_name(),
        }),
    }
}

/// Id and destination from a `{"uuid": …, "index": …}` key.
pub fn embedded_key_id<C: Converter>(record: &SinkRecord, converter: &C) -> Result<ResolvedId> {
    let bytes = converter
        .from_connect_data(&record.topic, record.key_schema.as_ref(), &record.key)
        .map_err(|e| ConvertError::KeyDecoding(e.to_string()))?;
    let key_json: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|e| ConvertError::KeyDecoding(e.to_string()))?;

    let id = key_field(&key_json, EMBEDDED_ID_FIELD)?;
    let index = key_field(&key_json, EMBEDDED_INDEX_FIELD)?;

    Ok(ResolvedId {
        id,
        index_override: Some(format!("{}-{}", record.topic, index).to_lowercase()),
    })
}

fn key_field(key_json: &serde_json::Map<String, serde_json::Value>, name: &str) -> Result<String> {
    match key_json.get(name) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Null) | None => Err(ConvertError::KeyDecoding(format!(
            "key has no '{name}' field"
        ))),
        Some(other) => Ok(other.to_string()),
    }
}

//! The JSON [`Converter`] implementation.

use crate::error::{JsonConverterError, Result};
use crate::forward::value_to_json;
use crate::reverse::json_to_value;
use crate::schema_json::{schema_from_json, schema_to_json};
use connect_types::{Converter, SchemaAndValue, Schema, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const ENVELOPE_SCHEMA: &str = "schema";
const ENVELOPE_PAYLOAD: &str = "payload";

/// How decimals are written when a schema is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecimalFormat {
    /// Base64 of the unscaled big-endian two's complement integer
    #[default]
    Base64,
    /// JSON number (nearest double)
    Numeric,
}

impl FromStr for DecimalFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base64" => Ok(DecimalFormat::Base64),
            "numeric" => Ok(DecimalFormat::Numeric),
            other => Err(format!(
                "unknown decimal format '{other}' (expected 'base64' or 'numeric')"
            )),
        }
    }
}

impl fmt::Display for DecimalFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecimalFormat::Base64 => f.write_str("base64"),
            DecimalFormat::Numeric => f.write_str("numeric"),
        }
    }
}

/// Configuration for [`JsonConverter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonConverterConfig {
    /// Wrap payloads in a `{"schema", "payload"}` envelope
    pub schemas_enable: bool,
    pub decimal_format: DecimalFormat,
}

impl Default for JsonConverterConfig {
    fn default() -> Self {
        Self {
            schemas_enable: true,
            decimal_format: DecimalFormat::default(),
        }
    }
}

impl JsonConverterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schemas_enable(mut self, enabled: bool) -> Self {
        self.schemas_enable = enabled;
        self
    }

    pub fn with_decimal_format(mut self, format: DecimalFormat) -> Self {
        self.decimal_format = format;
        self
    }
}

/// JSON converter.
///
/// Configured once at construction and immutable afterwards; share it by
/// reference or `Arc` across threads.
#[derive(Debug, Clone, Default)]
pub struct JsonConverter {
    config: JsonConverterConfig,
}

impl JsonConverter {
    pub fn new(config: JsonConverterConfig) -> Self {
        Self { config }
    }

    /// A converter that writes bare payloads without a schema envelope.
    pub fn schemaless() -> Self {
        Self::new(JsonConverterConfig::new().with_schemas_enable(false))
    }

    pub fn config(&self) -> &JsonConverterConfig {
        &self.config
    }

    /// Convert to JSON, wrapping in an envelope when schemas are enabled.
    pub fn to_json(&self, schema: Option<&Schema>, value: &Value) -> Result<serde_json::Value> {
        let payload = value_to_json(schema, value, self.config.decimal_format)?;
        if !self.config.schemas_enable {
            return Ok(payload);
        }
        let schema_json = match schema {
            Some(schema) => schema_to_json(schema, self.config.decimal_format)?,
            None => serde_json::Value::Null,
        };
        let mut envelope = serde_json::Map::new();
        envelope.insert(ENVELOPE_SCHEMA.to_string(), schema_json);
        envelope.insert(ENVELOPE_PAYLOAD.to_string(), payload);
        Ok(serde_json::Value::Object(envelope))
    }

    /// Convert parsed JSON back to a schema and value.
    ///
    /// When schemas are enabled, an object holding exactly `schema` and
    /// `payload` is read as an envelope; anything else is decoded without a
    /// schema.
    pub fn from_json(&self, json: &serde_json::Value) -> Result<SchemaAndValue> {
        if self.config.schemas_enable {
            if let Some((schema_json, payload)) = as_envelope(json) {
                if schema_json.is_null() {
                    return Ok(SchemaAndValue::untyped(json_to_value(None, payload)?));
                }
                let schema = schema_from_json(schema_json)?;
                let value = json_to_value(Some(&schema), payload)?;
                return Ok(SchemaAndValue::new(Some(schema), value));
            }
        }
        Ok(SchemaAndValue::untyped(json_to_value(None, json)?))
    }
}

fn as_envelope(json: &serde_json::Value) -> Option<(&serde_json::Value, &serde_json::Value)> {
    let obj = json.as_object()?;
    if obj.len() != 2 {
        return None;
    }
    Some((obj.get(ENVELOPE_SCHEMA)?, obj.get(ENVELOPE_PAYLOAD)?))
}

impl Converter for JsonConverter {
    type Error = JsonConverterError;

    fn from_connect_data(
        &self,
        topic: &str,
        schema: Option<&Schema>,
        value: &Value,
    ) -> Result<Vec<u8>> {
        tracing::trace!(topic, "Encoding value as JSON");
        let json = self.to_json(schema, value)?;
        Ok(serde_json::to_vec(&json)?)
    }

    fn to_connect_data(&self, topic: &str, bytes: &[u8]) -> Result<SchemaAndValue> {
        tracing::trace!(topic, len = bytes.len(), "Decoding JSON payload");
        if bytes.is_empty() {
            return Ok(SchemaAndValue::untyped(Value::Null));
        }
        let json: serde_json::Value = serde_json::from_slice(bytes)?;
        self.from_json(&json)
    }
}

//! Forward conversion: Value → JSON value.
//!
//! With a schema, the schema drives the representation: nulls resolve to
//! defaults, logical types use their epoch/unscaled encodings, and maps with
//! string keys become objects. Without a schema, the representation is
//! inferred from the runtime value.

use crate::converter::DecimalFormat;
use crate::error::{JsonConverterError, Result};
use base64::Engine;
use connect_types::logical::{self, LogicalType};
use connect_types::{Schema, SchemaKind, SchemaType, Value};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::json;

/// Convert a value to JSON, guided by `schema` when one is given.
pub fn value_to_json(
    schema: Option<&Schema>,
    value: &Value,
    format: DecimalFormat,
) -> Result<serde_json::Value> {
    let value = match (schema, value) {
        (Some(schema), Value::Null) => match schema.default_value() {
            Some(default) => default,
            None if schema.is_optional() => return Ok(serde_json::Value::Null),
            None => return Err(JsonConverterError::MissingRequired(schema.schema_type())),
        },
        (None, Value::Null) => return Ok(serde_json::Value::Null),
        (_, value) => value,
    };

    match schema {
        Some(schema) => typed_to_json(schema, value, format),
        None => untyped_to_json(value, format),
    }
}

fn typed_to_json(
    schema: &Schema,
    value: &Value,
    format: DecimalFormat,
) -> Result<serde_json::Value> {
    if let Some(logical_type) = schema.logical_type() {
        return match (logical_type, value) {
            (LogicalType::Decimal, Value::Decimal(d)) => {
                let scale = logical::decimal_scale(schema)?;
                decimal_to_json(*d, Some(scale), format)
            }
            (LogicalType::Date, Value::Date(d)) => Ok(json!(logical::date_to_days(*d))),
            (LogicalType::Time, Value::Time(t)) => Ok(json!(logical::time_to_millis(*t))),
            (LogicalType::Timestamp, Value::Timestamp(ts)) => {
                Ok(json!(logical::timestamp_to_millis(ts)))
            }
            (logical_type, value) => Err(JsonConverterError::mismatch(
                logical_type.name(),
                value.type_name(),
            )),
        };
    }

    match (schema.kind(), value) {
        (SchemaKind::Int8, Value::Int8(i)) => Ok(json!(*i)),
        (SchemaKind::Int16, Value::Int16(i)) => Ok(json!(*i)),
        (SchemaKind::Int32, Value::Int32(i)) => Ok(json!(*i)),
        (SchemaKind::Int64, Value::Int64(i)) => Ok(json!(*i)),
        (SchemaKind::Float32, Value::Float32(f)) => float32_to_json(*f),
        (SchemaKind::Float64, Value::Float64(f)) => float64_to_json(*f),
        (SchemaKind::Boolean, Value::Boolean(b)) => Ok(json!(*b)),
        (SchemaKind::String, Value::String(s)) => Ok(json!(s)),
        (SchemaKind::Bytes, Value::Bytes(b)) => Ok(bytes_to_json(b)),

        (SchemaKind::Array(element), Value::Array(items)) => {
            let json_arr = items
                .iter()
                .map(|item| value_to_json(Some(element), item, format))
                .collect::<Result<Vec<_>>>()?;
            Ok(serde_json::Value::Array(json_arr))
        }

        (SchemaKind::Map { key, value: val }, Value::Map(entries)) => {
            if key.schema_type() == SchemaType::String {
                let mut obj = serde_json::Map::new();
                for (k, v) in entries {
                    let k = k
                        .as_str()
                        .ok_or_else(|| JsonConverterError::mismatch("STRING", k.type_name()))?;
                    obj.insert(k.to_string(), value_to_json(Some(val), v, format)?);
                }
                Ok(serde_json::Value::Object(obj))
            } else {
                let pairs = entries
                    .iter()
                    .map(|(k, v)| {
                        Ok(json!([
                            value_to_json(Some(key), k, format)?,
                            value_to_json(Some(val), v, format)?
                        ]))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(serde_json::Value::Array(pairs))
            }
        }

        (SchemaKind::Struct(fields), Value::Struct(s)) => {
            let mut obj = serde_json::Map::new();
            for field in fields {
                let field_value = s.get(field.name()).ok_or_else(|| {
                    JsonConverterError::mismatch(
                        format!("struct with field '{}'", field.name()),
                        "struct without it",
                    )
                })?;
                obj.insert(
                    field.name().to_string(),
                    value_to_json(Some(field.schema()), field_value, format)?,
                );
            }
            Ok(serde_json::Value::Object(obj))
        }

        (kind, value) => Err(JsonConverterError::mismatch(
            kind.schema_type(),
            value.type_name(),
        )),
    }
}

fn untyped_to_json(value: &Value, format: DecimalFormat) -> Result<serde_json::Value> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Int8(i) => Ok(json!(*i)),
        Value::Int16(i) => Ok(json!(*i)),
        Value::Int32(i) => Ok(json!(*i)),
        Value::Int64(i) => Ok(json!(*i)),
        Value::Float32(f) => float32_to_json(*f),
        Value::Float64(f) => float64_to_json(*f),
        Value::Boolean(b) => Ok(json!(*b)),
        Value::String(s) => Ok(json!(s)),
        Value::Bytes(b) => Ok(bytes_to_json(b)),
        // No schema means no scale to encode against, so emit a number.
        Value::Decimal(d) => decimal_to_json(*d, None, DecimalFormat::Numeric),
        Value::Date(d) => Ok(json!(logical::date_to_days(*d))),
        Value::Time(t) => Ok(json!(logical::time_to_millis(*t))),
        Value::Timestamp(ts) => Ok(json!(logical::timestamp_to_millis(ts))),
        Value::Array(items) => {
            let json_arr = items
                .iter()
                .map(|item| untyped_to_json(item, format))
                .collect::<Result<Vec<_>>>()?;
            Ok(serde_json::Value::Array(json_arr))
        }
        Value::Map(entries) => {
            if entries.iter().all(|(k, _)| k.as_str().is_some()) {
                let mut obj = serde_json::Map::new();
                for (k, v) in entries {
                    let k = k.as_str().unwrap_or_default();
                    obj.insert(k.to_string(), untyped_to_json(v, format)?);
                }
                Ok(serde_json::Value::Object(obj))
            } else {
                let pairs = entries
                    .iter()
                    .map(|(k, v)| Ok(json!([untyped_to_json(k, format)?, untyped_to_json(v, format)?])))
                    .collect::<Result<Vec<_>>>()?;
                Ok(serde_json::Value::Array(pairs))
            }
        }
        Value::Struct(s) => {
            // Struct fields still come from the struct's own schema.
            let mut obj = serde_json::Map::new();
            for (field, field_value) in s.iter() {
                obj.insert(
                    field.name().to_string(),
                    value_to_json(Some(field.schema()), field_value, format)?,
                );
            }
            Ok(serde_json::Value::Object(obj))
        }
    }
}

fn float32_to_json(f: f32) -> Result<serde_json::Value> {
    // Go through the shortest decimal form so 1.1f32 stays 1.1.
    let widened: f64 = f
        .to_string()
        .parse()
        .map_err(|_| JsonConverterError::NonFiniteFloat(f as f64))?;
    float64_to_json(widened)
}

fn float64_to_json(f: f64) -> Result<serde_json::Value> {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .ok_or(JsonConverterError::NonFiniteFloat(f))
}

fn bytes_to_json(b: &[u8]) -> serde_json::Value {
    json!(base64::engine::general_purpose::STANDARD.encode(b))
}

fn decimal_to_json(
    mut d: Decimal,
    scale: Option<u32>,
    format: DecimalFormat,
) -> Result<serde_json::Value> {
    match format {
        DecimalFormat::Numeric => {
            let f = d
                .to_f64()
                .ok_or_else(|| JsonConverterError::InvalidDecimal(d.to_string()))?;
            float64_to_json(f)
        }
        DecimalFormat::Base64 => {
            if let Some(scale) = scale {
                d.rescale(scale);
                if d.scale() != scale {
                    return Err(JsonConverterError::InvalidDecimal(format!(
                        "{d} cannot be represented with scale {scale}"
                    )));
                }
            }
            Ok(bytes_to_json(&unscaled_to_bytes(d.mantissa())))
        }
    }
}

/// Minimal big-endian two's complement encoding of an unscaled decimal.
pub(crate) fn unscaled_to_bytes(mantissa: i128) -> Vec<u8> {
    let bytes = mantissa.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

//! Reverse conversion: JSON value → Value.
//!
//! Schema-aware decoding is the inverse of [`crate::forward::value_to_json`].
//! Schema-less decoding infers types from the JSON itself: integers become
//! INT64, other numbers FLOAT64, and objects become string-keyed maps.

use crate::error::{JsonConverterError, Result};
use base64::Engine;
use connect_types::logical::{self, LogicalType};
use connect_types::{Schema, SchemaKind, SchemaType, Struct, Value};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

/// Convert JSON to a value, guided by `schema` when one is given.
pub fn json_to_value(schema: Option<&Schema>, json: &serde_json::Value) -> Result<Value> {
    match schema {
        Some(schema) => typed_from_json(schema, json),
        None => Ok(untyped_from_json(json)),
    }
}

fn typed_from_json(schema: &Schema, json: &serde_json::Value) -> Result<Value> {
    if json.is_null() {
        return match schema.default_value() {
            Some(default) => Ok(default.clone()),
            None if schema.is_optional() => Ok(Value::Null),
            None => Err(JsonConverterError::MissingRequired(schema.schema_type())),
        };
    }

    if let Some(logical_type) = schema.logical_type() {
        return logical_from_json(logical_type, schema, json);
    }

    match schema.kind() {
        SchemaKind::Int8 => integer(json, SchemaType::Int8).and_then(|i| {
            i8::try_from(i)
                .map(Value::Int8)
                .map_err(|_| out_of_range(SchemaType::Int8, i))
        }),
        SchemaKind::Int16 => integer(json, SchemaType::Int16).and_then(|i| {
            i16::try_from(i)
                .map(Value::Int16)
                .map_err(|_| out_of_range(SchemaType::Int16, i))
        }),
        SchemaKind::Int32 => integer(json, SchemaType::Int32).and_then(|i| {
            i32::try_from(i)
                .map(Value::Int32)
                .map_err(|_| out_of_range(SchemaType::Int32, i))
        }),
        SchemaKind::Int64 => integer(json, SchemaType::Int64).map(Value::Int64),
        SchemaKind::Float32 => number(json, SchemaType::Float32).map(|f| Value::Float32(f as f32)),
        SchemaKind::Float64 => number(json, SchemaType::Float64).map(Value::Float64),
        SchemaKind::Boolean => json
            .as_bool()
            .map(Value::Boolean)
            .ok_or_else(|| JsonConverterError::mismatch(SchemaType::Boolean, json_type(json))),
        SchemaKind::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| JsonConverterError::mismatch(SchemaType::String, json_type(json))),
        SchemaKind::Bytes => bytes_from_json(json).map(Value::Bytes),

        SchemaKind::Array(element) => {
            let items = json
                .as_array()
                .ok_or_else(|| JsonConverterError::mismatch(SchemaType::Array, json_type(json)))?;
            let values = items
                .iter()
                .map(|item| typed_from_json(element, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(values))
        }

        SchemaKind::Map { key, value } => match json {
            serde_json::Value::Object(obj) => {
                let mut entries = Vec::with_capacity(obj.len());
                for (k, v) in obj {
                    let k = typed_from_json(key, &serde_json::Value::String(k.clone()))?;
                    entries.push((k, typed_from_json(value, v)?));
                }
                Ok(Value::Map(entries))
            }
            serde_json::Value::Array(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    match pair.as_array().map(Vec::as_slice) {
                        Some([k, v]) => {
                            entries.push((typed_from_json(key, k)?, typed_from_json(value, v)?))
                        }
                        _ => {
                            return Err(JsonConverterError::mismatch(
                                "MAP entry [key, value]",
                                json_type(pair),
                            ))
                        }
                    }
                }
                Ok(Value::Map(entries))
            }
            other => Err(JsonConverterError::mismatch(SchemaType::Map, json_type(other))),
        },

        SchemaKind::Struct(fields) => {
            let obj = json
                .as_object()
                .ok_or_else(|| JsonConverterError::mismatch(SchemaType::Struct, json_type(json)))?;
            let mut result = Struct::new(Arc::new(schema.clone()))?;
            for field in fields {
                let field_json = obj.get(field.name()).unwrap_or(&serde_json::Value::Null);
                let field_value = typed_from_json(field.schema(), field_json)?;
                result.put(field.name(), field_value)?;
            }
            Ok(Value::Struct(result))
        }
    }
}

fn logical_from_json(
    logical_type: LogicalType,
    schema: &Schema,
    json: &serde_json::Value,
) -> Result<Value> {
    match logical_type {
        LogicalType::Decimal => {
            let scale = logical::decimal_scale(schema)?;
            let mut d = match json {
                serde_json::Value::String(_) => {
                    let bytes = bytes_from_json(json)?;
                    let mantissa = unscaled_from_bytes(&bytes).ok_or_else(|| {
                        JsonConverterError::InvalidDecimal(format!(
                            "{} unscaled bytes do not fit",
                            bytes.len()
                        ))
                    })?;
                    Decimal::try_from_i128_with_scale(mantissa, scale)
                        .map_err(|e| JsonConverterError::InvalidDecimal(e.to_string()))?
                }
                serde_json::Value::Number(n) => parse_decimal(&n.to_string())?,
                other => {
                    return Err(JsonConverterError::mismatch(
                        logical_type.name(),
                        json_type(other),
                    ))
                }
            };
            let exact = d;
            d.rescale(scale);
            if d.scale() != scale || d != exact {
                return Err(JsonConverterError::InvalidDecimal(format!(
                    "{exact} does not fit scale {scale}"
                )));
            }
            Ok(Value::Decimal(d))
        }
        LogicalType::Date => {
            let days = integer(json, SchemaType::Int32)?;
            i32::try_from(days)
                .ok()
                .and_then(logical::days_to_date)
                .map(Value::Date)
                .ok_or_else(|| out_of_range(SchemaType::Int32, days))
        }
        LogicalType::Time => {
            let millis = integer(json, SchemaType::Int32)?;
            i32::try_from(millis)
                .ok()
                .and_then(logical::millis_to_time)
                .map(Value::Time)
                .ok_or_else(|| out_of_range(SchemaType::Int32, millis))
        }
        LogicalType::Timestamp => {
            let millis = integer(json, SchemaType::Int64)?;
            logical::millis_to_timestamp(millis)
                .map(Value::Timestamp)
                .ok_or_else(|| out_of_range(SchemaType::Int64, millis))
        }
    }
}

fn untyped_from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else {
                Value::Float64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(arr) => Value::Array(arr.iter().map(untyped_from_json).collect()),
        serde_json::Value::Object(obj) => Value::Map(
            obj.iter()
                .map(|(k, v)| (Value::String(k.clone()), untyped_from_json(v)))
                .collect(),
        ),
    }
}

fn integer(json: &serde_json::Value, schema_type: SchemaType) -> Result<i64> {
    json.as_i64()
        .ok_or_else(|| JsonConverterError::mismatch(schema_type, json_type(json)))
}

fn number(json: &serde_json::Value, schema_type: SchemaType) -> Result<f64> {
    json.as_f64()
        .ok_or_else(|| JsonConverterError::mismatch(schema_type, json_type(json)))
}

fn bytes_from_json(json: &serde_json::Value) -> Result<Vec<u8>> {
    let s = json
        .as_str()
        .ok_or_else(|| JsonConverterError::mismatch(SchemaType::Bytes, json_type(json)))?;
    Ok(base64::engine::general_purpose::STANDARD.decode(s)?)
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|e| JsonConverterError::InvalidDecimal(format!("{s}: {e}")))
}

/// Inverse of [`crate::forward::unscaled_to_bytes`].
pub(crate) fn unscaled_from_bytes(bytes: &[u8]) -> Option<i128> {
    if bytes.is_empty() || bytes.len() > 16 {
        return None;
    }
    let fill = if bytes[0] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut buf = [fill; 16];
    buf[16 - bytes.len()..].copy_from_slice(bytes);
    Some(i128::from_be_bytes(buf))
}

fn out_of_range(schema_type: SchemaType, value: i64) -> JsonConverterError {
    JsonConverterError::OutOfRange {
        schema_type,
        value: value.to_string(),
    }
}

fn json_type(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::DecimalFormat;
    use crate::forward::{unscaled_to_bytes, value_to_json};
    use chrono::{NaiveDate, NaiveTime};
    use connect_types::SchemaBuilder;
    use serde_json::json;

    #[test]
    fn test_untyped_inference() {
        let v = json_to_value(None, &json!({"a": 1, "b": [true, 2.5], "c": "x"})).unwrap();
        let Value::Map(entries) = v else {
            panic!("Expected map");
        };
        assert_eq!(entries.len(), 3);
        assert!(entries.contains(&(Value::from("a"), Value::Int64(1))));
        assert!(entries.contains(&(
            Value::from("b"),
            Value::Array(vec![Value::Boolean(true), Value::Float64(2.5)])
        )));
        assert!(entries.contains(&(Value::from("c"), Value::from("x"))));
    }

    #[test]
    fn test_integer_range_checked() {
        let schema = SchemaBuilder::int8().build();
        assert_eq!(json_to_value(Some(&schema), &json!(-128)).unwrap(), Value::Int8(-128));
        let err = json_to_value(Some(&schema), &json!(300)).unwrap_err();
        assert!(matches!(err, JsonConverterError::OutOfRange { .. }));
    }

    #[test]
    fn test_null_uses_default() {
        let schema = SchemaBuilder::string()
            .default_value(Value::from("n/a"))
            .unwrap()
            .build();
        assert_eq!(
            json_to_value(Some(&schema), &serde_json::Value::Null).unwrap(),
            Value::from("n/a")
        );
        let required = SchemaBuilder::boolean().build();
        assert!(json_to_value(Some(&required), &serde_json::Value::Null).is_err());
    }

    #[test]
    fn test_decimal_from_base64_and_number() {
        let schema = logical::decimal(2).build();
        assert_eq!(
            json_to_value(Some(&schema), &json!("AJw=")).unwrap(),
            Value::Decimal(Decimal::from_str("1.56").unwrap())
        );
        assert_eq!(
            json_to_value(Some(&schema), &json!(12.5)).unwrap(),
            Value::Decimal(Decimal::from_str("12.50").unwrap())
        );
    }

    #[test]
    fn test_decimal_wider_than_scale_rejected() {
        let schema = logical::decimal(2).build();
        let err = json_to_value(Some(&schema), &json!(1.239)).unwrap_err();
        assert!(matches!(err, JsonConverterError::InvalidDecimal(_)));

        let too_wide = logical::decimal(30).build();
        let err = json_to_value(Some(&too_wide), &json!(1.5)).unwrap_err();
        assert!(matches!(err, JsonConverterError::InvalidDecimal(_)));
    }

    #[test]
    fn test_unscaled_round_trip() {
        for m in [0i128, 1, -1, 127, 128, -128, -129, 1_000_000_007, i64::MIN as i128] {
            assert_eq!(unscaled_from_bytes(&unscaled_to_bytes(m)), Some(m));
        }
        assert_eq!(unscaled_from_bytes(&[]), None);
    }

    #[test]
    fn test_temporal_from_json() {
        assert_eq!(
            json_to_value(Some(&logical::date().build()), &json!(19889)).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        );
        assert_eq!(
            json_to_value(Some(&logical::time().build()), &json!(1000)).unwrap(),
            Value::Time(NaiveTime::from_hms_opt(0, 0, 1).unwrap())
        );
    }

    #[test]
    fn test_map_from_pair_array() {
        let schema = SchemaBuilder::map(
            SchemaBuilder::int32().build(),
            SchemaBuilder::string().build(),
        )
        .build();
        assert_eq!(
            json_to_value(Some(&schema), &json!([[1, "one"], [2, "two"]])).unwrap(),
            Value::Map(vec![
                (Value::Int32(1), Value::from("one")),
                (Value::Int32(2), Value::from("two")),
            ])
        );
        assert!(json_to_value(Some(&schema), &json!([[1]])).is_err());
    }

    #[test]
    fn test_struct_round_trip() {
        let schema = SchemaBuilder::struct_type()
            .name("item")
            .field("id", SchemaBuilder::int32().build())
            .unwrap()
            .field("note", SchemaBuilder::string().optional().build())
            .unwrap()
            .field("price", logical::decimal(2).build())
            .unwrap()
            .build();
        let original = Value::Struct(
            Struct::new(schema.clone())
                .unwrap()
                .with("id", 7)
                .unwrap()
                .with("price", Decimal::from_str("19.99").unwrap())
                .unwrap(),
        );
        let json = value_to_json(Some(&schema), &original, DecimalFormat::Base64).unwrap();
        assert_eq!(json["note"], serde_json::Value::Null);
        let decoded = json_to_value(Some(&schema), &json).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_type_mismatch() {
        let schema = SchemaBuilder::array(SchemaBuilder::string().build()).build();
        let err = json_to_value(Some(&schema), &json!({"a": 1})).unwrap_err();
        assert!(matches!(err, JsonConverterError::SchemaMismatch { .. }));
    }
}

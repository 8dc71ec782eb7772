//! Schema ⇄ JSON translation for the `{"schema": …, "payload": …}` envelope.
//!
//! The JSON form follows Kafka Connect's JsonConverter:
//!
//! ```json
//! {
//!   "type": "struct",
//!   "optional": false,
//!   "name": "order",
//!   "fields": [
//!     { "field": "id", "type": "int64", "optional": false },
//!     { "field": "tags", "type": "map", "keys": { "type": "string" }, "values": { "type": "int32" } }
//!   ]
//! }
//! ```

use crate::converter::DecimalFormat;
use crate::error::{JsonConverterError, Result};
use crate::forward::value_to_json;
use crate::reverse::json_to_value;
use connect_types::{Schema, SchemaBuilder, SchemaKind, SchemaType};
use serde_json::json;

/// Render a schema as envelope JSON.
pub fn schema_to_json(schema: &Schema, format: DecimalFormat) -> Result<serde_json::Value> {
    let mut obj = serde_json::Map::new();
    obj.insert(
        "type".to_string(),
        json!(schema.schema_type().as_str().to_ascii_lowercase()),
    );
    obj.insert("optional".to_string(), json!(schema.is_optional()));

    match schema.kind() {
        SchemaKind::Array(element) => {
            obj.insert("items".to_string(), schema_to_json(element, format)?);
        }
        SchemaKind::Map { key, value } => {
            obj.insert("keys".to_string(), schema_to_json(key, format)?);
            obj.insert("values".to_string(), schema_to_json(value, format)?);
        }
        SchemaKind::Struct(fields) => {
            let mut json_fields = Vec::with_capacity(fields.len());
            for field in fields {
                let mut field_json = schema_to_json(field.schema(), format)?;
                if let serde_json::Value::Object(ref mut field_obj) = field_json {
                    field_obj.insert("field".to_string(), json!(field.name()));
                }
                json_fields.push(field_json);
            }
            obj.insert("fields".to_string(), serde_json::Value::Array(json_fields));
        }
        _ => {}
    }

    if let Some(name) = schema.name() {
        obj.insert("name".to_string(), json!(name));
    }
    if let Some(version) = schema.version() {
        obj.insert("version".to_string(), json!(version));
    }
    if let Some(doc) = schema.doc() {
        obj.insert("doc".to_string(), json!(doc));
    }
    if !schema.parameters().is_empty() {
        obj.insert("parameters".to_string(), json!(schema.parameters()));
    }
    if let Some(default) = schema.default_value() {
        obj.insert(
            "default".to_string(),
            value_to_json(Some(schema), default, format)?,
        );
    }

    Ok(serde_json::Value::Object(obj))
}

/// Parse envelope JSON into a schema.
pub fn schema_from_json(json: &serde_json::Value) -> Result<Schema> {
    let obj = json
        .as_object()
        .ok_or_else(|| JsonConverterError::InvalidSchema(format!("expected object, got {json}")))?;
    let type_name = obj
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| JsonConverterError::InvalidSchema("missing 'type'".to_string()))?;

    let mut builder = match parse_schema_type(type_name)? {
        SchemaType::Int8 => SchemaBuilder::int8(),
        SchemaType::Int16 => SchemaBuilder::int16(),
        SchemaType::Int32 => SchemaBuilder::int32(),
        SchemaType::Int64 => SchemaBuilder::int64(),
        SchemaType::Float32 => SchemaBuilder::float32(),
        SchemaType::Float64 => SchemaBuilder::float64(),
        SchemaType::Boolean => SchemaBuilder::boolean(),
        SchemaType::String => SchemaBuilder::string(),
        SchemaType::Bytes => SchemaBuilder::bytes(),
        SchemaType::Array => SchemaBuilder::array(schema_from_json(required(obj, "items")?)?),
        SchemaType::Map => SchemaBuilder::map(
            schema_from_json(required(obj, "keys")?)?,
            schema_from_json(required(obj, "values")?)?,
        ),
        SchemaType::Struct => {
            let fields = required(obj, "fields")?.as_array().ok_or_else(|| {
                JsonConverterError::InvalidSchema("'fields' must be an array".to_string())
            })?;
            let mut builder = SchemaBuilder::struct_type();
            for field_json in fields {
                let name = field_json
                    .get("field")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| {
                        JsonConverterError::InvalidSchema("struct field without 'field'".to_string())
                    })?;
                builder = builder.field(name, schema_from_json(field_json)?)?;
            }
            builder
        }
    };

    if obj
        .get("optional")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
    {
        builder = builder.optional();
    }
    if let Some(name) = obj.get("name").and_then(serde_json::Value::as_str) {
        builder = builder.name(name);
    }
    if let Some(version) = obj.get("version").and_then(serde_json::Value::as_i64) {
        let version = i32::try_from(version)
            .map_err(|_| JsonConverterError::InvalidSchema(format!("bad version {version}")))?;
        builder = builder.version(version);
    }
    if let Some(doc) = obj.get("doc").and_then(serde_json::Value::as_str) {
        builder = builder.doc(doc);
    }
    if let Some(params) = obj.get("parameters") {
        let params = params.as_object().ok_or_else(|| {
            JsonConverterError::InvalidSchema("'parameters' must be an object".to_string())
        })?;
        for (key, value) in params {
            let value = value.as_str().ok_or_else(|| {
                JsonConverterError::InvalidSchema(format!("parameter '{key}' must be a string"))
            })?;
            builder = builder.parameter(key, value);
        }
    }
    if let Some(default_json) = obj.get("default") {
        let default = json_to_value(Some(builder.as_schema()), default_json)?;
        builder = builder.default_value(default)?;
    }

    Ok(builder.build())
}

fn parse_schema_type(name: &str) -> Result<SchemaType> {
    match name {
        "int8" => Ok(SchemaType::Int8),
        "int16" => Ok(SchemaType::Int16),
        "int32" => Ok(SchemaType::Int32),
        "int64" => Ok(SchemaType::Int64),
        "float" | "float32" => Ok(SchemaType::Float32),
        "double" | "float64" => Ok(SchemaType::Float64),
        "boolean" => Ok(SchemaType::Boolean),
        "string" => Ok(SchemaType::String),
        "bytes" => Ok(SchemaType::Bytes),
        "array" => Ok(SchemaType::Array),
        "map" => Ok(SchemaType::Map),
        "struct" => Ok(SchemaType::Struct),
        other => Err(JsonConverterError::InvalidSchema(format!(
            "unknown schema type '{other}'"
        ))),
    }
}

fn required<'a>(
    obj: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<&'a serde_json::Value> {
    obj.get(key)
        .ok_or_else(|| JsonConverterError::InvalidSchema(format!("missing '{key}'")))
}

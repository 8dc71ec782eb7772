use super::{MAP_KEY_FIELD, MAP_VALUE_FIELD};
use crate::error::{ConvertError, Result};
use connect_types::{LogicalType, Schema, SchemaKind, Struct, Value};
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

/// An original schema and its rewritten counterpart, walked in lockstep.
#[derive(Debug, Clone, Copy)]
pub struct SchemaPair<'a> {
    pub old: &'a Schema,
    pub new: &'a Schema,
}

impl<'a> SchemaPair<'a> {
    pub fn new(old: &'a Schema, new: &'a Schema) -> Self {
        Self { old, new }
    }

    fn element(&self) -> Result<SchemaPair<'a>> {
        match (self.old.value_schema(), self.new.value_schema()) {
            (Some(old), Some(new)) => Ok(SchemaPair::new(old, new)),
            _ => Err(self.mismatch("array element")),
        }
    }

    fn field(&self, name: &str) -> Result<SchemaPair<'a>> {
        match (self.old.field(name), self.new.field(name)) {
            (Some(old), Some(new)) => Ok(SchemaPair::new(old.schema(), new.schema())),
            _ => Err(self.mismatch(&format!("field '{name}'"))),
        }
    }

    /// Key pair, value pair, and the rewritten entry struct schema.
    fn map_entry(&self) -> Result<(SchemaPair<'a>, SchemaPair<'a>, &'a Schema)> {
        let entry = self
            .new
            .value_schema()
            .ok_or_else(|| self.mismatch("map entry"))?;
        let key = match (self.old.key_schema(), entry.field(MAP_KEY_FIELD)) {
            (Some(old), Some(new)) => SchemaPair::new(old, new.schema()),
            _ => return Err(self.mismatch("map key")),
        };
        let value = match (self.old.value_schema(), entry.field(MAP_VALUE_FIELD)) {
            (Some(old), Some(new)) => SchemaPair::new(old, new.schema()),
            _ => return Err(self.mismatch("map value")),
        };
        Ok((key, value, entry))
    }

    fn mismatch(&self, what: &str) -> ConvertError {
        ConvertError::InternalSchemaMismatch(format!(
            "no {what} in rewritten {} schema for original {}",
            self.new.schema_type(),
            self.old.display_name()
        ))
    }
}

/// Rewrite `value` from `old` to `new`, where `new` is `rewrite_schema(old)`.
///
/// Untyped values (no `old` schema) pass through unchanged.
pub fn rewrite_value(value: &Value, old: Option<&Schema>, new: Option<&Schema>) -> Result<Value> {
    match (old, new) {
        (None, _) => Ok(value.clone()),
        (Some(old), Some(new)) => rewrite_value_with(value, SchemaPair::new(old, new)),
        (Some(old), None) => Err(ConvertError::InternalSchemaMismatch(format!(
            "no rewritten schema for original {}",
            old.display_name()
        ))),
    }
}

pub(crate) fn rewrite_value_with(value: &Value, pair: SchemaPair<'_>) -> Result<Value> {
    // A null takes the original default, which is then rewritten like any
    // other value so it conforms to the new schema.
    let value = if value.is_null() {
        match pair.old.default_value() {
            Some(default) => default,
            None if pair.old.is_optional() => return Ok(Value::Null),
            None => {
                return Err(ConvertError::MissingRequiredValue {
                    schema_type: pair.old.schema_type(),
                })
            }
        }
    } else {
        value
    };

    match pair.old.logical_type() {
        Some(LogicalType::Decimal) => return decimal_to_float(value),
        Some(LogicalType::Date | LogicalType::Time | LogicalType::Timestamp) => {
            return Ok(value.clone())
        }
        None => {}
    }

    match (pair.old.kind(), value) {
        (SchemaKind::Array(_), Value::Array(items)) => {
            let element = pair.element()?;
            items
                .iter()
                .map(|item| rewrite_value_with(item, element))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        (SchemaKind::Map { .. }, Value::Map(entries)) => {
            let (key, val, entry_schema) = pair.map_entry()?;
            let entry_schema = Arc::new(entry_schema.clone());
            entries
                .iter()
                .map(|(k, v)| {
                    let mut entry = Struct::new(Arc::clone(&entry_schema))?;
                    entry.put(MAP_KEY_FIELD, rewrite_value_with(k, key)?)?;
                    entry.put(MAP_VALUE_FIELD, rewrite_value_with(v, val)?)?;
                    Ok(Value::Struct(entry))
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        (SchemaKind::Struct(fields), Value::Struct(input)) => {
            let mut output = Struct::new(Arc::new(pair.new.clone()))?;
            for field in fields {
                let field_pair = pair.field(field.name())?;
                let field_value = input.get(field.name()).ok_or_else(|| {
                    ConvertError::UnexpectedValue {
                        expected: format!("struct with field '{}'", field.name()),
                        found: "struct without it",
                    }
                })?;
                output.put(field.name(), rewrite_value_with(field_value, field_pair)?)?;
            }
            Ok(Value::Struct(output))
        }
        (
            SchemaKind::Int8
            | SchemaKind::Int16
            | SchemaKind::Int32
            | SchemaKind::Int64
            | SchemaKind::Float32
            | SchemaKind::Float64
            | SchemaKind::Boolean
            | SchemaKind::String
            | SchemaKind::Bytes,
            _,
        ) => Ok(value.clone()),
        (SchemaKind::Array(_) | SchemaKind::Map { .. } | SchemaKind::Struct(_), other) => {
            Err(ConvertError::UnexpectedValue {
                expected: pair.old.schema_type().to_string(),
                found: other.type_name(),
            })
        }
    }
}

fn decimal_to_float(value: &Value) -> Result<Value> {
    match value {
        Value::Decimal(d) => d
            .to_f64()
            .map(Value::Float64)
            .ok_or_else(|| ConvertError::UnexpectedValue {
                expected: "finite decimal".to_string(),
                found: value.type_name(),
            }),
        other => Err(ConvertError::UnexpectedValue {
            expected: "decimal".to_string(),
            found: other.type_name(),
        }),
    }
}

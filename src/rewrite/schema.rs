use super::value::rewrite_value_with;
use super::{SchemaPair, MAP_KEY_FIELD, MAP_VALUE_FIELD};
use crate::error::Result;
use connect_types::{LogicalType, Schema, SchemaBuilder, SchemaKind};
use tracing::trace;

/// Rewrite a value schema. An absent schema stays absent.
pub fn rewrite_schema(schema: Option<&Schema>) -> Result<Option<Schema>> {
    schema.map(rewrite).transpose()
}

pub(crate) fn rewrite(schema: &Schema) -> Result<Schema> {
    match schema.logical_type() {
        Some(LogicalType::Decimal) => {
            trace!(name = ?schema.name(), "Rewriting decimal schema as float64");
            return Ok(copy_basics(schema, SchemaBuilder::float64())?.build());
        }
        Some(LogicalType::Date | LogicalType::Time | LogicalType::Timestamp) => {
            return Ok(schema.clone());
        }
        None => {}
    }

    match schema.kind() {
        SchemaKind::Array(element) => {
            let target = SchemaBuilder::array(rewrite(element)?);
            Ok(copy_basics(schema, target)?.build())
        }
        SchemaKind::Map { key, value } => {
            let entry = SchemaBuilder::struct_type()
                .name(format!("{}-{}", key.display_name(), value.display_name()))
                .field(MAP_KEY_FIELD, rewrite(key)?)?
                .field(MAP_VALUE_FIELD, rewrite(value)?)?
                .build();
            trace!(entry = ?entry.name(), "Rewriting map schema as array of entries");
            Ok(copy_basics(schema, SchemaBuilder::array(entry))?.build())
        }
        SchemaKind::Struct(fields) => {
            let mut target =
                copy_basics(schema, SchemaBuilder::struct_type().maybe_name(schema.name()))?;
            for field in fields {
                target = target.field(field.name(), rewrite(field.schema())?)?;
            }
            Ok(target.build())
        }
        SchemaKind::Int8
        | SchemaKind::Int16
        | SchemaKind::Int32
        | SchemaKind::Int64
        | SchemaKind::Float32
        | SchemaKind::Float64
        | SchemaKind::Boolean
        | SchemaKind::String
        | SchemaKind::Bytes => Ok(schema.clone()),
    }
}

/// Copy optionality and, for non-struct schemas, the rewritten default.
fn copy_basics(source: &Schema, mut target: SchemaBuilder) -> Result<SchemaBuilder> {
    if source.is_optional() {
        target = target.optional();
    }
    if let Some(default) = source.default_value() {
        if !matches!(source.kind(), SchemaKind::Struct(_)) {
            let rewritten = rewrite_value_with(default, SchemaPair::new(source, target.as_schema()))?;
            target = target.default_value(rewritten)?;
        }
    }
    Ok(target)
}

//! Value trees.
//!
//! A [`Value`] conforms to exactly one [`Schema`]. Logical types get their own
//! variants so that decimals, dates, times and timestamps keep their meaning
//! until a converter decides how to serialize them.

use crate::error::DataError;
use crate::logical::LogicalType;
use crate::schema::{Field, Schema, SchemaKind, SchemaType};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

/// A typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Boolean(bool),
    String(String),
    Bytes(Vec<u8>),
    /// Arbitrary-precision decimal (decimal logical type)
    Decimal(Decimal),
    /// Calendar date (date logical type)
    Date(NaiveDate),
    /// Time of day (time logical type)
    Time(NaiveTime),
    /// Instant in UTC (timestamp logical type)
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    /// Map entries in insertion order
    Map(Vec<(Value, Value)>),
    Struct(Struct),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the runtime variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    /// Schema type implied by the runtime variant of an untyped value.
    ///
    /// Returns `None` for `Null` and for logical values, which have no
    /// primitive schema type of their own.
    pub fn schema_type(&self) -> Option<SchemaType> {
        match self {
            Value::Int8(_) => Some(SchemaType::Int8),
            Value::Int16(_) => Some(SchemaType::Int16),
            Value::Int32(_) => Some(SchemaType::Int32),
            Value::Int64(_) => Some(SchemaType::Int64),
            Value::Float32(_) => Some(SchemaType::Float32),
            Value::Float64(_) => Some(SchemaType::Float64),
            Value::Boolean(_) => Some(SchemaType::Boolean),
            Value::String(_) => Some(SchemaType::String),
            Value::Bytes(_) => Some(SchemaType::Bytes),
            Value::Array(_) => Some(SchemaType::Array),
            Value::Map(_) => Some(SchemaType::Map),
            Value::Struct(_) => Some(SchemaType::Struct),
            Value::Null
            | Value::Decimal(_)
            | Value::Date(_)
            | Value::Time(_)
            | Value::Timestamp(_) => None,
        }
    }

    /// Check whether this value is a valid instance of `schema`.
    ///
    /// Structs are matched on field names; their values were checked when
    /// they were put.
    pub fn conforms_to(&self, schema: &Schema) -> bool {
        if self.is_null() {
            return schema.is_optional();
        }
        if let Some(logical) = schema.logical_type() {
            return matches!(
                (logical, self),
                (LogicalType::Decimal, Value::Decimal(_))
                    | (LogicalType::Date, Value::Date(_))
                    | (LogicalType::Time, Value::Time(_))
                    | (LogicalType::Timestamp, Value::Timestamp(_))
            );
        }
        match (schema.kind(), self) {
            (SchemaKind::Int8, Value::Int8(_))
            | (SchemaKind::Int16, Value::Int16(_))
            | (SchemaKind::Int32, Value::Int32(_))
            | (SchemaKind::Int64, Value::Int64(_))
            | (SchemaKind::Float32, Value::Float32(_))
            | (SchemaKind::Float64, Value::Float64(_))
            | (SchemaKind::Boolean, Value::Boolean(_))
            | (SchemaKind::String, Value::String(_))
            | (SchemaKind::Bytes, Value::Bytes(_)) => true,
            (SchemaKind::Array(element), Value::Array(items)) => {
                items.iter().all(|item| item.conforms_to(element))
            }
            (SchemaKind::Map { key, value }, Value::Map(entries)) => entries
                .iter()
                .all(|(k, v)| k.conforms_to(key) && v.conforms_to(value)),
            (SchemaKind::Struct(fields), Value::Struct(s)) => {
                fields.len() == s.schema().fields().len()
                    && fields
                        .iter()
                        .zip(s.schema().fields())
                        .all(|(a, b)| a.name() == b.name())
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widen any integer variant to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int8(i) => Some(*i as i64),
            Value::Int16(i) => Some(*i as i64),
            Value::Int32(i) => Some(*i as i64),
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float32(f) => Some(*f as f64),
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int8(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<Struct> for Value {
    fn from(v: Struct) -> Self {
        Value::Struct(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A struct value: one slot per field of its schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Struct {
    /// Create a struct with every field unset (`Null`).
    pub fn new(schema: impl Into<Arc<Schema>>) -> Result<Self, DataError> {
        let schema = schema.into();
        if !matches!(schema.kind(), SchemaKind::Struct(_)) {
            return Err(DataError::NotAStruct(schema.schema_type()));
        }
        let values = vec![Value::Null; schema.fields().len()];
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Shared handle to the schema, for building sibling structs cheaply.
    pub fn schema_arc(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Read a field by name, falling back to the field default when unset.
    ///
    /// Returns `None` only when the schema has no such field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let field = self.schema.field(name)?;
        Some(self.get_field(field))
    }

    /// `field` must come from this struct's own schema.
    fn get_field<'a>(&'a self, field: &'a Field) -> &'a Value {
        match self.values.get(field.index()) {
            Some(Value::Null) | None => field.schema().default_value().unwrap_or(&Value::Null),
            Some(value) => value,
        }
    }

    /// Set a field, validating the value against the field schema.
    pub fn put(&mut self, name: &str, value: impl Into<Value>) -> Result<(), DataError> {
        let value = value.into();
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| DataError::UnknownField(name.to_string()))?;
        if !value.is_null() && !value.conforms_to(field.schema()) {
            return Err(DataError::FieldValueMismatch {
                field: name.to_string(),
                expected: field.schema().schema_type(),
                found: value.type_name(),
            });
        }
        let index = field.index();
        self.values[index] = value;
        Ok(())
    }

    /// Builder-style [`Struct::put`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self, DataError> {
        self.put(name, value)?;
        Ok(self)
    }

    /// Fields paired with their effective values, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Value)> {
        self.schema
            .fields()
            .iter()
            .map(move |field| (field, self.get_field(field)))
    }
}

//! Schema tree definitions.
//!
//! A [`Schema`] is a node in a recursive tree. The shape of a node is a closed
//! [`SchemaKind`]: primitives carry no children, arrays carry one element
//! schema, maps carry exactly one key and one value schema, and structs carry
//! an ordered list of uniquely named [`Field`]s.
//!
//! Logical types (decimal, date, time, timestamp) are expressed the Kafka
//! Connect way: a primitive schema plus a well-known `name`. See
//! [`crate::logical`].

use crate::error::SchemaError;
use crate::logical::LogicalType;
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Type tag of a schema node, without its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    String,
    Bytes,
    Array,
    Map,
    Struct,
}

impl SchemaType {
    /// Upper-case type name, e.g. `INT32`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Int8 => "INT8",
            SchemaType::Int16 => "INT16",
            SchemaType::Int32 => "INT32",
            SchemaType::Int64 => "INT64",
            SchemaType::Float32 => "FLOAT32",
            SchemaType::Float64 => "FLOAT64",
            SchemaType::Boolean => "BOOLEAN",
            SchemaType::String => "STRING",
            SchemaType::Bytes => "BYTES",
            SchemaType::Array => "ARRAY",
            SchemaType::Map => "MAP",
            SchemaType::Struct => "STRUCT",
        }
    }

    /// Whether this is one of the signed integer types.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            SchemaType::Int8 | SchemaType::Int16 | SchemaType::Int32 | SchemaType::Int64
        )
    }

    /// Whether this type has no child schemas.
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            SchemaType::Array | SchemaType::Map | SchemaType::Struct
        )
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a schema node together with its children.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    String,
    Bytes,
    /// Ordered sequence of elements sharing one schema
    Array(Box<Schema>),
    /// Key/value mapping
    Map { key: Box<Schema>, value: Box<Schema> },
    /// Ordered, uniquely named fields
    Struct(Vec<Field>),
}

impl SchemaKind {
    /// Type tag of this kind.
    pub fn schema_type(&self) -> SchemaType {
        match self {
            SchemaKind::Int8 => SchemaType::Int8,
            SchemaKind::Int16 => SchemaType::Int16,
            SchemaKind::Int32 => SchemaType::Int32,
            SchemaKind::Int64 => SchemaType::Int64,
            SchemaKind::Float32 => SchemaType::Float32,
            SchemaKind::Float64 => SchemaType::Float64,
            SchemaKind::Boolean => SchemaType::Boolean,
            SchemaKind::String => SchemaType::String,
            SchemaKind::Bytes => SchemaType::Bytes,
            SchemaKind::Array(_) => SchemaType::Array,
            SchemaKind::Map { .. } => SchemaType::Map,
            SchemaKind::Struct(_) => SchemaType::Struct,
        }
    }
}

/// A named member of a struct schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    index: usize,
    schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, index: usize, schema: Schema) -> Self {
        Self {
            name: name.into(),
            index,
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the field within its struct.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// A node of a schema tree.
///
/// Schemas are immutable once built; use [`SchemaBuilder`] to construct them.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    kind: SchemaKind,
    name: Option<String>,
    optional: bool,
    default_value: Option<Box<Value>>,
    version: Option<i32>,
    doc: Option<String>,
    parameters: BTreeMap<String, String>,
}

impl Schema {
    /// Create a required, unnamed schema of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            name: None,
            optional: false,
            default_value: None,
            version: None,
            doc: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> &SchemaKind {
        &self.kind
    }

    pub fn schema_type(&self) -> SchemaType {
        self.kind.schema_type()
    }

    /// Logical-type or struct type name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_deref()
    }

    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// The logical type recognized from this schema's name, if any.
    pub fn logical_type(&self) -> Option<LogicalType> {
        self.name().and_then(LogicalType::from_name)
    }

    /// Element schema of an array, or value schema of a map.
    pub fn value_schema(&self) -> Option<&Schema> {
        match &self.kind {
            SchemaKind::Array(element) => Some(element),
            SchemaKind::Map { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Key schema of a map.
    pub fn key_schema(&self) -> Option<&Schema> {
        match &self.kind {
            SchemaKind::Map { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Fields of a struct schema; empty for every other kind.
    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            SchemaKind::Struct(fields) => fields,
            _ => &[],
        }
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Name used when this schema participates in a synthesized type name:
    /// the schema name if present, otherwise the upper-case type name.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or_else(|| self.schema_type().as_str())
    }
}

/// Builder for [`Schema`].
///
/// ```rust
/// use connect_types::{SchemaBuilder, SchemaType, Value};
///
/// let schema = SchemaBuilder::int32()
///     .optional()
///     .default_value(Value::Int32(7))
///     .unwrap()
///     .build();
/// assert_eq!(schema.schema_type(), SchemaType::Int32);
/// assert!(schema.is_optional());
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            schema: Schema::new(kind),
        }
    }

    pub fn int8() -> Self {
        Self::new(SchemaKind::Int8)
    }

    pub fn int16() -> Self {
        Self::new(SchemaKind::Int16)
    }

    pub fn int32() -> Self {
        Self::new(SchemaKind::Int32)
    }

    pub fn int64() -> Self {
        Self::new(SchemaKind::Int64)
    }

    pub fn float32() -> Self {
        Self::new(SchemaKind::Float32)
    }

    pub fn float64() -> Self {
        Self::new(SchemaKind::Float64)
    }

    pub fn boolean() -> Self {
        Self::new(SchemaKind::Boolean)
    }

    pub fn string() -> Self {
        Self::new(SchemaKind::String)
    }

    pub fn bytes() -> Self {
        Self::new(SchemaKind::Bytes)
    }

    pub fn array(element: Schema) -> Self {
        Self::new(SchemaKind::Array(Box::new(element)))
    }

    pub fn map(key: Schema, value: Schema) -> Self {
        Self::new(SchemaKind::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    /// An empty struct; add members with [`SchemaBuilder::field`].
    pub fn struct_type() -> Self {
        Self::new(SchemaKind::Struct(Vec::new()))
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema.schema_type()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.schema.name = Some(name.into());
        self
    }

    /// Set the name only when one is given.
    pub fn maybe_name(mut self, name: Option<&str>) -> Self {
        self.schema.name = name.map(str::to_string);
        self
    }

    pub fn optional(mut self) -> Self {
        self.schema.optional = true;
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.schema.version = Some(version);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.schema.doc = Some(doc.into());
        self
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.schema.parameters.insert(key.into(), value.into());
        self
    }

    /// Append a field to a struct schema.
    pub fn field(mut self, name: impl Into<String>, schema: Schema) -> Result<Self, SchemaError> {
        let name = name.into();
        match &mut self.schema.kind {
            SchemaKind::Struct(fields) => {
                if fields.iter().any(|f| f.name == name) {
                    return Err(SchemaError::DuplicateField(name));
                }
                let index = fields.len();
                fields.push(Field::new(name, index, schema));
                Ok(self)
            }
            other => Err(SchemaError::FieldOnNonStruct {
                field: name,
                schema_type: other.schema_type(),
            }),
        }
    }

    /// Attach a default value. A `Null` default is the same as no default.
    pub fn default_value(mut self, value: Value) -> Result<Self, SchemaError> {
        if value.is_null() {
            self.schema.default_value = None;
            return Ok(self);
        }
        if !value.conforms_to(&self.schema) {
            return Err(SchemaError::InvalidDefault {
                schema_type: self.schema.schema_type(),
                found: value.type_name(),
            });
        }
        self.schema.default_value = Some(Box::new(value));
        Ok(self)
    }

    /// Peek at the schema built so far.
    pub fn as_schema(&self) -> &Schema {
        &self.schema
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_fields_keep_declaration_order() {
        let schema = SchemaBuilder::struct_type()
            .name("person")
            .field("name", SchemaBuilder::string().build())
            .unwrap()
            .field("age", SchemaBuilder::int32().build())
            .unwrap()
            .build();

        let names: Vec<&str> = schema.fields().iter().map(Field::name).collect();
        assert_eq!(names, vec!["name", "age"]);
        assert_eq!(schema.field("age").unwrap().index(), 1);
        assert_eq!(schema.name(), Some("person"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = SchemaBuilder::struct_type()
            .field("a", SchemaBuilder::string().build())
            .unwrap()
            .field("a", SchemaBuilder::int8().build())
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("a".to_string()));
    }

    #[test]
    fn test_field_on_primitive_rejected() {
        let err = SchemaBuilder::int64()
            .field("a", SchemaBuilder::string().build())
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::FieldOnNonStruct {
                schema_type: SchemaType::Int64,
                ..
            }
        ));
    }

    #[test]
    fn test_default_must_conform() {
        let err = SchemaBuilder::int32()
            .default_value(Value::String("x".to_string()))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { .. }));

        let schema = SchemaBuilder::int32()
            .default_value(Value::Int32(3))
            .unwrap()
            .build();
        assert_eq!(schema.default_value(), Some(&Value::Int32(3)));
    }

    #[test]
    fn test_map_children() {
        let schema = SchemaBuilder::map(
            SchemaBuilder::string().build(),
            SchemaBuilder::int32().build(),
        )
        .build();
        assert_eq!(schema.key_schema().unwrap().schema_type(), SchemaType::String);
        assert_eq!(schema.value_schema().unwrap().schema_type(), SchemaType::Int32);
        assert!(schema.fields().is_empty());
    }

    #[test]
    fn test_display_name_falls_back_to_type() {
        let unnamed = SchemaBuilder::string().build();
        let named = SchemaBuilder::struct_type().name("com.acme.Item").build();
        assert_eq!(unnamed.display_name(), "STRING");
        assert_eq!(named.display_name(), "com.acme.Item");
    }

    #[test]
    fn test_schema_type_predicates() {
        assert!(SchemaType::Int16.is_integer());
        assert!(!SchemaType::Float32.is_integer());
        assert!(SchemaType::Bytes.is_primitive());
        assert!(!SchemaType::Map.is_primitive());
        assert_eq!(SchemaType::Float64.to_string(), "FLOAT64");
    }
}

//! Record types read from a topic partition.

use crate::schema::Schema;
use crate::value::Value;

/// A record delivered to the sink.
///
/// `topic`, `partition` and `offset` uniquely identify the record in the
/// upstream log. Absent keys and values are `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkRecord {
    /// Source topic name
    pub topic: String,
    /// Source partition number
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Schema of the key (if the key is typed)
    pub key_schema: Option<Schema>,
    /// Record key
    pub key: Value,
    /// Schema of the value (if the value is typed)
    pub value_schema: Option<Schema>,
    /// Record value
    pub value: Value,
}

impl SinkRecord {
    /// A record with no key and no value.
    pub fn new(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            key_schema: None,
            key: Value::Null,
            value_schema: None,
            value: Value::Null,
        }
    }

    pub fn with_key(mut self, schema: Option<Schema>, key: impl Into<Value>) -> Self {
        self.key_schema = schema;
        self.key = key.into();
        self
    }

    pub fn with_value(mut self, schema: Option<Schema>, value: impl Into<Value>) -> Self {
        self.value_schema = schema;
        self.value = value.into();
        self
    }
}

/// A decoded payload: an optional schema and the value it describes.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAndValue {
    pub schema: Option<Schema>,
    pub value: Value,
}

impl SchemaAndValue {
    pub fn new(schema: Option<Schema>, value: Value) -> Self {
        Self { schema, value }
    }

    /// A schema-less value.
    pub fn untyped(value: Value) -> Self {
        Self {
            schema: None,
            value,
        }
    }
}

//! Record orchestration: one source record in, one indexable document out.

use crate::config::SinkSettings;
use crate::error::{ConvertError, RecordError, Result};
use crate::id::{resolve_id, IdMode};
use crate::rewrite::{rewrite_schema, rewrite_value};
use connect_json::JsonConverter;
use connect_types::{Converter, SinkRecord, Value};
use std::borrow::Cow;
use tracing::debug;

/// Where a document lands: index, mapping type, and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub index: String,
    pub doc_type: String,
    pub id: String,
}

/// A document ready for the bulk indexer.
///
/// `offset` is the source offset, kept for commit and version tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexableRecord {
    pub key: DocumentKey,
    pub payload: String,
    pub offset: i64,
}

/// Converts [`SinkRecord`]s into [`IndexableRecord`]s.
///
/// Holds no mutable state; a single instance can serve every worker.
#[derive(Debug, Clone)]
pub struct DataConverter<C: Converter = JsonConverter> {
    converter: C,
}

impl Default for DataConverter<JsonConverter> {
    fn default() -> Self {
        Self::new(JsonConverter::schemaless())
    }
}

impl<C: Converter> DataConverter<C> {
    /// `converter` should write bare payloads; an envelope would end up in
    /// every document.
    pub fn new(converter: C) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Convert a record using the per-topic choices in `settings`.
    pub fn convert(
        &self,
        record: &SinkRecord,
        settings: &SinkSettings,
    ) -> std::result::Result<IndexableRecord, RecordError> {
        self.convert_record(
            record,
            &settings.index_for(&record.topic),
            &settings.type_name,
            settings.id_mode_for(&record.topic),
            settings.rewrite_schema_for(&record.topic),
        )
    }

    /// Convert a record into a document for `index` of mapping type `doc_type`.
    ///
    /// In [`IdMode::EmbeddedKey`] the key picks the destination index and the
    /// payload is encoded as-is, whatever `rewrite` says.
    pub fn convert_record(
        &self,
        record: &SinkRecord,
        index: &str,
        doc_type: &str,
        id_mode: IdMode,
        rewrite: bool,
    ) -> std::result::Result<IndexableRecord, RecordError> {
        self.try_convert(record, index, doc_type, id_mode, rewrite)
            .map_err(|e| RecordError::new(record, e))
    }

    fn try_convert(
        &self,
        record: &SinkRecord,
        index: &str,
        doc_type: &str,
        id_mode: IdMode,
        rewrite: bool,
    ) -> Result<IndexableRecord> {
        let resolved = resolve_id(record, id_mode, &self.converter)?;

        let rewritten_schema;
        let (schema, value): (_, Cow<'_, Value>) = if id_mode == IdMode::EmbeddedKey || !rewrite
        {
            (record.value_schema.as_ref(), Cow::Borrowed(&record.value))
        } else {
            rewritten_schema = rewrite_schema(record.value_schema.as_ref())?;
            let value = rewrite_value(
                &record.value,
                record.value_schema.as_ref(),
                rewritten_schema.as_ref(),
            )?;
            (rewritten_schema.as_ref(), Cow::Owned(value))
        };

        let bytes = self
            .converter
            .from_connect_data(&record.topic, schema, &value)
            .map_err(|e| ConvertError::Codec(Box::new(e)))?;
        let payload = String::from_utf8(bytes).map_err(|e| ConvertError::Codec(Box::new(e)))?;

        let index = resolved.index_override.unwrap_or_else(|| index.to_string());
        debug!(
            topic = %record.topic,
            partition = record.partition,
            offset = record.offset,
            index = %index,
            id = %resolved.id,
            "Converted record"
        );

        Ok(IndexableRecord {
            key: DocumentKey {
                index,
                doc_type: doc_type.to_string(),
                id: resolved.id,
            },
            payload,
            offset: record.offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_types::{logical, SchemaBuilder, Struct};
    use rust_decimal::Decimal;
    use serde_json::json;

    fn order_record() -> SinkRecord {
        let schema = SchemaBuilder::struct_type()
            .name("order")
            .field("id", SchemaBuilder::int64().build())
            .unwrap()
            .field("total", logical::decimal(2).build())
            .unwrap()
            .field(
                "attrs",
                SchemaBuilder::map(
                    SchemaBuilder::string().build(),
                    SchemaBuilder::int32().build(),
                )
                .optional()
                .build(),
            )
            .unwrap()
            .build();
        let value = Struct::new(schema.clone())
            .unwrap()
            .with("id", 9i64)
            .unwrap()
            .with("total", Decimal::new(1250, 2))
            .unwrap()
            .with(
                "attrs",
                Value::Map(vec![
                    (Value::from("a"), Value::Int32(1)),
                    (Value::from("b"), Value::Int32(2)),
                ]),
            )
            .unwrap();
        SinkRecord::new("orders", 3, 42)
            .with_key(Some(SchemaBuilder::int64().build()), 9i64)
            .with_value(Some(schema), value)
    }

    fn payload_json(record: &IndexableRecord) -> serde_json::Value {
        serde_json::from_str(&record.payload).unwrap()
    }

    #[test]
    fn test_direct_key_with_rewrite() {
        let converter = DataConverter::default();
        let out = converter
            .convert_record(&order_record(), "orders", "kafka-connect", IdMode::DirectKey, true)
            .unwrap();

        assert_eq!(
            out.key,
            DocumentKey {
                index: "orders".to_string(),
                doc_type: "kafka-connect".to_string(),
                id: "9".to_string(),
            }
        );
        assert_eq!(out.offset, 42);
        assert_eq!(
            payload_json(&out),
            json!({
                "id": 9,
                "total": 12.5,
                "attrs": [{"key": "a", "value": 1}, {"key": "b", "value": 2}]
            })
        );
    }

    #[test]
    fn test_payload_keeps_field_order() {
        let schema = SchemaBuilder::struct_type()
            .field("zeta", SchemaBuilder::int32().build())
            .unwrap()
            .field("alpha", logical::decimal(2).build())
            .unwrap()
            .build();
        let value = Struct::new(schema.clone())
            .unwrap()
            .with("zeta", 1)
            .unwrap()
            .with("alpha", Decimal::new(1250, 2))
            .unwrap();
        let record = SinkRecord::new("t", 0, 0).with_value(Some(schema), value);
        let out = DataConverter::default()
            .convert_record(&record, "t", "doc", IdMode::Synthetic, true)
            .unwrap();
        assert_eq!(out.payload, r#"{"zeta":1,"alpha":12.5}"#);
    }

    #[test]
    fn test_synthetic_id_without_rewrite() {
        let converter = DataConverter::default();
        let out = converter
            .convert_record(&order_record(), "orders", "t", IdMode::Synthetic, false)
            .unwrap();

        assert_eq!(out.key.id, "orders+3+42");
        let payload = payload_json(&out);
        // Decimal written by the codec, map kept as an object
        assert_eq!(payload["total"], json!("BOI="));
        assert_eq!(payload["attrs"], json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_embedded_key_overrides_index_and_skips_rewrite() {
        let key = Value::Map(vec![
            (Value::from("uuid"), Value::from("abc-123")),
            (Value::from("index"), Value::from("5")),
        ]);
        let record = SinkRecord::new("events", 0, 7)
            .with_key(None, key)
            .with_value(
                Some(logical::decimal(1).build()),
                Value::Decimal(Decimal::new(15, 1)),
            );
        let out = DataConverter::default()
            .convert_record(&record, "ignored", "t", IdMode::EmbeddedKey, true)
            .unwrap();

        assert_eq!(out.key.index, "events-5");
        assert_eq!(out.key.id, "abc-123");
        assert_eq!(payload_json(&out), json!("Dw=="));
    }

    #[test]
    fn test_untyped_value() {
        let record = SinkRecord::new("logs", 0, 1)
            .with_key(None, "k1")
            .with_value(
                None,
                Value::Map(vec![(Value::from("level"), Value::from("warn"))]),
            );
        let out = DataConverter::default()
            .convert_record(&record, "logs", "t", IdMode::DirectKey, true)
            .unwrap();
        assert_eq!(out.key.id, "k1");
        assert_eq!(payload_json(&out), json!({"level": "warn"}));
    }

    #[test]
    fn test_null_value_with_optional_schema() {
        let record = SinkRecord::new("logs", 0, 1)
            .with_key(None, 1i32)
            .with_value(Some(SchemaBuilder::string().optional().build()), Value::Null);
        let out = DataConverter::default()
            .convert_record(&record, "logs", "t", IdMode::DirectKey, true)
            .unwrap();
        assert_eq!(out.payload, "null");
    }

    #[test]
    fn test_errors_carry_record_location() {
        let record = SinkRecord::new("orders", 1, 5);
        let err = DataConverter::default()
            .convert_record(&record, "orders", "t", IdMode::DirectKey, true)
            .unwrap_err();
        assert_eq!(err.topic, "orders");
        assert_eq!(err.partition, 1);
        assert_eq!(err.offset, 5);
        assert!(matches!(err.kind(), ConvertError::NullKey));
    }

    #[test]
    fn test_required_null_value_fails() {
        let record = SinkRecord::new("orders", 0, 0)
            .with_key(None, 1i64)
            .with_value(Some(SchemaBuilder::int32().build()), Value::Null);
        let err = DataConverter::default()
            .convert_record(&record, "orders", "t", IdMode::DirectKey, true)
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ConvertError::MissingRequiredValue { .. }
        ));
    }

    #[test]
    fn test_convert_with_settings() {
        let settings = SinkSettings::new("doc")
            .with_topic_key_ignore(["orders"])
            .with_topic_index("orders", "orders-v2");
        let out = DataConverter::default()
            .convert(&order_record(), &settings)
            .unwrap();
        assert_eq!(out.key.index, "orders-v2");
        assert_eq!(out.key.doc_type, "doc");
        assert_eq!(out.key.id, "orders+3+42");
        assert_eq!(payload_json(&out)["total"], json!(12.5));
    }
}

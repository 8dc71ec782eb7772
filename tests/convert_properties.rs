//! End-to-end conversion properties over the public API.

use connect_json::{JsonConverter, JsonConverterConfig};
use connect_types::{
    logical, Converter, Schema, SchemaAndValue, SchemaBuilder, SchemaType, SinkRecord, Struct,
    Value,
};
use es_sink::{
    rewrite_schema, rewrite_value, ConvertError, DataConverter, IdMode, SinkSettings,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .with(fmt::layer())
        .try_init();
}

fn order_schema() -> Schema {
    SchemaBuilder::struct_type()
        .name("order")
        .field("id", SchemaBuilder::int32().build())
        .unwrap()
        .field(
            "prices",
            SchemaBuilder::map(
                SchemaBuilder::string().build(),
                logical::decimal(2).build(),
            )
            .build(),
        )
        .unwrap()
        .field(
            "placed",
            logical::date().optional().build(),
        )
        .unwrap()
        .build()
}

fn order_value() -> Value {
    Value::Struct(
        Struct::new(order_schema())
            .unwrap()
            .with("id", 17)
            .unwrap()
            .with(
                "prices",
                Value::Map(vec![
                    (Value::from("small"), Value::Decimal(Decimal::new(1250, 2))),
                    (Value::from("large"), Value::Decimal(Decimal::new(1999, 2))),
                ]),
            )
            .unwrap(),
    )
}

#[test]
fn test_plain_schemas_are_unchanged() {
    let schema = SchemaBuilder::struct_type()
        .name("plain")
        .field("a", SchemaBuilder::int64().build())
        .unwrap()
        .field(
            "b",
            SchemaBuilder::array(SchemaBuilder::string().optional().build()).build(),
        )
        .unwrap()
        .field("c", SchemaBuilder::boolean().optional().build())
        .unwrap()
        .build();
    assert_eq!(rewrite_schema(Some(&schema)).unwrap(), Some(schema));
}

#[test]
fn test_round_trip_through_rewritten_schema() {
    init_logging();

    let old = order_schema();
    let new = rewrite_schema(Some(&old)).unwrap().unwrap();
    let rewritten = rewrite_value(&order_value(), Some(&old), Some(&new)).unwrap();

    // Encode with the schema envelope, decode, and compare field by field
    let codec = JsonConverter::new(JsonConverterConfig::new());
    let bytes = codec
        .from_connect_data("orders", Some(&new), &rewritten)
        .unwrap();
    let SchemaAndValue { schema, value } = codec.to_connect_data("orders", &bytes).unwrap();
    assert_eq!(schema.as_ref(), Some(&new));

    let decoded = value.as_struct().unwrap();
    assert_eq!(decoded.get("id"), Some(&Value::Int32(17)));
    assert_eq!(decoded.get("placed"), Some(&Value::Null));

    let prices: Vec<(Value, f64)> = decoded
        .get("prices")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| {
            let entry = entry.as_struct().unwrap();
            (
                entry.get("key").unwrap().clone(),
                entry.get("value").unwrap().as_f64().unwrap(),
            )
        })
        .collect();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0].0, Value::from("small"));
    assert!((prices[0].1 - 12.5).abs() < f64::EPSILON);
    assert_eq!(prices[1].0, Value::from("large"));
    assert!((prices[1].1 - 19.99).abs() < 1e-9);
}

#[test]
fn test_rewritten_schema_is_a_fixed_point() {
    let once = rewrite_schema(Some(&order_schema())).unwrap().unwrap();
    let twice = rewrite_schema(Some(&once)).unwrap().unwrap();
    assert_eq!(once, twice);
    assert_eq!(
        once.field("prices").unwrap().schema().schema_type(),
        SchemaType::Array
    );
}

#[test]
fn test_document_for_each_id_mode() {
    init_logging();

    let record = SinkRecord::new("Orders", 3, 42)
        .with_key(Some(SchemaBuilder::int64().build()), 7i64)
        .with_value(Some(order_schema()), order_value());
    let converter = DataConverter::default();

    let direct = converter
        .convert(&record, &SinkSettings::default())
        .unwrap();
    assert_eq!(direct.key.index, "orders");
    assert_eq!(direct.key.id, "7");
    let payload: serde_json::Value = serde_json::from_str(&direct.payload).unwrap();
    assert_eq!(
        payload,
        json!({
            "id": 17,
            "prices": [
                {"key": "small", "value": 12.5},
                {"key": "large", "value": 19.99}
            ],
            "placed": null
        })
    );

    let synthetic = converter
        .convert(&record, &SinkSettings::default().with_key_ignore(true))
        .unwrap();
    assert_eq!(synthetic.key.id, "Orders+3+42");

    let err = converter
        .convert(&record, &SinkSettings::default().with_json_key(true))
        .unwrap_err();
    assert!(matches!(err.kind(), ConvertError::KeyDecoding(_)));
}

#[test]
fn test_float_key_is_rejected_with_location() {
    let record = SinkRecord::new("metrics", 1, 99)
        .with_key(Some(SchemaBuilder::float64().build()), 1.5f64)
        .with_value(None, "x");
    let err = DataConverter::default()
        .convert_record(&record, "metrics", "t", IdMode::DirectKey, true)
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ConvertError::UnsupportedKeyType { .. }
    ));
    assert_eq!((err.topic.as_str(), err.partition, err.offset), ("metrics", 1, 99));
    assert!(err.to_string().contains("FLOAT64"));
}

/// Codec double that records calls and writes a fixed payload.
struct CountingCodec {
    calls: AtomicUsize,
}

#[derive(Debug, thiserror::Error)]
#[error("codec failure")]
struct CodecFailure;

impl Converter for CountingCodec {
    type Error = CodecFailure;

    fn from_connect_data(
        &self,
        _topic: &str,
        _schema: Option<&Schema>,
        value: &Value,
    ) -> Result<Vec<u8>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match value {
            Value::String(s) if s == "boom" => Err(CodecFailure),
            _ => Ok(b"{}".to_vec()),
        }
    }

    fn to_connect_data(&self, _topic: &str, _bytes: &[u8]) -> Result<SchemaAndValue, Self::Error> {
        Ok(SchemaAndValue::untyped(Value::Null))
    }
}

#[test]
fn test_codec_is_injectable() {
    let converter = DataConverter::new(CountingCodec {
        calls: AtomicUsize::new(0),
    });

    let ok = SinkRecord::new("t", 0, 1).with_key(None, "k").with_value(None, "fine");
    let document = converter
        .convert_record(&ok, "t", "doc", IdMode::DirectKey, true)
        .unwrap();
    assert_eq!(document.payload, "{}");

    let bad = SinkRecord::new("t", 0, 2).with_key(None, "k").with_value(None, "boom");
    let err = converter
        .convert_record(&bad, "t", "doc", IdMode::DirectKey, true)
        .unwrap_err();
    assert!(matches!(err.kind(), ConvertError::Codec(_)));
    assert_eq!(converter.converter().calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_converter_is_shared_across_threads() {
    let converter = DataConverter::default();
    let settings = SinkSettings::default().with_key_ignore(true);

    std::thread::scope(|scope| {
        for partition in 0..4 {
            let converter = &converter;
            let settings = &settings;
            scope.spawn(move || {
                for offset in 0..25 {
                    let record = SinkRecord::new("orders", partition, offset)
                        .with_value(Some(order_schema()), order_value());
                    let document = converter.convert(&record, settings).unwrap();
                    assert_eq!(document.key.id, format!("orders+{partition}+{offset}"));
                }
            });
        }
    });
}

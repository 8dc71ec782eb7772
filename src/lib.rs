//! es-sink
//!
//! Turns typed topic records into documents for an Elasticsearch-style
//! indexer: a destination index and mapping type, a document id, and a
//! JSON payload.
//!
//! # Pipeline
//!
//! 1. [`id`] - resolve the document id (embedded key, synthetic, or direct key)
//! 2. [`rewrite`] - rewrite the value schema and value (decimals to doubles,
//!    maps to arrays of key/value structs)
//! 3. [`convert`] - encode the payload and assemble the [`IndexableRecord`]
//!
//! Settings come from [`ConverterOpts`] (CLI flags or `ES_SINK_*`
//! environment variables). [`jsonl`] drives the pipeline over a JSON Lines
//! record dump.
//!
//! # Example
//!
//! ```rust
//! use connect_types::{logical, SchemaBuilder, SinkRecord, Struct};
//! use es_sink::{DataConverter, IdMode};
//! use rust_decimal::Decimal;
//!
//! let schema = SchemaBuilder::struct_type()
//!     .field("total", logical::decimal(2).build())
//!     .unwrap()
//!     .build();
//! let value = Struct::new(schema.clone())
//!     .unwrap()
//!     .with("total", Decimal::new(1250, 2))
//!     .unwrap();
//! let record = SinkRecord::new("orders", 3, 42).with_value(Some(schema), value);
//!
//! let document = DataConverter::default()
//!     .convert_record(&record, "orders", "kafka-connect", IdMode::Synthetic, true)
//!     .unwrap();
//! assert_eq!(document.key.id, "orders+3+42");
//! assert_eq!(document.payload, r#"{"total":12.5}"#);
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod id;
pub mod jsonl;
pub mod rewrite;

pub use config::{ConverterOpts, SinkSettings};
pub use convert::{DataConverter, DocumentKey, IndexableRecord};
pub use error::{ConvertError, RecordError};
pub use id::{resolve_id, IdMode, ResolvedId};
pub use jsonl::{convert_jsonl, OnError, RunStats};
pub use rewrite::{rewrite_schema, rewrite_value};

//! JSON conversion for connect-types schemas and values.
//!
//! This crate implements the [`connect_types::Converter`] codec for JSON.
//!
//! # Modules
//!
//! - [`forward`] - Value → JSON value conversion
//! - [`reverse`] - JSON value → Value conversion
//! - [`schema_json`] - Schema ⇄ JSON for the `{"schema", "payload"}` envelope
//! - [`converter`] - [`JsonConverter`], tying the above to the `Converter` trait
//!
//! # Example
//!
//! ```rust
//! use connect_json::JsonConverter;
//! use connect_types::{Converter, SchemaBuilder, Value};
//!
//! let converter = JsonConverter::schemaless();
//! let schema = SchemaBuilder::int32().build();
//! let bytes = converter
//!     .from_connect_data("topic", Some(&schema), &Value::Int32(42))
//!     .unwrap();
//! assert_eq!(bytes, b"42");
//! ```

pub mod converter;
pub mod error;
pub mod forward;
pub mod reverse;
pub mod schema_json;

pub use converter::{DecimalFormat, JsonConverter, JsonConverterConfig};
pub use error::{JsonConverterError, Result};
pub use forward::value_to_json;
pub use reverse::json_to_value;
pub use schema_json::{schema_from_json, schema_to_json};

//! Core types for the es-sink record converter.
//!
//! This crate provides the typed record model that flows through the sink:
//!
//! - [`Schema`] / [`SchemaKind`] - Recursive schema tree (primitives, arrays, maps, structs)
//! - [`SchemaBuilder`] - Validating schema construction
//! - [`LogicalType`] - Decimal, date, time and timestamp annotations on primitive schemas
//! - [`Value`] / [`Struct`] - Value trees conforming to a schema
//! - [`SinkRecord`] - A record read from a topic partition
//! - [`Converter`] - The codec boundary used to turn `(schema, value)` pairs into bytes
//!
//! # Architecture
//!
//! ```text
//! connect-types (this crate)
//!    │
//!    ├─── connect-json   (implements Converter for JSON)
//!    │
//!    └─── es-sink        (id resolution, schema/value rewriting, record conversion)
//! ```
//!
//! # Example
//!
//! ```rust
//! use connect_types::{SchemaBuilder, Struct, Value};
//!
//! let schema = SchemaBuilder::struct_type()
//!     .name("order")
//!     .field("id", SchemaBuilder::int64().build())
//!     .unwrap()
//!     .field("note", SchemaBuilder::string().optional().build())
//!     .unwrap()
//!     .build();
//!
//! let order = Struct::new(schema)
//!     .unwrap()
//!     .with("id", 42i64)
//!     .unwrap();
//! assert_eq!(order.get("id"), Some(&Value::Int64(42)));
//! assert_eq!(order.get("note"), Some(&Value::Null));
//! ```

pub mod converter;
pub mod error;
pub mod logical;
pub mod record;
pub mod schema;
pub mod value;

// Re-exports for convenience
pub use converter::Converter;
pub use error::{DataError, SchemaError};
pub use logical::LogicalType;
pub use record::{SchemaAndValue, SinkRecord};
pub use schema::{Field, Schema, SchemaBuilder, SchemaKind, SchemaType};
pub use value::{Struct, Value};

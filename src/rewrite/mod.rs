//! Rewriting of typed payloads into shapes a document store indexes directly.
//!
//! Both sides walk the same schema tree, so they must agree on every rule:
//!
//! | Original                    | Rewritten                                    |
//! |-----------------------------|----------------------------------------------|
//! | Decimal (logical)           | `float64`                                    |
//! | Date, Time, Timestamp       | unchanged                                    |
//! | `array<T>`                  | `array<rewrite(T)>`                          |
//! | `map<K, V>`                 | `array<struct "{K}-{V}" { key, value }>`     |
//! | `struct`                    | same fields, each rewritten                  |
//! | primitives                  | unchanged                                    |
//!
//! Optionality is kept on every rewritten schema, and non-struct defaults are
//! carried over in their rewritten form.

mod schema;
mod value;

pub use schema::rewrite_schema;
pub use value::{rewrite_value, SchemaPair};

/// Field holding the entry key in a rewritten map entry.
pub const MAP_KEY_FIELD: &str = "key";
/// Field holding the entry value in a rewritten map entry.
pub const MAP_VALUE_FIELD: &str = "value";

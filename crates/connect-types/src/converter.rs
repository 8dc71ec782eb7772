//! Converter trait definition.
//!
//! A converter is the codec boundary between typed `(schema, value)` pairs and
//! serialized bytes. Implementations are configured once and then shared
//! read-only, so the trait requires `Send + Sync`.

use crate::record::SchemaAndValue;
use crate::schema::Schema;
use crate::value::Value;

/// Codec between typed data and bytes.
///
/// # Usage Pattern
///
/// Callers take the converter as a generic parameter so that tests can swap in
/// a stub:
///
/// ```ignore
/// pub struct DataConverter<C: Converter> {
///     converter: C,
/// }
/// ```
pub trait Converter: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Serialize `value`. With no schema, the representation is inferred from
    /// the runtime value.
    fn from_connect_data(
        &self,
        topic: &str,
        schema: Option<&Schema>,
        value: &Value,
    ) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize bytes produced by this converter (or a compatible producer).
    fn to_connect_data(&self, topic: &str, bytes: &[u8]) -> Result<SchemaAndValue, Self::Error>;
}

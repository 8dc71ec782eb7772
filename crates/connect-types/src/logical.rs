//! Logical types layered on primitive schemas.
//!
//! | Logical type | Underlying schema | Stored as |
//! |--------------|-------------------|-----------|
//! | Decimal      | BYTES + `scale`   | unscaled big-endian two's complement |
//! | Date         | INT32             | days since 1970-01-01 |
//! | Time         | INT32             | milliseconds since midnight |
//! | Timestamp    | INT64             | milliseconds since the Unix epoch |

use crate::error::SchemaError;
use crate::schema::{Schema, SchemaBuilder};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};

pub const DECIMAL_LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Decimal";
pub const DATE_LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Date";
pub const TIME_LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Time";
pub const TIMESTAMP_LOGICAL_NAME: &str = "org.apache.kafka.connect.data.Timestamp";

/// Schema parameter holding a decimal's scale.
pub const DECIMAL_SCALE_PARAM: &str = "scale";

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAY_FROM_CE: i32 = 719_163;
const MILLIS_PER_DAY: i32 = 86_400_000;

/// Logical types recognized by schema name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalType {
    Decimal,
    Date,
    Time,
    Timestamp,
}

impl LogicalType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            DECIMAL_LOGICAL_NAME => Some(LogicalType::Decimal),
            DATE_LOGICAL_NAME => Some(LogicalType::Date),
            TIME_LOGICAL_NAME => Some(LogicalType::Time),
            TIMESTAMP_LOGICAL_NAME => Some(LogicalType::Timestamp),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Decimal => DECIMAL_LOGICAL_NAME,
            LogicalType::Date => DATE_LOGICAL_NAME,
            LogicalType::Time => TIME_LOGICAL_NAME,
            LogicalType::Timestamp => TIMESTAMP_LOGICAL_NAME,
        }
    }
}

/// Builder for a decimal schema with the given scale.
pub fn decimal(scale: u32) -> SchemaBuilder {
    SchemaBuilder::bytes()
        .name(DECIMAL_LOGICAL_NAME)
        .parameter(DECIMAL_SCALE_PARAM, scale.to_string())
        .version(1)
}

pub fn date() -> SchemaBuilder {
    SchemaBuilder::int32().name(DATE_LOGICAL_NAME).version(1)
}

pub fn time() -> SchemaBuilder {
    SchemaBuilder::int32().name(TIME_LOGICAL_NAME).version(1)
}

pub fn timestamp() -> SchemaBuilder {
    SchemaBuilder::int64().name(TIMESTAMP_LOGICAL_NAME).version(1)
}

/// Read the scale of a decimal schema.
pub fn decimal_scale(schema: &Schema) -> Result<u32, SchemaError> {
    let raw = schema
        .parameter(DECIMAL_SCALE_PARAM)
        .ok_or_else(|| SchemaError::InvalidScale("missing".to_string()))?;
    raw.parse::<u32>()
        .map_err(|_| SchemaError::InvalidScale(raw.to_string()))
}

pub fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAY_FROM_CE
}

pub fn days_to_date(days: i32) -> Option<NaiveDate> {
    days.checked_add(UNIX_EPOCH_DAY_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

pub fn time_to_millis(time: NaiveTime) -> i32 {
    // Leap-second nanos (>= 1e9) are clamped into the last millisecond.
    let millis = (time.nanosecond() / 1_000_000).min(999);
    (time.num_seconds_from_midnight() * 1000 + millis) as i32
}

pub fn millis_to_time(millis: i32) -> Option<NaiveTime> {
    if !(0..MILLIS_PER_DAY).contains(&millis) {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(
        (millis / 1000) as u32,
        (millis % 1000) as u32 * 1_000_000,
    )
}

pub fn timestamp_to_millis(ts: &DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn millis_to_timestamp(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_logical_names_round_trip() {
        for lt in [
            LogicalType::Decimal,
            LogicalType::Date,
            LogicalType::Time,
            LogicalType::Timestamp,
        ] {
            assert_eq!(LogicalType::from_name(lt.name()), Some(lt));
        }
        assert_eq!(LogicalType::from_name("com.acme.Money"), None);
    }

    #[test]
    fn test_decimal_schema_scale() {
        let schema = decimal(2).build();
        assert_eq!(schema.logical_type(), Some(LogicalType::Decimal));
        assert_eq!(decimal_scale(&schema).unwrap(), 2);

        let broken = SchemaBuilder::bytes().name(DECIMAL_LOGICAL_NAME).build();
        assert!(decimal_scale(&broken).is_err());
    }

    #[test]
    fn test_epoch_days() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_days(epoch), 0);

        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(date_to_days(d), 19889);
        assert_eq!(days_to_date(19889), Some(d));
        assert_eq!(
            days_to_date(-1),
            NaiveDate::from_ymd_opt(1969, 12, 31)
        );
    }

    #[test]
    fn test_time_millis() {
        let t = NaiveTime::from_hms_milli_opt(14, 30, 45, 250).unwrap();
        let ms = time_to_millis(t);
        assert_eq!(ms, 52_245_250);
        assert_eq!(millis_to_time(ms), Some(t));
        assert_eq!(millis_to_time(MILLIS_PER_DAY), None);
        assert_eq!(millis_to_time(-1), None);
    }

    #[test]
    fn test_timestamp_millis() {
        let ts = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let ms = timestamp_to_millis(&ts);
        assert_eq!(ms, 1_718_447_400_000);
        assert_eq!(millis_to_timestamp(ms), Some(ts));
    }
}

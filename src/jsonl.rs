//! Batch conversion of JSON Lines record dumps.
//!
//! Input lines:
//!
//! ```json
//! {"topic": "orders", "partition": 0, "offset": 42, "key": 7, "value": {"schema": {...}, "payload": {...}}}
//! ```
//!
//! `key` and `value` are either a `{"schema", "payload"}` envelope, bare
//! JSON (decoded without a schema), or absent/null. Each converted record
//! becomes one output line:
//!
//! ```json
//! {"index": "orders", "type": "kafka-connect", "id": "7", "offset": 42, "payload": {...}}
//! ```

use crate::config::SinkSettings;
use crate::convert::{DataConverter, IndexableRecord};
use anyhow::{anyhow, Context, Result};
use connect_json::JsonConverter;
use connect_types::{Converter, SinkRecord};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use tracing::{info, warn};

/// What to do with a line that cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OnError {
    /// Stop at the first bad line
    #[default]
    Fail,
    /// Log and continue
    Skip,
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub converted: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct RecordLine {
    topic: String,
    #[serde(default)]
    partition: i32,
    offset: i64,
    #[serde(default)]
    key: serde_json::Value,
    #[serde(default)]
    value: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct DocumentLine<'a> {
    index: &'a str,
    #[serde(rename = "type")]
    doc_type: &'a str,
    id: &'a str,
    offset: i64,
    payload: serde_json::Value,
}

/// Parse one input line into a [`SinkRecord`].
///
/// `decoder` must have schemas enabled to recognise envelopes.
pub fn parse_record(line: &str, decoder: &JsonConverter) -> Result<SinkRecord> {
    let parsed: RecordLine = serde_json::from_str(line).context("Invalid record line")?;
    let key = decoder
        .from_json(&parsed.key)
        .context("Failed to decode record key")?;
    let value = decoder
        .from_json(&parsed.value)
        .context("Failed to decode record value")?;
    Ok(SinkRecord::new(parsed.topic, parsed.partition, parsed.offset)
        .with_key(key.schema, key.value)
        .with_value(value.schema, value.value))
}

/// Render a converted record as one output line (without the newline).
pub fn document_line(record: &IndexableRecord) -> Result<String> {
    let payload: serde_json::Value =
        serde_json::from_str(&record.payload).context("Payload is not valid JSON")?;
    let line = DocumentLine {
        index: &record.key.index,
        doc_type: &record.key.doc_type,
        id: &record.key.id,
        offset: record.offset,
        payload,
    };
    Ok(serde_json::to_string(&line)?)
}

/// Convert every record line from `reader`, writing documents to `writer`.
pub fn convert_jsonl<R, W, C>(
    reader: R,
    mut writer: W,
    converter: &DataConverter<C>,
    settings: &SinkSettings,
    on_error: OnError,
) -> Result<RunStats>
where
    R: BufRead,
    W: Write,
    C: Converter,
{
    let decoder = JsonConverter::default();
    let mut stats = RunStats::default();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let converted = parse_record(&line, &decoder).and_then(|record| {
            let document = converter.convert(&record, settings)?;
            document_line(&document)
        });

        match converted {
            Ok(output) => {
                writeln!(writer, "{output}").context("Failed to write document")?;
                stats.converted += 1;
            }
            Err(e) => match on_error {
                OnError::Fail => {
                    return Err(anyhow!("Line {}: {e:#}", line_num + 1));
                }
                OnError::Skip => {
                    warn!("Skipping line {}: {e:#}", line_num + 1);
                    stats.skipped += 1;
                }
            },
        }
    }

    writer.flush().context("Failed to flush output")?;
    info!(
        "Converted {} records ({} skipped)",
        stats.converted, stats.skipped
    );
    Ok(stats)
}

//! Connector configuration: CLI/environment options and the resolved
//! per-topic settings the converter consults.

use crate::id::IdMode;
use clap::Parser;
use connect_json::{DecimalFormat, JsonConverter, JsonConverterConfig};
use std::collections::{HashMap, HashSet};

/// Default mapping type written with every document.
pub const DEFAULT_TYPE_NAME: &str = "kafka-connect";

#[derive(Parser, Clone, Debug)]
pub struct ConverterOpts {
    /// Mapping type written with every document
    #[arg(long, default_value = DEFAULT_TYPE_NAME, env = "ES_SINK_TYPE_NAME")]
    pub type_name: String,

    /// Use topic+partition+offset as the document id for every topic
    #[arg(long, env = "ES_SINK_KEY_IGNORE")]
    pub key_ignore: bool,

    /// Encode values as-is, without rewriting decimals and maps
    #[arg(long, env = "ES_SINK_SCHEMA_IGNORE")]
    pub schema_ignore: bool,

    /// Keys are {"uuid", "index"} objects choosing id and destination index.
    /// Takes precedence over the key-ignore options
    #[arg(long, env = "ES_SINK_JSON_KEY")]
    pub json_key: bool,

    /// Topics whose document id is topic+partition+offset
    #[arg(long, value_delimiter = ',', env = "ES_SINK_TOPIC_KEY_IGNORE")]
    pub topic_key_ignore: Vec<String>,

    /// Topics whose values are encoded without rewriting
    #[arg(long, value_delimiter = ',', env = "ES_SINK_TOPIC_SCHEMA_IGNORE")]
    pub topic_schema_ignore: Vec<String>,

    /// Destination index per topic, as topic:index pairs
    /// (default: the lower-cased topic name)
    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_topic_index,
        env = "ES_SINK_TOPIC_INDEX_MAP"
    )]
    pub topic_index_map: Vec<(String, String)>,

    /// How decimals are written when values are not rewritten (base64 or numeric)
    #[arg(long, default_value = "base64", env = "ES_SINK_DECIMAL_FORMAT")]
    pub decimal_format: DecimalFormat,
}

impl ConverterOpts {
    pub fn settings(&self) -> SinkSettings {
        SinkSettings {
            type_name: self.type_name.clone(),
            key_ignore: self.key_ignore,
            schema_ignore: self.schema_ignore,
            json_key: self.json_key,
            topic_key_ignore: self.topic_key_ignore.iter().cloned().collect(),
            topic_schema_ignore: self.topic_schema_ignore.iter().cloned().collect(),
            topic_index_map: self.topic_index_map.iter().cloned().collect(),
        }
    }

    /// Payload codec: bare JSON, decimals in the configured format.
    pub fn json_converter(&self) -> JsonConverter {
        JsonConverter::new(
            JsonConverterConfig::new()
                .with_schemas_enable(false)
                .with_decimal_format(self.decimal_format),
        )
    }
}

/// Parse a `topic:index` pair.
pub fn parse_topic_index(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((topic, index)) if !topic.trim().is_empty() && !index.trim().is_empty() => {
            Ok((topic.trim().to_string(), index.trim().to_string()))
        }
        _ => Err(format!("invalid topic index mapping '{s}' (expected topic:index)")),
    }
}

/// Resolved connector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSettings {
    pub type_name: String,
    pub key_ignore: bool,
    pub schema_ignore: bool,
    pub json_key: bool,
    pub topic_key_ignore: HashSet<String>,
    pub topic_schema_ignore: HashSet<String>,
    pub topic_index_map: HashMap<String, String>,
}

impl Default for SinkSettings {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_NAME)
    }
}

impl SinkSettings {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key_ignore: false,
            schema_ignore: false,
            json_key: false,
            topic_key_ignore: HashSet::new(),
            topic_schema_ignore: HashSet::new(),
            topic_index_map: HashMap::new(),
        }
    }

    pub fn with_key_ignore(mut self, ignore: bool) -> Self {
        self.key_ignore = ignore;
        self
    }

    pub fn with_schema_ignore(mut self, ignore: bool) -> Self {
        self.schema_ignore = ignore;
        self
    }

    pub fn with_json_key(mut self, json_key: bool) -> Self {
        self.json_key = json_key;
        self
    }

    pub fn with_topic_key_ignore<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topic_key_ignore.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn with_topic_schema_ignore<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topic_schema_ignore
            .extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn with_topic_index(mut self, topic: impl Into<String>, index: impl Into<String>) -> Self {
        self.topic_index_map.insert(topic.into(), index.into());
        self
    }

    /// Embedded key wins over the synthetic id; the direct key is the fallback.
    pub fn id_mode_for(&self, topic: &str) -> IdMode {
        if self.json_key {
            IdMode::EmbeddedKey
        } else if self.key_ignore || self.topic_key_ignore.contains(topic) {
            IdMode::Synthetic
        } else {
            IdMode::DirectKey
        }
    }

    pub fn rewrite_schema_for(&self, topic: &str) -> bool {
        !(self.schema_ignore || self.topic_schema_ignore.contains(topic))
    }

    pub fn index_for(&self, topic: &str) -> String {
        self.topic_index_map
            .get(topic)
            .cloned()
            .unwrap_or_else(|| topic.to_lowercase())
    }
}

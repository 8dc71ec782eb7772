//! Command-line interface for es-sink
//!
//! # Usage Examples
//!
//! ```bash
//! # Convert a record dump, ids from record keys
//! es-sink convert --input records.jsonl --output documents.jsonl
//!
//! # Synthetic ids for one topic, custom index for another, skip bad records
//! es-sink convert --input records.jsonl \
//!   --topic-key-ignore clicks \
//!   --topic-index-map orders:orders-v2 \
//!   --on-error skip
//!
//! # Keys are {"uuid", "index"} objects
//! es-sink convert --input events.jsonl --json-key
//! ```
//!
//! Logging is controlled with `RUST_LOG` and goes to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use es_sink::{convert_jsonl, ConverterOpts, DataConverter, OnError};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "es-sink")]
#[command(about = "Convert typed topic records into Elasticsearch documents")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a JSON Lines dump of records into indexable documents
    Convert {
        /// Input file (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// What to do with records that fail to convert
        #[arg(long, value_enum, default_value_t = OnError::Fail)]
        on_error: OnError,

        #[command(flatten)]
        opts: ConverterOpts,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            on_error,
            opts,
        } => {
            let reader: Box<dyn BufRead> = match &input {
                Some(path) => Box::new(BufReader::new(
                    File::open(path).with_context(|| format!("Failed to open {path:?}"))?,
                )),
                None => Box::new(io::stdin().lock()),
            };
            let writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path).with_context(|| format!("Failed to create {path:?}"))?,
                )),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };

            let converter = DataConverter::new(opts.json_converter());
            let settings = opts.settings();
            tracing::info!(
                type_name = %settings.type_name,
                json_key = settings.json_key,
                key_ignore = settings.key_ignore,
                schema_ignore = settings.schema_ignore,
                "Starting conversion"
            );

            convert_jsonl(reader, writer, &converter, &settings, on_error)?;
        }
    }

    Ok(())
}

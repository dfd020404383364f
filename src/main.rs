//! Command-line interface for datagen
//!
//! # Usage Examples
//!
//! ## Produce
//! ```bash
//! # Stream 1M Avro records of a table to Kafka
//! datagen produce \
//!   --table stock_trans.yaml \
//!   --kafka-brokers localhost:9092 \
//!   --schema-registry-url http://localhost:8081 \
//!   --max-records 1000000
//!
//! # JSON records, incremental values, one row every 10ms for a minute
//! datagen produce --table stock_trans.yaml --format json --fixed \
//!   --row-pause-millis 10 --max-duration-secs 60
//! ```
//!
//! ## Inspect
//! ```bash
//! # Canonical column description (used to decide whether data can be reused)
//! datagen describe --table stock_trans.yaml
//!
//! # Schema that would be registered for a format
//! datagen schema --table stock_trans.yaml --format protobuf
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use datagen_generator::{ColumnSet, TableDefinition};
use datagen_kafka::encoder;
use datagen_kafka::{
    LoggingMetricsSink, MetricsSink, ProduceArgs, RecordFormat, TableProducer, DEFAULT_ROW_COUNT,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "datagen")]
#[command(about = "Generate deterministic benchmark tables and stream them to Kafka")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream generated rows of a table to its Kafka topic
    Produce {
        /// Path to table definition YAML file
        #[arg(long, short = 't')]
        table: PathBuf,

        #[command(flatten)]
        args: ProduceArgs,
    },

    /// Print the canonical column description of a table
    Describe {
        /// Path to table definition YAML file
        #[arg(long, short = 't')]
        table: PathBuf,

        /// Describe with incremental values
        #[arg(long)]
        fixed: bool,
    },

    /// Print the record schema for a format
    Schema {
        /// Path to table definition YAML file
        #[arg(long, short = 't')]
        table: PathBuf,

        /// Record serialization format
        #[arg(long, value_enum, default_value = "avro")]
        format: RecordFormat,

        /// Topic the schema is named after (defaults to the table name)
        #[arg(long)]
        topic: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Produce { table, args } => run_produce(&table, args).await,
        Commands::Describe { table, fixed } => {
            let (_, columns) = load_table(&table, fixed)?;
            print!("{}", columns.describe());
            Ok(())
        }
        Commands::Schema {
            table,
            format,
            topic,
        } => {
            let (definition, columns) = load_table(&table, false)?;
            let topic = topic.unwrap_or(definition.name);
            let schema = match format {
                RecordFormat::Avro => encoder::avro::schema_for(&topic, &columns),
                RecordFormat::Json => encoder::json::type_spec(&columns),
                RecordFormat::Protobuf => encoder::proto::schema_for(&topic, &columns),
            };
            println!("{schema}");
            Ok(())
        }
    }
}

fn load_table(path: &Path, fixed: bool) -> anyhow::Result<(TableDefinition, ColumnSet)> {
    let definition = TableDefinition::from_file(path)
        .with_context(|| format!("Failed to load table definition from {path:?}"))?;
    let mut columns = definition
        .to_column_set()
        .with_context(|| format!("Invalid columns in table '{}'", definition.name))?;
    if fixed {
        columns.fixed();
    }
    Ok((definition, columns))
}

async fn run_produce(table: &Path, args: ProduceArgs) -> anyhow::Result<()> {
    let (definition, columns) = load_table(table, args.fixed)?;
    let record_count = columns.row_count(args.max_records, DEFAULT_ROW_COUNT);
    let config = args.producer_config(&definition.name);

    info!(
        "Producing table '{}' to topic '{}' as {} ({} records, {}ms pause)",
        definition.name, config.topic, args.format, record_count, args.row_pause_millis
    );

    let producer = TableProducer::connect(args.format, config, columns)
        .await
        .with_context(|| format!("Failed to prepare producer for '{}'", definition.name))?;

    let future = producer.produce(args.row_pause_millis, record_count, args.max_duration_secs)?;
    let timeout = args.completion_timeout();
    let outcome = tokio::task::spawn_blocking(move || future.wait(timeout))
        .await
        .context("Production wait task failed")?;

    producer.close().context("Failed to close producer")?;
    let metrics = outcome.with_context(|| format!("Production to '{}' failed", producer.topic()))?;

    LoggingMetricsSink.record(&metrics);
    println!("{}", serde_json::to_string(&metrics)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_produce() {
        let cli = Cli::try_parse_from([
            "datagen",
            "produce",
            "--table",
            "stock_trans.yaml",
            "--kafka-brokers",
            "localhost:9092",
            "--format",
            "json",
            "--max-records",
            "250",
        ])
        .unwrap();

        match cli.command {
            Commands::Produce { table, args } => {
                assert_eq!(table, PathBuf::from("stock_trans.yaml"));
                assert_eq!(args.format, RecordFormat::Json);
                assert_eq!(args.max_records, 250);
            }
            _ => panic!("expected produce"),
        }
    }

    #[test]
    fn test_parse_schema_defaults() {
        let cli = Cli::try_parse_from(["datagen", "schema", "-t", "t.yaml"]).unwrap();
        match cli.command {
            Commands::Schema { format, topic, .. } => {
                assert_eq!(format, RecordFormat::Avro);
                assert!(topic.is_none());
            }
            _ => panic!("expected schema"),
        }
    }
}

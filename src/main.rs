//! # convtree CLI
//!
//! Command-line interface for the convtree library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing::{debug, info};

use convtree::ConvtreeError;
use convtree::cli::Args;
use convtree::config::{FieldSchema, TreeConfig};
use convtree::core::aggregate::aggregate;
use convtree::core::filter::{TextFilter, filter_records};
use convtree::core::processor::process_forest;
use convtree::document::{read_forest, read_records, write_forest};
use convtree::format::{OutputFormat, write_to_format};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_logging(&args.log_level, args.quiet);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Initialize the tracing subscriber; `RUST_LOG` overrides `--log-level`.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), ConvtreeError> {
    let total_start = Instant::now();
    let config = build_config(args)?;
    let output_path = args.output_path();

    info!(
        input = %args.input,
        output = output_path,
        format = %args.format,
        policy = %config.flatten_policy,
        fields = config.schema.len(),
        "convtree v{}",
        env!("CARGO_PKG_VERSION")
    );

    if args.filter_only {
        if !args.wants_filter() {
            return Err(ConvtreeError::invalid_config(
                "--filter-only needs --filter-terms or --strip-urls",
            ));
        }
        let records = read_records(&args.input)?;
        let total = records.len();
        let records = filter_records(records, &args.text_field, &build_filter(args)?, args.chunks);
        write_to_format(&records, output_path, args.format.into())?;
        info!(records = total, elapsed = ?total_start.elapsed(), "filtered records written");
        return Ok(());
    }

    let mut forest = read_forest(&args.input, &config)?;

    if args.aggregate_only {
        aggregate(&mut forest, &config.schema);
        write_forest(output_path, forest, &config)?;
        info!(elapsed = ?total_start.elapsed(), "aggregated trees written");
        return Ok(());
    }

    let (mut records, stats) = process_forest(forest, &config)?;

    if args.wants_filter() {
        records = filter_records(records, &args.text_field, &build_filter(args)?, args.chunks);
    }

    let format: OutputFormat = args.format.into();
    write_to_format(&records, output_path, format)?;

    debug!(retention = %format!("{:.1}%", stats.retention_ratio()), "retention");
    info!(
        roots = stats.roots,
        nodes = stats.total_nodes,
        records = stats.output_records,
        dropped = stats.dropped_nodes(),
        elapsed = ?total_start.elapsed(),
        "done"
    );
    Ok(())
}

fn build_filter(args: &Args) -> Result<TextFilter, ConvtreeError> {
    match &args.filter_terms {
        Some(path) => TextFilter::from_terms_file(path),
        None => TextFilter::urls_only(),
    }
}

fn build_config(args: &Args) -> Result<TreeConfig, ConvtreeError> {
    let schema = match &args.schema {
        Some(path) => FieldSchema::from_json_file(path)?,
        None => FieldSchema::oasst(),
    };

    let config = TreeConfig::new()
        .with_child_field(args.child_field.clone())
        .with_schema(schema)
        .with_flatten_policy(args.policy.into());
    config.validate()?;
    Ok(config)
}

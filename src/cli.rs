//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`OutputFormat`] - Output format options
//! - [`Policy`] - Flatten policy options
//!
//! The CLI-facing enums convert into their library counterparts in
//! [`crate::format`] and [`crate::config`].

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CHILD_FIELD, FlattenPolicy};

/// Aggregate metadata up conversation trees and flatten them into records.
#[derive(Parser, Debug, Clone)]
#[command(name = "convtree")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    convtree trees.json
    convtree trees.json -o flat.jsonl -f jsonl
    convtree trees.json -o flat.csv -f csv --policy full
    convtree trees.json --schema fields.json --child-field children
    convtree trees.json -o enriched.json --aggregate-only
    convtree trees.json -o clean.json --filter-terms regions.txt --text-field text
    convtree flat.jsonl -f jsonl --filter-only --strip-urls")]
pub struct Args {
    /// Path to the input JSON document (array of root messages)
    pub input: String,

    /// Path to output file (default: overwrite the input)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Which nodes to keep when flattening
    #[arg(long, value_enum, default_value = "shallow")]
    pub policy: Policy,

    /// Field holding a message's children
    #[arg(long, default_value = DEFAULT_CHILD_FIELD)]
    pub child_field: String,

    /// JSON file listing the recognized fields (default: built-in list)
    #[arg(long, value_name = "FILE")]
    pub schema: Option<String>,

    /// Only aggregate fields; write the trees back without flattening
    #[arg(
        long,
        conflicts_with_all = ["format", "policy", "filter_terms", "strip_urls", "text_field", "chunks", "filter_only"]
    )]
    pub aggregate_only: bool,

    /// Input is already flat (JSON array or JSONL); only run the text filter
    #[arg(long, conflicts_with_all = ["policy", "schema", "child_field"])]
    pub filter_only: bool,

    /// File with terms to strip from the text field, one per line
    #[arg(long, value_name = "FILE")]
    pub filter_terms: Option<String>,

    /// Strip URLs from the text field (implied by --filter-terms)
    #[arg(long)]
    pub strip_urls: bool,

    /// Field the text filter applies to
    #[arg(long, default_value = "text")]
    pub text_field: String,

    /// Number of chunks (threads) used by the text filter
    #[arg(long, default_value_t = default_chunks())]
    pub chunks: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// The output path, falling back to the input path.
    pub fn output_path(&self) -> &str {
        self.output.as_deref().unwrap_or(&self.input)
    }

    /// Returns `true` if any text filtering was requested.
    pub fn wants_filter(&self) -> bool {
        self.filter_terms.is_some() || self.strip_urls
    }
}

fn default_chunks() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON array of records (default, same shape as the input)
    #[default]
    Json,

    /// JSON Lines - one JSON object per line
    #[value(alias = "ndjson")]
    Jsonl,

    /// CSV with semicolon delimiter
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::format::OutputFormat::from(*self).fmt(f)
    }
}

impl From<OutputFormat> for crate::format::OutputFormat {
    fn from(format: OutputFormat) -> crate::format::OutputFormat {
        match format {
            OutputFormat::Json => crate::format::OutputFormat::Json,
            OutputFormat::Jsonl => crate::format::OutputFormat::Jsonl,
            OutputFormat::Csv => crate::format::OutputFormat::Csv,
        }
    }
}

/// Flatten policy options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// First-level replies of each root only (compatible with existing datasets)
    #[default]
    Shallow,

    /// Every message at every depth, in pre-order
    Full,
}

impl From<Policy> for FlattenPolicy {
    fn from(policy: Policy) -> FlattenPolicy {
        match policy {
            Policy::Shallow => FlattenPolicy::Shallow,
            Policy::Full => FlattenPolicy::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["convtree", "trees.json"]);
        assert_eq!(args.output_path(), "trees.json");
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.policy, Policy::Shallow);
        assert_eq!(args.child_field, "replies");
        assert!(!args.wants_filter());
        assert!(args.chunks >= 1);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from([
            "convtree",
            "in.json",
            "-o",
            "out.csv",
            "-f",
            "csv",
            "--policy",
            "full",
            "--child-field",
            "children",
            "--filter-terms",
            "terms.txt",
            "--chunks",
            "4",
            "-q",
        ]);
        assert_eq!(args.output_path(), "out.csv");
        assert_eq!(args.format, OutputFormat::Csv);
        assert_eq!(FlattenPolicy::from(args.policy), FlattenPolicy::Full);
        assert_eq!(args.child_field, "children");
        assert!(args.wants_filter());
        assert_eq!(args.chunks, 4);
        assert!(args.quiet);
    }

    #[test]
    fn test_aggregate_only_conflicts() {
        for extra in [
            &["-f", "csv"][..],
            &["--policy", "full"],
            &["--filter-terms", "terms.txt"],
            &["--strip-urls"],
            &["--filter-only"],
        ] {
            let argv = ["convtree", "in.json", "--aggregate-only"].iter().chain(extra).copied();
            let err = Args::try_parse_from(argv).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
        }

        let args = Args::try_parse_from([
            "convtree",
            "in.json",
            "--aggregate-only",
            "--schema",
            "fields.json",
            "--child-field",
            "children",
        ])
        .unwrap();
        assert!(args.aggregate_only);
    }

    #[test]
    fn test_filter_only() {
        let args =
            Args::parse_from(["convtree", "flat.jsonl", "--filter-only", "--strip-urls", "-f", "jsonl"]);
        assert!(args.filter_only);
        assert!(args.wants_filter());

        let err = Args::try_parse_from(["convtree", "flat.json", "--filter-only", "--policy", "full"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_format_alias() {
        let args = Args::parse_from(["convtree", "in.json", "-f", "ndjson"]);
        assert_eq!(args.format, OutputFormat::Jsonl);
    }

    #[test]
    fn test_format_conversion() {
        assert_eq!(
            crate::format::OutputFormat::from(OutputFormat::Csv),
            crate::format::OutputFormat::Csv
        );
        assert_eq!(OutputFormat::Jsonl.to_string(), "JSONL");
    }
}

//! Output format types for the convtree library.
//!
//! These types don't depend on any CLI framework and can be used directly
//! from library code.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn example() -> convtree::Result<()> {
//! use convtree::format::{OutputFormat, write_to_format};
//! use convtree::MessageNode;
//!
//! let records = vec![MessageNode::new().with_field("text", "Hello!")];
//!
//! write_to_format(&records, "output.csv", OutputFormat::Csv)?;
//!
//! let format = OutputFormat::from_path("output.jsonl")?;
//! assert_eq!(format, OutputFormat::Jsonl);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConvtreeError, Result};
use crate::node::MessageNode;

/// Output format for flattened records.
///
/// - [`Json`](OutputFormat::Json) - pretty JSON array, same shape as the input document
/// - [`Jsonl`](OutputFormat::Jsonl) - one JSON object per line, ideal for ML pipelines
/// - [`Csv`](OutputFormat::Csv) - semicolon-delimited table
///
/// # Example
///
/// ```rust
/// use convtree::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("ndjson").unwrap();
/// assert_eq!(format, OutputFormat::Jsonl);
/// assert_eq!(format.extension(), "jsonl");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// JSON array of records (default)
    #[default]
    Json,

    /// JSON Lines - one JSON object per line
    Jsonl,

    /// CSV with semicolon delimiter
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
            OutputFormat::Csv => "csv",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["json", "jsonl", "ndjson", "csv"]
    }

    /// Detects format from a file path based on extension.
    ///
    /// ```rust
    /// use convtree::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::from_path("flat.csv").unwrap(), OutputFormat::Csv);
    /// assert!(OutputFormat::from_path("flat.xlsx").is_err());
    /// ```
    pub fn from_path(path: &str) -> Result<Self> {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
        ext.parse()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConvtreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(ConvtreeError::unsupported_format(s, OutputFormat::all_names())),
        }
    }
}

/// Writes records to a file in the given format.
///
/// Formats whose cargo feature is disabled report
/// [`ConvtreeError::UnsupportedFormat`].
pub fn write_to_format(records: &[MessageNode], path: &str, format: OutputFormat) -> Result<()> {
    match format {
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::core::output::write_json(records, path),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::core::output::write_jsonl(records, path),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_csv(records, path),
        #[allow(unreachable_patterns)]
        other => Err(ConvtreeError::unsupported_format(
            other.extension(),
            &enabled_names(),
        )),
    }
}

/// Converts records to a string in the given format.
pub fn to_format_string(records: &[MessageNode], format: OutputFormat) -> Result<String> {
    match format {
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::core::output::to_json(records),
        #[cfg(feature = "json-output")]
        OutputFormat::Jsonl => crate::core::output::to_jsonl(records),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::to_csv(records),
        #[allow(unreachable_patterns)]
        other => Err(ConvtreeError::unsupported_format(
            other.extension(),
            &enabled_names(),
        )),
    }
}

fn enabled_names() -> Vec<&'static str> {
    let mut names = Vec::new();
    if cfg!(feature = "json-output") {
        names.extend(["json", "jsonl"]);
    }
    if cfg!(feature = "csv-output") {
        names.push("csv");
    }
    names
}

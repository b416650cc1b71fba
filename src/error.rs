//! Unified error types for convtree.
//!
//! This module provides a single [`ConvtreeError`] enum that covers all error
//! cases in the library, from reading the persisted document to writing the
//! flattened records.
//!
//! # Error Handling Philosophy
//!
//! - **Malformed documents** are fatal: nothing is partially processed
//! - **Structural problems** (a reply that is not an object) are reported with
//!   a JSON-pointer path before any pass runs
//! - **Missing fields** are never errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for convtree operations.
///
/// # Example
///
/// ```rust
/// use convtree::error::Result;
/// use convtree::MessageNode;
///
/// fn load() -> Result<Vec<MessageNode>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ConvtreeError>;

/// The error type for all convtree operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvtreeError {
    /// An I/O error occurred while reading or writing a document.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input document could not be parsed as JSON.
    #[error("Failed to parse document{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// The document parsed, but does not describe a forest of message nodes.
    ///
    /// `path` is a JSON pointer to the offending value (e.g. `/0/replies/2`).
    #[error("Invalid tree structure at '{path}': {message}")]
    Structure {
        /// JSON pointer to the offending value
        path: String,
        /// Description of what's wrong
        message: String,
    },

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested output format is not known.
    #[error("Unsupported format '{input}'. Expected one of: {expected}")]
    UnsupportedFormat {
        /// What was asked for
        input: String,
        /// Comma-separated list of supported names
        expected: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A filter pattern failed to compile.
    #[cfg(feature = "text-filter")]
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// An XML feed could not be parsed.
    #[cfg(feature = "extract")]
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ConvtreeError {
    /// Creates a parse error for a document.
    pub fn parse(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        ConvtreeError::Parse { source, path }
    }

    /// Creates a structural validation error.
    pub fn structure(path: impl Into<String>, message: impl Into<String>) -> Self {
        ConvtreeError::Structure {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ConvtreeError::InvalidConfig(message.into())
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(input: impl Into<String>, expected: &[&str]) -> Self {
        ConvtreeError::UnsupportedFormat {
            input: input.into(),
            expected: expected.join(", "),
        }
    }
}

// ============================================================================
// Error classification
// ============================================================================

impl ConvtreeError {
    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, ConvtreeError::Io(_))
    }

    /// Returns `true` if this is a document parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, ConvtreeError::Parse { .. })
    }

    /// Returns `true` if this is a structural validation error.
    pub fn is_structure(&self) -> bool {
        matches!(self, ConvtreeError::Structure { .. })
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, ConvtreeError::InvalidConfig(_))
    }

    /// Returns the file path associated with this error, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ConvtreeError::Parse { path, .. } => path.as_deref(),
            _ => None,
        }
    }
}

//! Core processing logic for convtree.
//!
//! This module contains:
//! - [`aggregate`] - upward propagation of recognized fields
//! - [`flatten`] - detaching trees into flat records
//! - [`filter`] - regex cleanup of a text field (requires `text-filter`)
//! - [`extract`] - CSS-selector text extraction from HTML/XML feeds (requires `extract`)
//! - [`processor`] - the aggregate-then-flatten pipeline and statistics
//! - [`output`] - format writers (CSV, JSON, JSONL)
//!
//! # Quick Start
//!
//! ```rust
//! use convtree::core::{aggregate, flatten};
//! use convtree::config::{FieldSchema, FlattenPolicy};
//! use convtree::MessageNode;
//!
//! let mut forest = vec![MessageNode::new().with_replies(vec![
//!     MessageNode::new().with_field("lang", "ko"),
//! ])];
//!
//! aggregate(&mut forest, &FieldSchema::oasst());
//! let records = flatten(forest, FlattenPolicy::Shallow);
//! assert_eq!(records.len(), 1);
//! ```

pub mod aggregate;
#[cfg(feature = "extract")]
pub mod extract;
#[cfg(feature = "text-filter")]
pub mod filter;
pub mod flatten;
pub mod output;
pub mod processor;

// Re-export main functions for convenience
pub use aggregate::{FieldSet, aggregate, merge_fields, subtree_fields};
#[cfg(feature = "extract")]
pub use extract::{HtmlExtractor, extract_items, extract_texts_from_html, parse_and_extract_from_xml};
#[cfg(feature = "text-filter")]
pub use filter::{TextFilter, filter_records};
pub use flatten::{flatten, strip};
pub use processor::{ConversionStats, convert_tree_to_flat, process_forest};

// Conditionally re-export output writers
#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, to_jsonl, write_json, write_jsonl};

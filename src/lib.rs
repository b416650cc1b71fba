//! # convtree
//!
//! A Rust library for reshaping conversation-tree exports (messages whose
//! replies nest inside them) into flat records for tabular and ML use.
//!
//! ## Overview
//!
//! Conversion runs in two passes over an in-memory forest:
//!
//! 1. **Aggregation** - every node receives the recognized metadata fields
//!    (language, rank, review counts, ...) found anywhere in its subtree.
//!    Arrays are concatenated in child order; scalars take the last child's
//!    value.
//! 2. **Flattening** - child lists are removed and nodes are laid out in a
//!    single sequence. The default *shallow* policy keeps only the direct
//!    replies of each root; the *full* policy keeps every node.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use convtree::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = TreeConfig::new();
//!     let stats = convert_tree_to_flat("trees.json", "flat.jsonl", OutputFormat::Jsonl, &config)?;
//!     println!("{} records written", stats.output_records);
//!     Ok(())
//! }
//! ```
//!
//! ## In Memory
//!
//! ```rust
//! use convtree::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> convtree::Result<()> {
//! let doc = json!([{"id": 1, "replies": [{"id": 2, "replies": [{"id": 3, "lang": "ko"}]}]}]);
//! let forest = forest_from_value(doc, "replies")?;
//!
//! let (records, stats) = process_forest(forest, &TreeConfig::new())?;
//! assert_eq!(records[0].to_record(), json!({"id": 2, "lang": "ko"}));
//! assert_eq!(stats.dropped_nodes(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`node`] - [`MessageNode`], [`Forest`] and structural validation
//! - [`config`] - [`FieldSchema`](config::FieldSchema), [`FlattenPolicy`](config::FlattenPolicy), [`TreeConfig`](config::TreeConfig)
//! - [`core`] - aggregation, flattening, text filtering, feed extraction, writers
//! - [`document`] - reading and writing JSON documents
//! - [`format`] - [`OutputFormat`](format::OutputFormat) and [`write_to_format`](format::write_to_format)
//! - [`error`] - [`ConvtreeError`], [`Result`]
//! - [`prelude`] - convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod document;
pub mod error;
pub mod format;
pub mod node;

// Re-export the main types at the crate root for convenience
pub use error::{ConvtreeError, Result};
pub use node::{Forest, MessageNode};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use convtree::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{Forest, MessageNode};

    pub use crate::error::{ConvtreeError, Result};

    pub use crate::config::{FieldSchema, FlattenPolicy, TreeConfig};

    pub use crate::node::{forest_from_value, forest_into_value};

    pub use crate::core::aggregate::aggregate;
    pub use crate::core::flatten::flatten;
    pub use crate::core::processor::{ConversionStats, convert_tree_to_flat, process_forest};

    #[cfg(feature = "text-filter")]
    pub use crate::core::filter::{TextFilter, filter_records};

    #[cfg(feature = "extract")]
    pub use crate::core::extract::{
        HtmlExtractor, extract_items, extract_texts_from_html, parse_and_extract_from_xml,
    };

    pub use crate::document::{read_forest, read_records, write_forest};
    pub use crate::format::{OutputFormat, write_to_format};
}

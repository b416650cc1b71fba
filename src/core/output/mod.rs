//! Writers for flattened records.
//!
//! This module provides writers for different output formats:
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - pretty JSON array of records - requires `json-output` feature
//! - [`write_jsonl`] / [`to_jsonl`] - JSON Lines, one record per line - requires `json-output` feature
//!
//! Only a record's fields are written; a child list, if one is still
//! attached, is ignored.
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(all(feature = "csv-output", feature = "json-output"))]
//! # fn main() -> convtree::Result<()> {
//! use convtree::core::output::{write_csv, write_jsonl, to_json};
//! use convtree::MessageNode;
//!
//! let records = vec![
//!     MessageNode::new().with_field("text", "Hello!").with_field("lang", "en"),
//!     MessageNode::new().with_field("text", "안녕").with_field("lang", "ko"),
//! ];
//!
//! write_csv(&records, "output.csv")?;
//! write_jsonl(&records, "output.jsonl")?;
//! let json = to_json(&records)?;
//! # Ok(())
//! # }
//! # #[cfg(not(all(feature = "csv-output", feature = "json-output")))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;
#[cfg(feature = "json-output")]
mod jsonl_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};
#[cfg(feature = "json-output")]
pub use jsonl_writer::{to_jsonl, write_jsonl};

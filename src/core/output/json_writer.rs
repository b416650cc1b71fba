//! JSON output writer.

use std::fs::File;
use std::io::Write;

use serde_json::{Map, Value};

use crate::document::to_pretty_json;
use crate::error::Result;
use crate::node::MessageNode;

/// Writes records to a JSON file as an array.
///
/// # Format
/// ```json
/// [
///     {
///         "message_id": "a1",
///         "lang": "ko"
///     }
/// ]
/// ```
///
/// Indented with four spaces; non-ASCII text is written as-is.
pub fn write_json(records: &[MessageNode], output_path: &str) -> Result<()> {
    let json = to_json(records)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Converts records to a JSON array string.
///
/// Same format as `write_json`, but returns a String instead of writing to file.
pub fn to_json(records: &[MessageNode]) -> Result<String> {
    let fields: Vec<&Map<String, Value>> = records.iter().map(|r| &r.fields).collect();
    to_pretty_json(&fields)
}

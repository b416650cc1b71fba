//! JSON Lines (JSONL) output writer.
//!
//! JSONL format is ideal for:
//! - Machine learning pipelines
//! - Streaming processing
//! - Large datasets that don't fit in memory

use std::fs::File;
use std::io::{BufWriter, Write};

use crate::error::Result;
use crate::node::MessageNode;

/// Writes records to JSONL (JSON Lines) format.
///
/// Each line is a valid JSON object:
/// ```jsonl
/// {"message_id":"a1","lang":"ko"}
/// {"message_id":"a2","lang":"en"}
/// ```
pub fn write_jsonl(records: &[MessageNode], output_path: &str) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);

    for record in records {
        serde_json::to_writer(&mut writer, &record.fields)?;
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// Converts records to a JSONL string.
pub fn to_jsonl(records: &[MessageNode]) -> Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(&record.fields)?);
        out.push('\n');
    }
    Ok(out)
}

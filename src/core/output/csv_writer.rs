//! CSV output writer.

use std::io::Write;

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::node::MessageNode;

/// Writes records to CSV with semicolon delimiter.
///
/// # Format
/// - Delimiter: `;`
/// - Columns: every field name seen across the records, in first-seen order
/// - Cells: strings as-is, `null` and missing fields empty, anything else
///   (numbers, booleans, arrays, objects) as compact JSON
/// - Encoding: UTF-8
///
/// Records without any field have no columns to write. When every record is
/// fieldless the output is empty (no header, no rows) and a warning is logged
/// with the number of records that were dropped.
pub fn write_csv(records: &[MessageNode], output_path: &str) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_csv_to(records, file)
}

/// Converts records to a CSV string.
pub fn to_csv(records: &[MessageNode]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv_to(records, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

fn write_csv_to<W: Write>(records: &[MessageNode], sink: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(sink);

    let header = build_header(records);
    if header.is_empty() {
        if !records.is_empty() {
            warn!(records = records.len(), "records have no fields; CSV output is empty");
        }
        writer.flush()?;
        return Ok(());
    }
    writer.write_record(&header)?;

    for record in records {
        writer.write_record(build_record(record, &header))?;
    }

    writer.flush()?;
    Ok(())
}

/// Union of field names in first-seen order.
fn build_header(records: &[MessageNode]) -> Vec<&str> {
    let mut header: Vec<&str> = Vec::new();
    for record in records {
        for key in record.fields.keys() {
            if !header.contains(&key.as_str()) {
                header.push(key);
            }
        }
    }
    header
}

fn build_record(record: &MessageNode, header: &[&str]) -> Vec<String> {
    header
        .iter()
        .map(|key| record.get(key).map(cell).unwrap_or_default())
        .collect()
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

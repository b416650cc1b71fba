//! Reading and writing persisted conversation documents.
//!
//! A document is a JSON array of root messages, each optionally holding its
//! children under the configured child-list field. Reading validates the whole
//! forest before returning, so a malformed reply anywhere aborts the load.
//!
//! Parsing has no nesting limit: the JSON reader grows its stack on demand and
//! the conversion into nodes is iterative, so chains thousands of replies deep
//! load like any other document.
//!
//! Already-flat record files (a JSON array or JSONL) are read with
//! [`read_records`].

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{info, warn};

use crate::config::TreeConfig;
use crate::error::{ConvtreeError, Result};
use crate::node::{Forest, MessageNode, forest_from_value, forest_into_value, forest_len};

/// Reads and validates a forest from a JSON file.
pub fn read_forest(path: impl AsRef<Path>, config: &TreeConfig) -> Result<Forest> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let forest = parse_forest(&content, config).map_err(|e| match e {
        ConvtreeError::Parse { source, path: None } => {
            ConvtreeError::parse(source, Some(path.to_path_buf()))
        }
        other => other,
    })?;

    if forest.is_empty() {
        warn!(path = %path.display(), "document contains no messages");
    }
    info!(
        path = %path.display(),
        roots = forest.len(),
        nodes = forest_len(&forest),
        "loaded conversation forest"
    );
    Ok(forest)
}

/// Parses and validates a forest from a JSON string.
pub fn parse_forest(content: &str, config: &TreeConfig) -> Result<Forest> {
    let value = parse_unbounded(content).map_err(|e| ConvtreeError::parse(e, None))?;
    forest_from_value(value, &config.child_field)
}

fn parse_unbounded(content: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(content);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// Reads flat records from a JSON array or a JSONL file.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<MessageNode>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let records = parse_records(&content).map_err(|e| match e {
        ConvtreeError::Parse { source, path: None } => {
            ConvtreeError::parse(source, Some(path.to_path_buf()))
        }
        other => other,
    })?;

    info!(path = %path.display(), records = records.len(), "loaded flat records");
    Ok(records)
}

/// Parses flat records.
///
/// Content starting with `[` is a JSON array of objects; anything else is
/// JSONL with one object per non-blank line. Records are taken as they are:
/// no field is treated as a child list.
pub fn parse_records(content: &str) -> Result<Vec<MessageNode>> {
    let values = if content.trim_start().starts_with('[') {
        match parse_unbounded(content).map_err(|e| ConvtreeError::parse(e, None))? {
            Value::Array(values) => values,
            _ => return Err(ConvtreeError::structure("/", "expected an array of records")),
        }
    } else {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| ConvtreeError::parse(e, None)))
            .collect::<Result<Vec<Value>>>()?
    };

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::Object(fields) => Ok(MessageNode {
                fields,
                replies: None,
            }),
            _ => Err(ConvtreeError::structure(
                format!("/{i}"),
                "expected a record object",
            )),
        })
        .collect()
}

/// Writes a forest (child lists included) as pretty JSON.
pub fn write_forest(path: impl AsRef<Path>, forest: Forest, config: &TreeConfig) -> Result<()> {
    let path = path.as_ref();
    let value = forest_into_value(forest, &config.child_field);
    fs::write(path, to_pretty_json(&value)?)?;
    info!(path = %path.display(), "wrote conversation forest");
    Ok(())
}

/// Serializes with a four-space indent, leaving non-ASCII text unescaped.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

//! The tree-to-flat conversion pipeline.
//!
//! Aggregation runs first, so every node carries a summary of its subtree's
//! recognized fields; flattening then detaches the trees. [`process_forest`]
//! works in memory, [`convert_tree_to_flat`] reads and writes files.

use std::path::Path;

use tracing::info;

use crate::config::TreeConfig;
use crate::core::aggregate::aggregate;
use crate::core::flatten::flatten;
use crate::document::read_forest;
use crate::error::Result;
use crate::format::{OutputFormat, write_to_format};
use crate::node::{Forest, MessageNode, forest_len};

/// Statistics about a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Root messages in the input.
    pub roots: usize,
    /// Nodes at every depth in the input.
    pub total_nodes: usize,
    /// Records in the flattened output.
    pub output_records: usize,
}

impl ConversionStats {
    /// Creates stats from counts.
    pub fn new(roots: usize, total_nodes: usize, output_records: usize) -> Self {
        Self {
            roots,
            total_nodes,
            output_records,
        }
    }

    /// Nodes that did not make it into the output.
    pub fn dropped_nodes(&self) -> usize {
        self.total_nodes.saturating_sub(self.output_records)
    }

    /// Percentage of input nodes present in the output (0.0 - 100.0).
    pub fn retention_ratio(&self) -> f64 {
        if self.total_nodes == 0 {
            return 0.0;
        }
        (self.output_records as f64 / self.total_nodes as f64) * 100.0
    }
}

/// Aggregates and flattens an in-memory forest.
pub fn process_forest(mut forest: Forest, config: &TreeConfig) -> Result<(Vec<MessageNode>, ConversionStats)> {
    config.validate()?;

    let roots = forest.len();
    let total_nodes = forest_len(&forest);

    aggregate(&mut forest, &config.schema);
    let records = flatten(forest, config.flatten_policy);

    let stats = ConversionStats::new(roots, total_nodes, records.len());
    Ok((records, stats))
}

/// Reads `input`, aggregates, flattens and writes the records to `output`.
///
/// `output` may be the same path as `input`; the file is then replaced by
/// the flattened records.
pub fn convert_tree_to_flat(
    input: impl AsRef<Path>,
    output: &str,
    format: OutputFormat,
    config: &TreeConfig,
) -> Result<ConversionStats> {
    config.validate()?;
    let forest = read_forest(input, config)?;
    let (records, stats) = process_forest(forest, config)?;

    write_to_format(&records, output, format)?;
    info!(
        output,
        %format,
        records = stats.output_records,
        dropped = stats.dropped_nodes(),
        "wrote flattened records"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldSchema, FlattenPolicy};
    use crate::node::forest_from_value;
    use serde_json::json;

    fn forest() -> Forest {
        forest_from_value(
            json!([{"id": 1, "replies": [
                {"id": 2, "replies": [{"id": 3, "lang": "ko", "emojis": ["+1"]}]},
                {"id": 4, "emojis": ["red_flag"]}
            ]}]),
            "replies",
        )
        .unwrap()
    }

    #[test]
    fn test_process_forest_shallow() {
        let (records, stats) = process_forest(forest(), &TreeConfig::new()).unwrap();

        assert_eq!(stats, ConversionStats::new(1, 4, 2));
        assert_eq!(stats.dropped_nodes(), 2);
        assert_eq!(records[0].to_record(), json!({"id": 2, "lang": "ko", "emojis": ["+1"]}));
        assert_eq!(records[1].to_record(), json!({"id": 4, "emojis": ["red_flag"]}));
    }

    #[test]
    fn test_process_forest_full() {
        let config = TreeConfig::new().with_flatten_policy(FlattenPolicy::Full);
        let (records, stats) = process_forest(forest(), &config).unwrap();

        assert_eq!(stats.output_records, 4);
        assert_eq!(stats.dropped_nodes(), 0);
        assert_eq!(
            records[0].to_record(),
            json!({"id": 1, "lang": "ko", "emojis": ["+1", "red_flag"]})
        );
    }

    #[test]
    fn test_process_forest_rejects_bad_config() {
        let config = TreeConfig::new().with_schema(FieldSchema::new(Vec::<String>::new()));
        assert!(process_forest(forest(), &config).unwrap_err().is_invalid_config());
    }

    #[test]
    fn test_retention_ratio() {
        assert!((ConversionStats::new(1, 4, 2).retention_ratio() - 50.0).abs() < f64::EPSILON);
        assert!(ConversionStats::default().retention_ratio().abs() < f64::EPSILON);
    }
}

//! Upward propagation of recognized fields.
//!
//! Every node receives a summary of the recognized fields found anywhere
//! below it. Values merge by one rule, used both when folding children into
//! an accumulator and when writing the accumulator back onto a node:
//!
//! | existing | incoming | result |
//! |----------|----------|--------|
//! | absent | any | incoming |
//! | array | array | existing followed by incoming |
//! | anything else | any | incoming (last wins) |
//!
//! Children are folded in child-list order, so for scalar fields the last
//! child that defines the field wins.
//!
//! # Example
//!
//! ```
//! use convtree::config::FieldSchema;
//! use convtree::core::aggregate::aggregate;
//! use convtree::MessageNode;
//! use serde_json::json;
//!
//! let tree = MessageNode::new().with_field("id", 1).with_replies(vec![
//!     MessageNode::new().with_field("id", 2).with_replies(vec![
//!         MessageNode::new().with_field("id", 3).with_field("lang", "ko"),
//!     ]),
//! ]);
//!
//! let mut forest = vec![tree];
//! aggregate(&mut forest, &FieldSchema::new(["lang"]));
//!
//! assert_eq!(forest[0].get("lang"), Some(&json!("ko")));
//! ```
//!
//! # Re-running
//!
//! Aggregation is not idempotent for array fields: a second run extends each
//! ancestor's arrays again with its descendants' values.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::FieldSchema;
use crate::node::MessageNode;

/// Recognized field name to merged value.
pub type FieldSet = Map<String, Value>;

/// Merges `incoming` into `target` field by field.
///
/// Arrays on both sides are concatenated (`target` first), otherwise the
/// incoming value replaces whatever `target` held.
pub fn merge_fields(target: &mut FieldSet, incoming: FieldSet) {
    for (key, value) in incoming {
        match (target.get_mut(&key), value) {
            (Some(Value::Array(existing)), Value::Array(mut more)) => existing.append(&mut more),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// The recognized fields stored directly on `node`, in schema order.
pub fn own_fields(node: &MessageNode, schema: &FieldSchema) -> FieldSet {
    schema
        .iter()
        .filter_map(|name| node.get(name).map(|v| (name.to_string(), v.clone())))
        .collect()
}

/// The aggregate of a whole subtree: the node's own recognized fields, then
/// each child's subtree aggregate folded in child order.
pub fn subtree_fields(node: &MessageNode, schema: &FieldSchema) -> FieldSet {
    let (_, subtree) = accumulate(node, schema);
    subtree
}

/// Aggregates every tree of the forest in place.
///
/// No node is added or removed; only field sets change.
pub fn aggregate(forest: &mut [MessageNode], schema: &FieldSchema) {
    let mut enriched = 0;
    for root in forest.iter_mut() {
        enriched += aggregate_tree(root, schema);
    }
    debug!(roots = forest.len(), enriched, "aggregated recognized fields");
}

/// Aggregates a single tree in place, returning how many nodes gained or
/// changed recognized fields.
pub fn aggregate_tree(root: &mut MessageNode, schema: &FieldSchema) -> usize {
    let (below, _) = accumulate(root, schema);
    write_back(root, below)
}

struct Frame<'a> {
    node: &'a MessageNode,
    index: usize,
    next_child: usize,
    /// Values derived from descendants only.
    below: FieldSet,
    /// Own values followed by descendants' values.
    subtree: FieldSet,
}

impl<'a> Frame<'a> {
    fn new(node: &'a MessageNode, index: usize, schema: &FieldSchema) -> Self {
        Self {
            node,
            index,
            next_child: 0,
            below: FieldSet::new(),
            subtree: own_fields(node, schema),
        }
    }
}

/// Post-order pass over an immutable tree.
///
/// Returns the descendant accumulator of every node, indexed in pre-order,
/// together with the root's subtree aggregate.
fn accumulate(root: &MessageNode, schema: &FieldSchema) -> (Vec<FieldSet>, FieldSet) {
    let mut below = vec![FieldSet::new()];
    let mut stack = vec![Frame::new(root, 0, schema)];
    let mut root_subtree = FieldSet::new();

    while let Some(top) = stack.last_mut() {
        let node = top.node;
        if let Some(child) = node.replies.as_deref().and_then(|r| r.get(top.next_child)) {
            top.next_child += 1;
            let index = below.len();
            below.push(FieldSet::new());
            stack.push(Frame::new(child, index, schema));
            continue;
        }

        let Some(done) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => {
                merge_fields(&mut parent.below, done.subtree.clone());
                merge_fields(&mut parent.subtree, done.subtree);
            }
            None => root_subtree = done.subtree,
        }
        below[done.index] = done.below;
    }

    (below, root_subtree)
}

/// Pre-order pass applying each node's accumulator.
fn write_back(root: &mut MessageNode, accumulators: Vec<FieldSet>) -> usize {
    let mut accumulators = accumulators.into_iter();
    let mut enriched = 0;
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        let Some(acc) = accumulators.next() else { break };
        if !acc.is_empty() {
            enriched += 1;
            merge_fields(&mut node.fields, acc);
        }
        if let Some(replies) = &mut node.replies {
            stack.extend(replies.iter_mut().rev());
        }
    }

    enriched
}

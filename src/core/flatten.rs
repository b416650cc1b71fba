//! Detaching trees into a flat sequence of records.
//!
//! Two policies are supported, see [`FlattenPolicy`]:
//!
//! - **Shallow** (default): only the first-level children of each root are
//!   emitted. Roots are dropped, and everything at depth two or deeper is
//!   stripped and discarded. Existing datasets were produced this way.
//! - **Full**: every node is emitted once, in pre-order.
//!
//! Either way no emitted node carries a child list.
//!
//! # Example
//!
//! ```
//! use convtree::config::FlattenPolicy;
//! use convtree::core::flatten::flatten;
//! use convtree::MessageNode;
//! use serde_json::json;
//!
//! let forest = vec![MessageNode::from_value(
//!     json!({"id": 1, "replies": [{"id": 2, "replies": [{"id": 3}]}]}),
//!     "replies",
//! )?];
//!
//! let flat = flatten(forest, FlattenPolicy::Shallow);
//! assert_eq!(flat.len(), 1);
//! assert_eq!(flat[0].get("id"), Some(&json!(2)));
//! assert!(!flat[0].has_replies());
//! # Ok::<(), convtree::ConvtreeError>(())
//! ```

use tracing::debug;

use crate::config::FlattenPolicy;
use crate::node::MessageNode;

/// Flattens a forest according to `policy`.
pub fn flatten(forest: Vec<MessageNode>, policy: FlattenPolicy) -> Vec<MessageNode> {
    let roots = forest.len();
    let flat = match policy {
        FlattenPolicy::Shallow => flatten_shallow(forest),
        FlattenPolicy::Full => flatten_full(forest),
    };
    debug!(roots, records = flat.len(), %policy, "flattened forest");
    flat
}

/// Emits the first-level children of each root, in root order then child
/// order. Roots and deeper descendants are discarded.
pub fn flatten_shallow(forest: Vec<MessageNode>) -> Vec<MessageNode> {
    let mut out = Vec::new();
    for mut root in forest {
        let Some(children) = root.replies.take() else {
            continue;
        };
        for mut child in children {
            if let Some(grandchildren) = child.replies.take() {
                for mut descendant in grandchildren {
                    strip(&mut descendant);
                }
            }
            out.push(child);
        }
    }
    out
}

/// Emits every node once, in pre-order, roots included.
pub fn flatten_full(forest: Vec<MessageNode>) -> Vec<MessageNode> {
    let mut out = Vec::new();
    let mut stack: Vec<MessageNode> = forest.into_iter().rev().collect();
    while let Some(mut node) = stack.pop() {
        if let Some(children) = node.replies.take() {
            stack.extend(children.into_iter().rev());
        }
        out.push(node);
    }
    out
}

/// Removes the child list from `node` and from every node below it.
///
/// The subtree is dismantled iteratively, so arbitrarily deep trees are
/// handled without recursion.
pub fn strip(node: &mut MessageNode) {
    let Some(children) = node.replies.take() else {
        return;
    };
    let mut stack = children;
    while let Some(mut next) = stack.pop() {
        if let Some(more) = next.replies.take() {
            stack.extend(more);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::forest_from_value;
    use serde_json::json;

    fn ids(nodes: &[MessageNode]) -> Vec<u64> {
        nodes
            .iter()
            .map(|n| n.get("id").and_then(|v| v.as_u64()).unwrap())
            .collect()
    }

    fn sample() -> Vec<MessageNode> {
        forest_from_value(
            json!([
                {"id": 1, "replies": [
                    {"id": 2, "replies": [{"id": 3}, {"id": 4, "replies": [{"id": 5}]}]},
                    {"id": 6}
                ]},
                {"id": 7},
                {"id": 8, "replies": [{"id": 9}]}
            ]),
            "replies",
        )
        .unwrap()
    }

    #[test]
    fn test_shallow_literal_contract() {
        let forest = forest_from_value(
            json!([{"id": 1, "replies": [{"id": 2, "replies": [{"id": 3}]}]}]),
            "replies",
        )
        .unwrap();

        let flat = flatten(forest, FlattenPolicy::Shallow);

        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].to_record(), json!({"id": 2}));
        assert!(!flat[0].has_replies());
    }

    #[test]
    fn test_shallow_order() {
        let flat = flatten(sample(), FlattenPolicy::Shallow);
        assert_eq!(ids(&flat), [2, 6, 9]);
        assert!(flat.iter().all(|n| !n.has_replies()));
    }

    #[test]
    fn test_full_preorder() {
        let flat = flatten(sample(), FlattenPolicy::Full);
        assert_eq!(ids(&flat), [1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(flat.iter().all(|n| !n.has_replies()));
    }

    #[test]
    fn test_roots_without_children_vanish_in_shallow() {
        let forest = vec![MessageNode::new().with_field("id", 1)];
        assert!(flatten(forest, FlattenPolicy::Shallow).is_empty());
    }

    #[test]
    fn test_empty_child_list_is_stripped() {
        let forest = vec![MessageNode::new()
            .with_field("id", 1)
            .with_replies(vec![MessageNode::new().with_field("id", 2).with_replies(vec![])])];

        let flat = flatten(forest, FlattenPolicy::Shallow);
        assert_eq!(flat.len(), 1);
        assert!(!flat[0].has_replies());
    }

    #[test]
    fn test_empty_forest() {
        assert!(flatten(Vec::new(), FlattenPolicy::Shallow).is_empty());
        assert!(flatten(Vec::new(), FlattenPolicy::Full).is_empty());
    }

    #[test]
    fn test_strip() {
        let mut forest = sample();
        let root = &mut forest[0];
        strip(root);
        assert!(!root.has_replies());
        assert_eq!(root.subtree_len(), 1);
    }

    #[test]
    fn test_fields_survive_flattening() {
        let forest = forest_from_value(
            json!([{"id": 1, "replies": [{"id": 2, "lang": "ko", "tags": ["a"]}]}]),
            "replies",
        )
        .unwrap();

        let flat = flatten(forest, FlattenPolicy::Shallow);
        assert_eq!(flat[0].to_record(), json!({"id": 2, "lang": "ko", "tags": ["a"]}));
    }
}

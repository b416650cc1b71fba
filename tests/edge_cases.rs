//! Edge case tests for convtree
//!
//! Boundary conditions of the merge rules and the flatten policies that are
//! easy to get wrong.

use convtree::MessageNode;
use convtree::config::{FieldSchema, FlattenPolicy, TreeConfig};
use convtree::core::aggregate::aggregate;
use convtree::core::flatten::flatten;
use convtree::core::processor::process_forest;
use convtree::node::forest_from_value;
use serde_json::json;

fn schema() -> FieldSchema {
    FieldSchema::new(["lang", "rank", "tags", "detoxify"])
}

// =========================================================================
// Merge rule corners
// =========================================================================

#[test]
fn test_array_then_scalar_sibling_overwrites() {
    let mut forest = forest_from_value(
        json!([{"id": 1, "replies": [{"tags": ["a"]}, {"tags": "b"}]}]),
        "replies",
    )
    .unwrap();

    aggregate(&mut forest, &schema());
    assert_eq!(forest[0].get("tags"), Some(&json!("b")));
}

#[test]
fn test_scalar_then_array_sibling_overwrites() {
    let mut forest = forest_from_value(
        json!([{"id": 1, "replies": [{"tags": "a"}, {"tags": ["b"]}]}]),
        "replies",
    )
    .unwrap();

    aggregate(&mut forest, &schema());
    assert_eq!(forest[0].get("tags"), Some(&json!(["b"])));
}

#[test]
fn test_own_array_replaced_by_descendant_scalar() {
    let mut forest = forest_from_value(
        json!([{"tags": ["own"], "replies": [{"tags": "child"}]}]),
        "replies",
    )
    .unwrap();

    aggregate(&mut forest, &schema());
    assert_eq!(forest[0].get("tags"), Some(&json!("child")));
}

#[test]
fn test_objects_are_scalars_for_merging() {
    let mut forest = forest_from_value(
        json!([{"detoxify": {"toxicity": 0.1}, "replies": [
            {"detoxify": {"toxicity": 0.5}},
            {"detoxify": {"insult": 0.2}}
        ]}]),
        "replies",
    )
    .unwrap();

    aggregate(&mut forest, &schema());
    assert_eq!(forest[0].get("detoxify"), Some(&json!({"insult": 0.2})));
}

#[test]
fn test_null_values_propagate() {
    let mut forest = forest_from_value(
        json!([{"lang": "en", "replies": [{"lang": null}]}]),
        "replies",
    )
    .unwrap();

    aggregate(&mut forest, &schema());
    assert_eq!(forest[0].get("lang"), Some(&json!(null)));
}

#[test]
fn test_empty_arrays_still_present() {
    let mut forest =
        forest_from_value(json!([{"replies": [{"tags": []}]}]), "replies").unwrap();

    aggregate(&mut forest, &schema());
    assert_eq!(forest[0].get("tags"), Some(&json!([])));
}

#[test]
fn test_independent_trees_do_not_mix() {
    let mut forest = forest_from_value(
        json!([
            {"id": 1, "replies": [{"lang": "ko"}]},
            {"id": 2, "replies": [{"rank": 3}]}
        ]),
        "replies",
    )
    .unwrap();

    aggregate(&mut forest, &schema());
    assert_eq!(forest[0].get("lang"), Some(&json!("ko")));
    assert!(forest[0].get("rank").is_none());
    assert_eq!(forest[1].get("rank"), Some(&json!(3)));
    assert!(forest[1].get("lang").is_none());
}

#[test]
fn test_wide_tree_order() {
    let replies: Vec<_> = (0..100)
        .map(|i| MessageNode::new().with_field("tags", json!([i])))
        .collect();
    let mut forest = vec![MessageNode::new().with_replies(replies)];

    aggregate(&mut forest, &schema());

    let expected: Vec<_> = (0..100).collect();
    assert_eq!(forest[0].get("tags"), Some(&json!(expected)));
}

// =========================================================================
// Unicode field names and values
// =========================================================================

#[test]
fn test_korean_field_names() {
    let mut forest = forest_from_value(
        json!([{"id": 1, "replies": [{"id": 2, "작업자명": "김철수", "사용여부": true}]}]),
        "replies",
    )
    .unwrap();

    aggregate(&mut forest, &FieldSchema::oasst());
    assert_eq!(forest[0].get("작업자명"), Some(&json!("김철수")));
    assert_eq!(forest[0].get("사용여부"), Some(&json!(true)));
}

// =========================================================================
// Flatten corners
// =========================================================================

#[test]
fn test_shallow_drops_deep_nodes_but_keeps_their_data_upstream() {
    let forest = forest_from_value(
        json!([{"id": 1, "replies": [{"id": 2, "replies": [{"id": 3, "replies": [{"id": 4, "lang": "ko"}]}]}]}]),
        "replies",
    )
    .unwrap();

    let config = TreeConfig::new().with_schema(schema());
    let (records, stats) = process_forest(forest, &config).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("id"), Some(&json!(2)));
    assert_eq!(records[0].get("lang"), Some(&json!("ko")));
    assert_eq!(stats.dropped_nodes(), 3);
}

#[test]
fn test_full_flatten_keeps_childless_roots() {
    let forest = forest_from_value(json!([{"id": 1}, {"id": 2}]), "replies").unwrap();
    let flat = flatten(forest, FlattenPolicy::Full);
    assert_eq!(flat.len(), 2);
}

#[test]
fn test_child_list_name_only_stripped_for_configured_field() {
    let forest = forest_from_value(
        json!([{"id": 1, "replies": [{"id": 2, "children": [{"id": 3}]}]}]),
        "replies",
    )
    .unwrap();

    let flat = flatten(forest, FlattenPolicy::Shallow);
    assert_eq!(flat[0].get("children"), Some(&json!([{"id": 3}])));
}

#[test]
fn test_deep_full_flatten() {
    let mut tree = MessageNode::new().with_field("id", 0);
    for id in 1..50_000 {
        tree = MessageNode::new().with_field("id", id).with_replies(vec![tree]);
    }

    let flat = flatten(vec![tree], FlattenPolicy::Full);
    assert_eq!(flat.len(), 50_000);
    assert_eq!(flat[0].get("id"), Some(&json!(49_999)));
    assert!(flat.iter().all(|n| !n.has_replies()));
}

#[test]
fn test_deep_shallow_flatten() {
    let mut tree = MessageNode::new().with_field("id", 0);
    for id in 1..50_000 {
        tree = MessageNode::new().with_field("id", id).with_replies(vec![tree]);
    }

    let flat = flatten(vec![tree], FlattenPolicy::Shallow);
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].get("id"), Some(&json!(49_998)));
}

//! Synthetic conversation-tree generator for stress testing convtree.
//!
//! Usage: cargo run --features gen-test --bin gen_tree -- [trees] [output] [max_depth]
//! Example: cargo run --features gen-test --bin gen_tree -- 10000 trees.json 6

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value, json};

const LANGS: &[&str] = &["ko", "en", "ja", "es", "de", "ru", "zh"];

const EMOJIS: &[&str] = &["+1", "-1", "_skip_reply", "_skip_ranking", "red_flag", "laugh"];

const LABELS: &[&str] = &["spam", "fails_task", "pii", "not_appropriate", "hate_speech", "quality"];

const TEXTS: &[&str] = &[
    "How do I flatten a conversation tree?",
    "서울에서 부산까지 얼마나 걸리나요?",
    "Check https://example.com/docs for details",
    "Message with \"quotes\" and ; semicolons",
    "Multi\nline\nreply",
    "こんにちは、元気ですか？",
    "",
];

fn main() {
    let args: Vec<String> = env::args().collect();

    let trees: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(10_000);
    let output = args.get(2).map(|s| s.as_str()).unwrap_or("trees.json");
    let max_depth: usize = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(5);

    println!("🌳 Tree Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Trees:     {}", trees);
    println!("   Output:    {}", output);
    println!("   Max depth: {}", max_depth);
    println!();

    let file = File::create(output).expect("Failed to create output file");
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    let mut rng = rand::thread_rng();

    let start = std::time::Instant::now();
    let mut nodes = 0usize;
    let mut next_id = 0usize;

    writeln!(writer, "[").unwrap();
    for i in 0..trees {
        let tree_id = format!("tree-{i}");
        let tree = generate_node(&mut rng, &tree_id, 0, max_depth, &mut next_id, &mut nodes);
        let comma = if i + 1 < trees { "," } else { "" };
        writeln!(writer, "{}{}", serde_json::to_string(&tree).unwrap(), comma).unwrap();

        if (i + 1) % 1000 == 0 {
            eprint!("\r   Generated {}/{} trees ({} nodes)", i + 1, trees, nodes);
        }
    }
    writeln!(writer, "]").unwrap();
    writer.flush().unwrap();

    let elapsed = start.elapsed();
    println!("\n\n✅ Done!");
    println!("   Nodes: {}", nodes);
    println!("   Time:  {:.2}s", elapsed.as_secs_f64());
}

fn generate_node(
    rng: &mut impl Rng,
    tree_id: &str,
    depth: usize,
    max_depth: usize,
    next_id: &mut usize,
    nodes: &mut usize,
) -> Value {
    *next_id += 1;
    *nodes += 1;

    let mut fields = Map::new();
    fields.insert("message_id".into(), json!(format!("m-{}", next_id)));
    fields.insert("text".into(), json!(*TEXTS.choose(rng).unwrap()));
    fields.insert("role".into(), json!(if depth % 2 == 0 { "prompter" } else { "assistant" }));

    // Sparse metadata so aggregation has something to do
    if rng.gen_bool(0.4) {
        fields.insert("lang".into(), json!(*LANGS.choose(rng).unwrap()));
    }
    if rng.gen_bool(0.3) {
        fields.insert("rank".into(), json!(rng.gen_range(0..4)));
    }
    if rng.gen_bool(0.3) {
        let count = rng.gen_range(1..3);
        let emojis: Vec<&str> = EMOJIS.choose_multiple(rng, count).copied().collect();
        fields.insert("emojis".into(), json!(emojis));
    }
    if rng.gen_bool(0.2) {
        let labels: Vec<&str> = LABELS.choose_multiple(rng, 2).copied().collect();
        fields.insert("lavels".into(), json!(labels));
    }
    if depth == 0 {
        fields.insert("message_tree_id".into(), json!(tree_id));
        fields.insert("tree_state".into(), json!("ready_for_export"));
    }
    fields.insert("review_count".into(), json!(rng.gen_range(0..6)));
    fields.insert("deleted".into(), json!(rng.gen_bool(0.05)));

    if depth < max_depth {
        let width = rng.gen_range(0..=3);
        if width > 0 {
            let replies: Vec<Value> = (0..width)
                .map(|_| generate_node(rng, tree_id, depth + 1, max_depth, next_id, nodes))
                .collect();
            fields.insert("replies".into(), Value::Array(replies));
        }
    }

    Value::Object(fields)
}

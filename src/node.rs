//! Message nodes and forests.
//!
//! A [`MessageNode`] is an open-ended bag of fields plus an optional ordered
//! list of child nodes (the *child list*, stored under `replies` in most
//! exports). A [`Forest`] is the ordered sequence of root nodes found in a
//! document.
//!
//! The child list is kept out of [`MessageNode::fields`] so the tree edges can
//! never be mistaken for ordinary data by the aggregation pass.
//!
//! # Examples
//!
//! ```
//! use convtree::MessageNode;
//! use serde_json::json;
//!
//! let value = json!({"id": 1, "replies": [{"id": 2, "lang": "ko"}]});
//! let node = MessageNode::from_value(value, "replies")?;
//!
//! assert_eq!(node.reply_count(), 1);
//! assert_eq!(node.get("id"), Some(&json!(1)));
//! assert!(node.get("replies").is_none());
//! # Ok::<(), convtree::ConvtreeError>(())
//! ```

use serde_json::{Map, Value};

use crate::error::{ConvtreeError, Result};

/// An ordered sequence of root message nodes.
pub type Forest = Vec<MessageNode>;

/// A single message in a conversation tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageNode {
    /// Every field of the message except the child list, in document order.
    pub fields: Map<String, Value>,

    /// Ordered children. `None` for leaves that never carried a child list.
    pub replies: Option<Vec<MessageNode>>,
}

impl MessageNode {
    /// Creates an empty node with no fields and no child list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field (builder style).
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets the child list (builder style).
    #[must_use]
    pub fn with_replies(mut self, replies: Vec<MessageNode>) -> Self {
        self.replies = Some(replies);
        self
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns `true` if the node carries a child list (even an empty one).
    pub fn has_replies(&self) -> bool {
        self.replies.is_some()
    }

    /// Number of direct children.
    pub fn reply_count(&self) -> usize {
        self.replies.as_ref().map_or(0, Vec::len)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(replies) = &node.replies {
                stack.extend(replies.iter());
            }
        }
        count
    }

    /// Converts a JSON value into a node, validating the whole subtree.
    ///
    /// The value must be an object, and the child list (if present and not
    /// `null`) must be an array of objects.
    pub fn from_value(value: Value, child_field: &str) -> Result<Self> {
        Self::from_value_at(value, child_field, String::new())
    }

    fn from_value_at(value: Value, child_field: &str, path: String) -> Result<Self> {
        let mut stack = vec![Decoding::open(value, child_field, &path)?];

        while let Some(top) = stack.last_mut() {
            if let Some((i, child)) = top.pending.as_mut().and_then(|p| p.next()) {
                let child_path = format!("{}/{i}", top.base);
                stack.push(Decoding::open(child, child_field, &child_path)?);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let replies = done.pending.map(|_| done.decoded);
            let node = Self {
                fields: done.fields,
                replies,
            };
            match stack.last_mut() {
                Some(parent) => parent.decoded.push(node),
                None => return Ok(node),
            }
        }

        unreachable!("the root frame returns before the stack empties")
    }

    /// Converts the node back into a JSON object, re-emitting the child list
    /// under `child_field` when present.
    pub fn into_value(self, child_field: &str) -> Value {
        let mut stack = vec![Encoding::open(self)];

        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.pending.as_mut().and_then(|p| p.next()) {
                stack.push(Encoding::open(child));
                continue;
            }

            let Some(done) = stack.pop() else { break };
            let mut fields = done.fields;
            if done.pending.is_some() {
                fields.insert(child_field.to_string(), Value::Array(done.encoded));
            }
            let value = Value::Object(fields);
            match stack.last_mut() {
                Some(parent) => parent.encoded.push(value),
                None => return value,
            }
        }

        unreachable!("the root frame returns before the stack empties")
    }

    /// Returns the fields as a JSON object, ignoring any child list.
    pub fn to_record(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// A node whose children are still being decoded.
struct Decoding {
    fields: Map<String, Value>,
    /// `None` when the node has no child list at all.
    pending: Option<std::iter::Enumerate<std::vec::IntoIter<Value>>>,
    decoded: Vec<MessageNode>,
    /// JSON pointer of the child list.
    base: String,
}

impl Decoding {
    fn open(value: Value, child_field: &str, path: &str) -> Result<Self> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ConvtreeError::structure(
                    pointer_or_root(path),
                    format!("expected a message object, found {}", kind_of(&other)),
                ));
            }
        };

        let base = format!("{path}/{}", escape_pointer(child_field));
        let pending = match fields.shift_remove(child_field) {
            None | Some(Value::Null) => None,
            Some(Value::Array(children)) => Some(children.into_iter().enumerate()),
            Some(other) => {
                return Err(ConvtreeError::structure(
                    base,
                    format!("expected an array of replies, found {}", kind_of(&other)),
                ));
            }
        };

        Ok(Self {
            fields,
            pending,
            decoded: Vec::new(),
            base,
        })
    }
}

/// A node whose children are still being encoded.
struct Encoding {
    fields: Map<String, Value>,
    pending: Option<std::vec::IntoIter<MessageNode>>,
    encoded: Vec<Value>,
}

impl Encoding {
    fn open(node: MessageNode) -> Self {
        Self {
            fields: node.fields,
            pending: node.replies.map(Vec::into_iter),
            encoded: Vec::new(),
        }
    }
}

/// Converts a document root into a forest.
///
/// The root must be an array of message objects. Every node at every depth is
/// validated before this returns, so later passes never see a malformed tree.
pub fn forest_from_value(value: Value, child_field: &str) -> Result<Forest> {
    let roots = match value {
        Value::Array(roots) => roots,
        other => {
            return Err(ConvtreeError::structure(
                "/",
                format!("expected an array of messages, found {}", kind_of(&other)),
            ));
        }
    };

    roots
        .into_iter()
        .enumerate()
        .map(|(i, root)| MessageNode::from_value_at(root, child_field, format!("/{i}")))
        .collect()
}

/// Converts a forest back into a JSON array.
pub fn forest_into_value(forest: Forest, child_field: &str) -> Value {
    Value::Array(
        forest
            .into_iter()
            .map(|node| node.into_value(child_field))
            .collect(),
    )
}

/// Total number of nodes across all trees.
pub fn forest_len(forest: &[MessageNode]) -> usize {
    forest.iter().map(MessageNode::subtree_len).sum()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn pointer_or_root(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

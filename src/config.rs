//! Configuration types for the aggregation and flattening passes.
//!
//! These are plain serde structs with builder methods, usable without any
//! CLI framework.
//!
//! - [`FieldSchema`] - versioned list of recognized fields
//! - [`FlattenPolicy`] - shallow (compatible) or full flattening
//! - [`TreeConfig`] - everything a conversion needs
//!
//! # Example
//!
//! ```rust
//! use convtree::config::{FieldSchema, FlattenPolicy, TreeConfig};
//!
//! let config = TreeConfig::new()
//!     .with_child_field("children")
//!     .with_schema(FieldSchema::new(["lang", "rank"]))
//!     .with_flatten_policy(FlattenPolicy::Full);
//!
//! assert_eq!(config.child_field, "children");
//! assert!(config.schema.contains("lang"));
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConvtreeError, Result};

/// Default name of the child-list field.
pub const DEFAULT_CHILD_FIELD: &str = "replies";

/// Recognized fields of the OpenAssistant-style export, in schema version 1.
const OASST_FIELDS: &[&str] = &[
    "lang",
    "review_count",
    "review_result",
    "deleted",
    "rank",
    "synthetic",
    "model_name",
    "detoxify",
    "message_tree_id",
    "tree_state",
    "emojis",
    "lavels",
    "link",
    "변호사명",
    "작업자명",
    "작업일자",
    "사용여부",
];

/// The set of field names that are propagated from descendants to ancestors.
///
/// Order matters only for display; lookups are by name. Duplicates are
/// dropped on construction (first occurrence wins).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Schema version, bumped whenever the field list changes meaning.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Recognized field names.
    pub fields: Vec<String>,
}

fn default_version() -> u32 {
    1
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::oasst()
    }
}

impl FieldSchema {
    /// Creates a version-1 schema from a list of names.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            version: 1,
            fields: dedup(fields.into_iter().map(Into::into)),
        }
    }

    /// The default schema for OpenAssistant-style conversation exports.
    pub fn oasst() -> Self {
        Self::new(OASST_FIELDS.iter().copied())
    }

    /// Loads a schema from a JSON file.
    ///
    /// Accepts either `{"version": 2, "fields": [...]}` or a bare array of
    /// names.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
            .map_err(|e| match e {
                ConvtreeError::Json(source) => {
                    ConvtreeError::parse(source, Some(path.to_path_buf()))
                }
                other => other,
            })
    }

    /// Parses a schema from a JSON string. See [`from_json_file`](Self::from_json_file).
    pub fn from_json_str(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SchemaDoc {
            Full(FieldSchema),
            Names(Vec<String>),
        }

        let schema = match serde_json::from_str::<SchemaDoc>(content)? {
            SchemaDoc::Full(schema) => Self {
                version: schema.version,
                fields: dedup(schema.fields),
            },
            SchemaDoc::Names(names) => Self::new(names),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Adds a field name if it isn't already recognized.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.contains(&name) {
            self.fields.push(name);
        }
        self
    }

    /// Returns `true` if `name` is a recognized field.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Iterates recognized names in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    /// Number of recognized fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is recognized.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks that the schema is usable.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(ConvtreeError::invalid_config(
                "field schema must name at least one field",
            ));
        }
        if self.fields.iter().any(|f| f.is_empty()) {
            return Err(ConvtreeError::invalid_config(
                "field schema contains an empty field name",
            ));
        }
        Ok(())
    }
}

fn dedup(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

/// Which nodes end up in the flattened output.
///
/// - [`Shallow`](FlattenPolicy::Shallow) keeps only the first-level children
///   of each root. Roots and deeper nodes are dropped. This matches the
///   behavior of existing exports and is the default.
/// - [`Full`](FlattenPolicy::Full) keeps every node, in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlattenPolicy {
    /// First-level children of each root only.
    #[default]
    Shallow,
    /// Every node at every depth, roots included.
    Full,
}

impl FlattenPolicy {
    /// Returns all supported policy names.
    pub fn all_names() -> &'static [&'static str] {
        &["shallow", "full"]
    }
}

impl fmt::Display for FlattenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlattenPolicy::Shallow => write!(f, "shallow"),
            FlattenPolicy::Full => write!(f, "full"),
        }
    }
}

impl FromStr for FlattenPolicy {
    type Err = ConvtreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "shallow" => Ok(FlattenPolicy::Shallow),
            "full" => Ok(FlattenPolicy::Full),
            _ => Err(ConvtreeError::invalid_config(format!(
                "unknown flatten policy '{}', expected one of: {}",
                s,
                FlattenPolicy::all_names().join(", ")
            ))),
        }
    }
}

/// Configuration for a tree-to-flat conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Name of the field holding a node's children (default: `replies`).
    pub child_field: String,

    /// Fields propagated upward by the aggregator.
    pub schema: FieldSchema,

    /// Which nodes the flattener keeps.
    pub flatten_policy: FlattenPolicy,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            child_field: DEFAULT_CHILD_FIELD.to_string(),
            schema: FieldSchema::oasst(),
            flatten_policy: FlattenPolicy::Shallow,
        }
    }
}

impl TreeConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the child-list field name.
    #[must_use]
    pub fn with_child_field(mut self, name: impl Into<String>) -> Self {
        self.child_field = name.into();
        self
    }

    /// Sets the recognized-field schema.
    #[must_use]
    pub fn with_schema(mut self, schema: FieldSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Sets the flatten policy.
    #[must_use]
    pub fn with_flatten_policy(mut self, policy: FlattenPolicy) -> Self {
        self.flatten_policy = policy;
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// The child-list field must be non-empty and must not also be a
    /// recognized field, since tree edges are never merged as data.
    pub fn validate(&self) -> Result<()> {
        if self.child_field.is_empty() {
            return Err(ConvtreeError::invalid_config(
                "child field name must not be empty",
            ));
        }
        if self.schema.contains(&self.child_field) {
            return Err(ConvtreeError::invalid_config(format!(
                "child field '{}' cannot also be a recognized field",
                self.child_field
            )));
        }
        self.schema.validate()
    }
}

//! # Resource Trees
//!
//! A [`ResourceNode`] describes the shape the application object should take.
//! Leaves are file patterns, groups are named sub-trees:
//!
//! ```rust
//! use loader_recipe::framework::ResourceNode;
//!
//! let tree = ResourceNode::group([
//!     ("client", ResourceNode::group([
//!         ("_", ResourceNode::pattern("app/client/*.json")),
//!         ("rest", ResourceNode::pattern("app/client/rest/*.json")),
//!     ])),
//!     ("service", ResourceNode::pattern("app/service/*.json")),
//! ]);
//! assert_eq!(tree.leaves().len(), 3);
//! ```
//!
//! The flatten marker (`_` by default) is the one reserved key: its matches are
//! placed directly in the parent group instead of under a nested key.

use crate::framework::error::BootstrapError;
use std::collections::BTreeMap;

/// The default flatten marker.
pub const FLATTEN_MARKER: &str = "_";

/// A node of a caller-authored resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceNode {
    /// A path pattern selecting zero or more files.
    Pattern(String),
    /// A named sub-tree.
    Group(BTreeMap<String, ResourceNode>),
}

/// A pattern leaf together with the group keys leading to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Keys from the tree root to the leaf, the leaf's own key last.
    pub path: Vec<String>,
    pub pattern: String,
}

impl ResourceNode {
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern(pattern.into())
    }

    pub fn group<K, I>(children: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ResourceNode)>,
    {
        Self::Group(
            children
                .into_iter()
                .map(|(key, node)| (key.into(), node))
                .collect(),
        )
    }

    /// Parses a tree from JSON: strings are patterns, objects are groups.
    ///
    /// Any other JSON value is rejected. The flatten marker rule is checked too,
    /// so a parsed tree is ready to declare.
    pub fn from_json(value: &serde_json::Value, flatten_marker: &str) -> Result<Self, BootstrapError> {
        let node = Self::from_json_at(value, &mut Vec::new())?;
        node.validate(flatten_marker)?;
        Ok(node)
    }

    fn from_json_at(
        value: &serde_json::Value,
        path: &mut Vec<String>,
    ) -> Result<Self, BootstrapError> {
        match value {
            serde_json::Value::String(pattern) => Ok(Self::Pattern(pattern.clone())),
            serde_json::Value::Object(map) => {
                let mut children = BTreeMap::new();
                for (key, child) in map {
                    path.push(key.clone());
                    let node = Self::from_json_at(child, path)?;
                    path.pop();
                    children.insert(key.clone(), node);
                }
                Ok(Self::Group(children))
            }
            other => Err(BootstrapError::configuration(
                path,
                format!("expected a pattern string or a group, found `{other}`"),
            )),
        }
    }

    /// Checks the tree before any resolution begins.
    ///
    /// Rejects empty patterns and a flatten marker whose value is a group.
    pub fn validate(&self, flatten_marker: &str) -> Result<(), BootstrapError> {
        self.validate_at(flatten_marker, &mut Vec::new())
    }

    fn validate_at(&self, marker: &str, path: &mut Vec<String>) -> Result<(), BootstrapError> {
        match self {
            Self::Pattern(pattern) if pattern.trim().is_empty() => {
                Err(BootstrapError::configuration(path, "pattern is empty"))
            }
            Self::Pattern(_) => Ok(()),
            Self::Group(children) => {
                for (key, child) in children {
                    path.push(key.clone());
                    if key == marker && matches!(child, Self::Group(_)) {
                        return Err(BootstrapError::configuration(
                            path,
                            "the flatten marker must hold a pattern, not a group",
                        ));
                    }
                    child.validate_at(marker, path)?;
                    path.pop();
                }
                Ok(())
            }
        }
    }

    /// Collects every pattern leaf with its path, in key order.
    pub fn leaves(&self) -> Vec<Leaf> {
        let mut out = Vec::new();
        self.collect(&mut Vec::new(), &mut out);
        out
    }

    fn collect(&self, path: &mut Vec<String>, out: &mut Vec<Leaf>) {
        match self {
            Self::Pattern(pattern) => out.push(Leaf {
                path: path.clone(),
                pattern: pattern.clone(),
            }),
            Self::Group(children) => {
                for (key, child) in children {
                    path.push(key.clone());
                    child.collect(path, out);
                    path.pop();
                }
            }
        }
    }
}

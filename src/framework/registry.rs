//! # Application Object
//!
//! [`ApiObject`] is the registry the orchestrator builds up during a run and
//! hands back on success. It mirrors the declared resource trees: groups map
//! names to nodes, leaves hold loaded module values.

use std::collections::BTreeMap;

/// The children of one group, keyed by name.
pub type Registry<V> = BTreeMap<String, ApiNode<V>>;

/// One entry of the application object.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiNode<V> {
    Module(V),
    Group(Registry<V>),
}

impl<V> ApiNode<V> {
    pub fn as_module(&self) -> Option<&V> {
        match self {
            Self::Module(value) => Some(value),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Registry<V>> {
        match self {
            Self::Group(children) => Some(children),
            Self::Module(_) => None,
        }
    }

    fn module_count(&self) -> usize {
        match self {
            Self::Module(_) => 1,
            Self::Group(children) => children.values().map(Self::module_count).sum(),
        }
    }
}

/// The shared, progressively populated result of a bootstrap run.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiObject<V> {
    root: Registry<V>,
}

impl<V> Default for ApiObject<V> {
    fn default() -> Self {
        Self {
            root: BTreeMap::new(),
        }
    }
}

impl<V> ApiObject<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a top-level entry, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, node: ApiNode<V>) -> Option<ApiNode<V>> {
        self.root.insert(key.into(), node)
    }

    /// Builder-style insert of a top-level module, for pre-seeding.
    pub fn with_module(mut self, key: impl Into<String>, value: V) -> Self {
        self.insert(key, ApiNode::Module(value));
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ApiNode<V>> {
        self.root.remove(key)
    }

    /// Looks up a node by its key path. An empty path has no node.
    pub fn get(&self, path: &[&str]) -> Option<&ApiNode<V>> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(*first)?;
        for key in rest {
            node = node.as_group()?.get(*key)?;
        }
        Some(node)
    }

    /// Looks up a module value by its key path.
    pub fn module(&self, path: &[&str]) -> Option<&V> {
        self.get(path)?.as_module()
    }

    /// Looks up a group by its key path. The empty path is the root.
    pub fn group(&self, path: &[&str]) -> Option<&Registry<V>> {
        if path.is_empty() {
            return Some(&self.root);
        }
        self.get(path)?.as_group()
    }

    pub fn contains(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Total number of module values, at any depth.
    pub fn module_count(&self) -> usize {
        self.root.values().map(ApiNode::module_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Shallow merge: every top-level key of `registry` replaces the existing
    /// entry of the same name wholesale. Other keys are left untouched.
    pub fn merge(&mut self, registry: Registry<V>) {
        for (key, node) in registry {
            self.root.insert(key, node);
        }
    }

    pub fn into_registry(self) -> Registry<V> {
        self.root
    }
}

impl<V> From<Registry<V>> for ApiObject<V> {
    fn from(root: Registry<V>) -> Self {
        Self { root }
    }
}

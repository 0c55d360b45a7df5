//! Loader configuration.

use crate::framework::{BootstrapError, FLATTEN_MARKER};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Settings for one bootstrap run.
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes:
///
/// ```rust
/// use loader_recipe::lifecycle::LoaderConfig;
///
/// let config = LoaderConfig::from_json_str(r#"{ "root": "demos" }"#).unwrap();
/// assert_eq!(config.flatten_marker, "_");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Directory patterns are resolved against. `None` means the process
    /// working directory, read when the run starts.
    pub root: Option<PathBuf>,
    /// Group key whose matches are merged into the parent group.
    pub flatten_marker: String,
    /// Skip directories matched by a pattern.
    pub files_only: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            root: None,
            flatten_marker: FLATTEN_MARKER.to_string(),
            files_only: true,
        }
    }
}

impl LoaderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// The directory to resolve patterns against, as of now.
    pub fn working_root(&self) -> Result<PathBuf, BootstrapError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir()
                .map_err(|e| BootstrapError::pattern(".", Arc::new(e))),
        }
    }
}

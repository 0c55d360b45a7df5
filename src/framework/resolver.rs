//! # Pattern Resolver
//!
//! Expands a path pattern into the files it matches under a fixed root.
//! Supports exact names, `*`/`?`/`[...]` within one segment and `**` across
//! any number of directories (the `glob` crate's syntax).
//!
//! Results are sorted by full path, so the same filesystem always yields the
//! same order and identifier collisions resolve the same way every run.

use crate::framework::error::BootstrapError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A file matched by a pattern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileLocation {
    /// Absolute (root-joined) path, used for loading.
    pub path: PathBuf,
    /// Path relative to the root, used for reporting.
    pub relative: PathBuf,
}

impl FileLocation {
    /// The module identifier: the base name with its extension stripped.
    pub fn identifier(&self) -> Option<String> {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
    }
}

/// Resolves patterns relative to a fixed working root.
#[derive(Debug, Clone)]
pub struct GlobResolver {
    root: PathBuf,
    files_only: bool,
}

impl GlobResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files_only: true,
        }
    }

    /// Whether directories matched by a pattern are skipped (the default).
    pub fn files_only(mut self, files_only: bool) -> Self {
        self.files_only = files_only;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Blocking resolution. Prefer [`GlobResolver::resolve`] from async code.
    pub fn resolve_blocking(&self, pattern: &str) -> Result<Vec<FileLocation>, BootstrapError> {
        let full = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            // Metacharacters in the root itself must match literally.
            let root = glob::Pattern::escape(&self.root.to_string_lossy());
            format!("{}/{}", root.trim_end_matches('/'), pattern)
        };

        let entries = glob::glob(&full).map_err(|e| {
            BootstrapError::pattern(pattern, Arc::new(PatternSyntax(e.to_string())))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| BootstrapError::pattern(pattern, Arc::new(e)))?;
            if self.files_only && !path.is_file() {
                continue;
            }
            let relative = path
                .strip_prefix(&self.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.clone());
            files.push(FileLocation { path, relative });
        }
        files.sort();
        debug!(pattern, matches = files.len(), "Pattern resolved");
        Ok(files)
    }

    /// Resolves on the blocking pool so the walk does not stall the scheduler.
    pub async fn resolve(&self, pattern: &str) -> Result<Vec<FileLocation>, BootstrapError> {
        let resolver = self.clone();
        let owned = pattern.to_string();
        tokio::task::spawn_blocking(move || resolver.resolve_blocking(&owned))
            .await
            .map_err(|e| BootstrapError::pattern(pattern, Arc::new(e)))?
    }
}

/// Invalid pattern syntax, as reported by the glob parser.
#[derive(Debug, thiserror::Error)]
#[error("invalid pattern: {0}")]
struct PatternSyntax(String);

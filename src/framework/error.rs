//! # Bootstrap Errors
//!
//! Every failure that can end a bootstrap run is a [`BootstrapError`]. All four
//! kinds are fatal: the orchestrator never retries, it stops the queue and
//! reports the error once.
//!
//! Causes are held behind an [`Arc`] so the same error value can be handed to
//! every event subscriber, the completion callback and the caller of `run()`.

use std::path::PathBuf;
use std::sync::Arc;

/// A boxed error, as returned by module loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A shareable, type-erased error cause.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that abort a bootstrap run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BootstrapError {
    /// The pattern is syntactically invalid or the filesystem walk failed.
    #[error("Failed to resolve pattern `{pattern}`: {cause}")]
    PatternResolution {
        pattern: String,
        #[source]
        cause: Cause,
    },
    /// A matched file could not be turned into a module value.
    #[error("Failed to load module {}: {cause}", .file.display())]
    ModuleLoad {
        file: PathBuf,
        #[source]
        cause: Cause,
    },
    /// An init job signaled failure.
    #[error("Task #{index} failed: {cause}")]
    Task {
        index: usize,
        #[source]
        cause: TaskError,
    },
    /// The resource tree is malformed. Raised before any resolution starts.
    #[error("Invalid resource tree at `{path}`: {reason}")]
    Configuration { path: String, reason: String },
}

impl BootstrapError {
    pub(crate) fn pattern(pattern: impl Into<String>, cause: Cause) -> Self {
        Self::PatternResolution {
            pattern: pattern.into(),
            cause,
        }
    }

    pub(crate) fn module(file: impl Into<PathBuf>, cause: Cause) -> Self {
        Self::ModuleLoad {
            file: file.into(),
            cause,
        }
    }

    pub(crate) fn configuration(path: &[String], reason: impl Into<String>) -> Self {
        let path = if path.is_empty() {
            "<root>".to_string()
        } else {
            path.join(".")
        };
        Self::Configuration {
            path,
            reason: reason.into(),
        }
    }
}

/// The outcome of a failed init job.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TaskError {
    /// The job ran and reported an error.
    #[error("{0}")]
    Failed(Cause),
    /// The job dropped its continuation without signaling.
    #[error("Task dropped its continuation without signaling")]
    Abandoned,
}

impl TaskError {
    /// Wraps any error as a task failure.
    pub fn failed(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Failed(Arc::new(cause))
    }

    /// Builds a task failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Failed(Arc::from(BoxError::from(message)))
    }
}

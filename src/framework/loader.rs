//! # Module Loaders
//!
//! A [`ModuleLoader`] turns one matched file into an in-memory module value.
//! The engine never looks inside a module: it only derives the identifier from
//! the file name and stores whatever the loader produced.
//!
//! Two stock loaders are provided:
//! - [`JsonLoader`] parses each file as a `serde_json::Value`.
//! - [`TextLoader`] keeps the raw UTF-8 contents.
//!
//! Anything else (a plugin host, a table of statically registered values)
//! plugs in by implementing the trait.

use crate::framework::error::BoxError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

/// Produces module values from files.
#[async_trait]
pub trait ModuleLoader: Send + Sync + 'static {
    /// The value stored in the application object for each loaded file.
    type Module: Clone + Send + Sync + Debug + 'static;

    /// Loads the module stored at `file` (an absolute, root-joined path).
    async fn load(&self, file: &Path) -> Result<Self::Module, BoxError>;
}

/// Loads every file as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

#[async_trait]
impl ModuleLoader for JsonLoader {
    type Module = serde_json::Value;

    async fn load(&self, file: &Path) -> Result<Self::Module, BoxError> {
        let bytes = tokio::fs::read(file).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Loads every file as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextLoader;

#[async_trait]
impl ModuleLoader for TextLoader {
    type Module = String;

    async fn load(&self, file: &Path) -> Result<Self::Module, BoxError> {
        Ok(tokio::fs::read_to_string(file).await?)
    }
}

//! Building blocks of the bootstrap engine.
//!
//! This module provides the pieces the orchestrator composes into a run:
//!
//! # Main Components
//!
//! - [`ResourceNode`] - Caller-authored tree of file patterns
//! - [`ApiObject`] - The application object a run populates
//! - [`GlobResolver`] - Expands a pattern into sorted file locations
//! - [`ModuleLoader`] - Turns a file into a module value ([`JsonLoader`], [`TextLoader`])
//! - [`Task`] - One asynchronous init job ([`task`], [`continuation`])
//! - [`BootstrapError`] - The fatal error kinds
//!
//! # Testing
//!
//! See [`mock`] for a scripted loader that needs no module content.

pub mod error;
pub mod loader;
pub mod mock;
pub mod registry;
pub mod resolver;
pub mod task;
pub mod tree;

pub use error::*;
pub use loader::*;
pub use registry::*;
pub use resolver::*;
pub use task::*;
pub use tree::*;

//! # Bootstrap Lifecycle & Orchestration
//!
//! This module runs a bootstrap pass: it owns the application object and the
//! phase queue, drains the queue strictly in declaration order, and reports the
//! outcome.
//!
//! ## The Phase Queue
//!
//! Declarations become queue entries in the order they are made:
//!
//! - [`Orchestrator::declare_resources`] adds a **resource job**. Internally it
//!   resolves every pattern of its tree concurrently, then merges the rebuilt
//!   tree into the application object.
//! - [`Orchestrator::add_task`] adds an **init job**, which runs to its own
//!   completion signal.
//!
//! Internally parallel, externally sequential: the next entry starts only once
//! the previous one has merged or completed. The first error stops the queue;
//! later entries never start.
//!
//! ## Events
//!
//! [`Orchestrator::subscribe`] returns a channel of [`LifecycleEvent`]s:
//! `ResourceLoaded` per loaded file, then exactly one `Ready` or `Failed`.
//!
//! ## Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging. See the
//! [`tracing`] module for what each level shows.

pub mod config;
pub mod events;
pub mod orchestrator;
mod resource_job;
pub mod tracing;

pub use config::*;
pub use events::LifecycleEvent;
pub use orchestrator::*;
pub use self::tracing::*;

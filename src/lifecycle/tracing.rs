//! # Observability & Tracing
//!
//! This module provides the tracing setup for bootstrap runs.
//!
//! ## Overview
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! Every queue entry runs inside a `phase` span carrying its index and kind, and
//! every pattern of a resource job inside a `leaf` span carrying its tree path.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`) and
//! shows spans inline. Levels come from the `RUST_LOG` environment variable.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Phase progress and the final summary
//! RUST_LOG=info cargo run
//!
//! # Every resolved pattern and loaded file
//! RUST_LOG=debug cargo run
//!
//! # Filter to the engine only
//! RUST_LOG=loader_recipe::lifecycle=debug cargo run
//! ```
//!
//! ## Bootstrap Trace Example
//!
//! **With `RUST_LOG=info`** (compact):
//!
//! ```text
//! INFO Bootstrap started entries=3 root=/srv/app
//! INFO phase{index=0 kind="resources"}: Resources merged keys=5
//! INFO phase{index=1 kind="task"}: Task complete
//! INFO phase{index=2 kind="resources"}: Resources merged keys=1
//! INFO Application ready modules=17
//! ```
//!
//! **With `RUST_LOG=debug`** each leaf adds its matches:
//!
//! ```text
//! DEBUG phase{index=0 kind="resources"}:leaf{path=client._ pattern=demos/app/client/*.json}: Pattern resolved pattern="demos/app/client/*.json" matches=1
//! DEBUG phase{index=0 kind="resources"}:leaf{path=client._ pattern=demos/app/client/*.json}: Resource loaded file=demos/app/client/rest.json identifier=rest
//! ```

/// Initializes the tracing/logging infrastructure for the application.
///
/// Safe to call more than once: later calls leave the first subscriber in place.
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Don't show module paths - spans carry the phase instead
        .compact() // Compact format shows spans inline (e.g., "phase:leaf")
        .try_init();
}

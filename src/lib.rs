#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Loader Recipe
//!
//! > **A Recipe for declarative application bootstrap in Rust.**
//!
//! This crate assembles a small service's components (clients, services,
//! transformers, plugins) from a declarative description instead of a
//! hand-written bootstrap script. You describe *where* modules live as a tree of
//! file patterns and *what* has to happen in between as async init jobs; the
//! orchestrator builds the application object and tells you when it is ready.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Internally parallel, externally sequential
//!
//! - **Resource jobs** fan out: every pattern of a tree resolves and loads at once.
//! - **The phase queue** does not: entries run strictly in declaration order, so an
//!   init job always sees every resource declared before it, and nothing after.
//!
//! ### Immutable in, rebuilt out
//!
//! The caller's resource tree is never touched. Each job rebuilds a fresh registry
//! of the same shape and merges it into the application object explicitly
//! (shallow, last write wins).
//!
//! ### First error wins
//!
//! Pattern, load, task and configuration errors are all fatal. The queue stops,
//! one `Failed` event fires, and the error comes back from `run()`.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Building Blocks ([`framework`])
//! - **Role**: Resource trees, the application object, pattern resolution,
//!   module loading and init jobs.
//! - **Key items**: [`ResourceNode`](framework::ResourceNode),
//!   [`ApiObject`](framework::ApiObject), [`ModuleLoader`](framework::ModuleLoader),
//!   [`Task`](framework::Task).
//!
//! ### 2. The Orchestrator ([`lifecycle`])
//! - **Role**: Owns the phase queue, drains it, emits lifecycle events.
//! - **Key items**: [`Orchestrator`](lifecycle::Orchestrator),
//!   [`LifecycleEvent`](lifecycle::LifecycleEvent), [`LoaderConfig`](lifecycle::LoaderConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```rust,no_run
//! use loader_recipe::framework::{task, JsonLoader, ResourceNode};
//! use loader_recipe::lifecycle::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut loader = Orchestrator::new(JsonLoader);
//!     loader
//!         .declare_resources(ResourceNode::group([
//!             ("service", ResourceNode::pattern("app/service/*.json")),
//!             ("plugin", ResourceNode::pattern("app/plugin/*.json")),
//!         ]))
//!         .add_task(task(|api| Box::pin(async move {
//!             tracing::info!(services = api.module_count(), "Connecting");
//!             Ok(())
//!         })));
//!
//!     let api = loader.run().await?;
//!     println!("{} modules loaded", api.module_count());
//!     Ok(())
//! }
//! ```
//!
//! ### Running the Demo
//!
//! ```bash
//! # Run with info logs
//! RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod framework;
pub mod lifecycle;

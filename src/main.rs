//! # Loader Recipe Demo
//!
//! Bootstraps the fixture application under `demos/app`:
//!
//! 1. Loads clients, common config, plugins, services and transformers.
//! 2. Runs three init jobs: a database connection, a cache warm-up and the
//!    plugin server start (which reads the `plugin.server` module loaded in step 1).
//! 3. Loads the public assets, at any depth.
//!
//! Run it from the crate root so the patterns resolve:
//!
//! ```bash
//! RUST_LOG=info cargo run
//! # or with an explicit configuration file
//! RUST_LOG=debug cargo run -- loader.json
//! ```

use loader_recipe::framework::{
    continuation, task, ApiObject, BoxedTask, Done, JsonLoader, ResourceNode, TaskError,
};
use loader_recipe::lifecycle::{setup_tracing, LifecycleEvent, LoaderConfig, Orchestrator};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
            LoaderConfig::from_json_str(&text).map_err(|e| format!("{path}: {e}"))?
        }
        None => LoaderConfig::default(),
    };

    let seeded = ApiObject::new().with_module("version", json!("0.0.1"));
    let mut loader = Orchestrator::with_api(JsonLoader, seeded).with_config(config);
    let mut events = loader.subscribe();

    loader.declare_resources(ResourceNode::group([
        (
            "client",
            ResourceNode::group([
                ("_", ResourceNode::pattern("demos/app/client/*.json")),
                ("service1", ResourceNode::pattern("demos/app/client/service1/*.json")),
                ("service2", ResourceNode::pattern("demos/app/client/service2/*.json")),
            ]),
        ),
        ("common", ResourceNode::pattern("demos/app/common/*.json")),
        ("plugin", ResourceNode::pattern("demos/app/plugin/*.json")),
        ("service", ResourceNode::pattern("demos/app/service/*.json")),
        ("transformer", ResourceNode::pattern("demos/app/transformer/*.json")),
    ]));

    let init_jobs: Vec<BoxedTask<Value>> = vec![
        Box::new(task(|_api: &mut ApiObject<Value>| {
            Box::pin(async {
                info!("Opening database connection");
                tokio::time::sleep(Duration::from_millis(150)).await;
                info!("Connected to the database");
                Ok(())
            })
        })),
        Box::new(task(|_api: &mut ApiObject<Value>| {
            Box::pin(async {
                info!("Initializing cache");
                tokio::time::sleep(Duration::from_millis(200)).await;
                info!("Cache initialized");
                Ok(())
            })
        })),
        Box::new(continuation(|api: &mut ApiObject<Value>, done: Done| {
            let port = api
                .module(&["plugin", "server"])
                .and_then(|server| server.get("port"))
                .and_then(Value::as_u64);
            tokio::spawn(async move {
                match port {
                    Some(port) => {
                        info!(port, "Plugin server listening");
                        done.ok();
                    }
                    None => done.fail(TaskError::msg("plugin.server declares no port")),
                }
            });
        })),
    ];
    loader.add_tasks(init_jobs);

    loader.declare_resources(ResourceNode::group([(
        "public",
        ResourceNode::pattern("demos/app/public/**/*.json"),
    )]));

    let watcher = tokio::spawn(async move {
        let mut loaded = 0usize;
        while let Some(event) = events.recv().await {
            match event {
                LifecycleEvent::ResourceLoaded { file } => {
                    loaded += 1;
                    debug!(file = %file.display(), "Resource loaded");
                }
                LifecycleEvent::Failed { .. } | LifecycleEvent::Ready { .. } => break,
            }
        }
        loaded
    });

    let result = loader.run().await;
    let loaded = watcher.await.map_err(|e| e.to_string())?;

    match result {
        Ok(api) => {
            info!(loaded, modules = api.module_count(), "Your application is ready to serve");
            for key in api.keys() {
                info!(key, "Registered");
            }
            debug!(?api, "Application object");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Bootstrap failed");
            Err(e.to_string())
        }
    }
}

use loader_recipe::framework::mock::MockLoader;
use loader_recipe::framework::{
    continuation, task, ApiObject, BootstrapError, BoxedTask, Done, GlobResolver, JsonLoader, ResourceNode,
    TaskError, TextLoader,
};
use loader_recipe::lifecycle::{LifecycleEvent, LoaderConfig, Orchestrator};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

// --- Fixtures ---

/// Writes `files` (path, contents) under a fresh temporary root.
fn fixture(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    for (file, contents) in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn text_loader(root: &Path) -> Orchestrator<TextLoader> {
    Orchestrator::new(TextLoader).with_config(LoaderConfig::default().with_root(root))
}

/// Collects every event still queued. The run must have finished.
fn drain_events<V>(mut receiver: UnboundedReceiver<LifecycleEvent<V>>) -> Vec<LifecycleEvent<V>> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn loaded_files<V>(events: &[LifecycleEvent<V>]) -> Vec<PathBuf> {
    events
        .iter()
        .filter_map(|e| match e {
            LifecycleEvent::ResourceLoaded { file } => Some(file.clone()),
            _ => None,
        })
        .collect()
}

// --- Tests ---

#[test]
fn resolution_is_deterministic() {
    let dir = fixture(&[
        ("svc/zeta.json", "{}"),
        ("svc/alpha.json", "{}"),
        ("svc/nested/mid.json", "{}"),
    ]);
    let resolver = GlobResolver::new(dir.path());

    let first: Vec<_> = resolver
        .resolve_blocking("svc/**/*.json")
        .unwrap()
        .iter()
        .filter_map(|f| f.identifier())
        .collect();
    let second: Vec<_> = resolver
        .resolve_blocking("svc/**/*.json")
        .unwrap()
        .iter()
        .filter_map(|f| f.identifier())
        .collect();

    assert_eq!(first, second);
    assert_eq!(first, vec!["alpha", "mid", "zeta"]);
}

#[tokio::test]
async fn flatten_marker_merges_into_parent() {
    let dir = fixture(&[
        ("dir/a.js", "module a"),
        ("dir/b.js", "module b"),
        ("dir/sub/c.js", "module c"),
    ]);
    let mut loader = text_loader(dir.path());
    loader.declare_resources(ResourceNode::group([(
        "lib",
        ResourceNode::group([
            ("_", ResourceNode::pattern("dir/*.js")),
            ("nested", ResourceNode::pattern("dir/sub/*.js")),
        ]),
    )]));

    let api = loader.run().await.expect("Bootstrap failed");

    let lib = api.group(&["lib"]).expect("lib group missing");
    let keys: Vec<_> = lib.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "nested"]);
    assert_eq!(api.module(&["lib", "a"]).unwrap(), "module a");
    assert_eq!(api.module(&["lib", "b"]).unwrap(), "module b");
    assert_eq!(api.module(&["lib", "nested", "c"]).unwrap(), "module c");
    assert!(!api.contains(&["lib", "_"]));
}

#[tokio::test]
async fn empty_match_yields_empty_group() {
    let dir = fixture(&[("plugin/server.json", "{}")]);
    let mut loader = text_loader(dir.path());
    loader.declare_resources(ResourceNode::group([
        ("plugin", ResourceNode::pattern("plugin/*.json")),
        ("transformer", ResourceNode::pattern("transformer/*.json")),
    ]));

    let api = loader.run().await.unwrap();
    let transformer = api.group(&["transformer"]).expect("empty match must keep its key");
    assert!(transformer.is_empty());
}

#[tokio::test]
async fn queue_entries_run_in_declaration_order() {
    let dir = fixture(&[
        ("first/a.json", "1"),
        ("first/b.json", "2"),
        ("second/c.json", "3"),
    ]);
    let mock = MockLoader::with_fallback(|p: &Path| p.display().to_string());
    let mut loader = Orchestrator::new(mock.clone())
        .with_config(LoaderConfig::default().with_root(dir.path()));

    let observed = mock.clone();
    loader
        .declare_resources(ResourceNode::group([("t1", ResourceNode::pattern("first/*.json"))]))
        .add_task(task(move |api: &mut ApiObject<String>| {
            Box::pin(async move {
                // Give T2 every chance to jump the queue.
                tokio::time::sleep(Duration::from_millis(20)).await;
                if api.group(&["t1"]).map(|g| g.len()) != Some(2) {
                    return Err(TaskError::msg("T1 was not merged before J1"));
                }
                if api.contains(&["t2"]) || observed.calls().len() != 2 {
                    return Err(TaskError::msg("T2 started before J1 completed"));
                }
                api.insert("j1", loader_recipe::framework::ApiNode::Module("done".into()));
                Ok(())
            })
        }))
        .declare_resources(ResourceNode::group([("t2", ResourceNode::pattern("second/*.json"))]));

    let api = loader.run().await.expect("Queue ordering violated");
    assert!(api.contains(&["j1"]));
    assert!(api.contains(&["t2", "c"]));
    assert_eq!(mock.calls().len(), 3);
}

#[tokio::test]
async fn task_sequence_runs_in_list_order_between_resource_jobs() {
    let dir = fixture(&[("first/a.json", "1"), ("second/b.json", "2")]);
    let mock = MockLoader::with_fallback(|p: &Path| p.display().to_string());
    let mut loader = Orchestrator::new(mock.clone())
        .with_config(LoaderConfig::default().with_root(dir.path()));
    let log = Arc::new(Mutex::new(Vec::new()));

    let jobs: Vec<BoxedTask<String>> = ["j1", "j2", "j3"]
        .into_iter()
        .map(|name| {
            let log = Arc::clone(&log);
            let observed = mock.clone();
            Box::new(task(move |api: &mut ApiObject<String>| {
                Box::pin(async move {
                    // Later jobs sleep less, so any overlap would reorder the log.
                    let pause = match name {
                        "j1" => 30,
                        "j2" => 15,
                        _ => 0,
                    };
                    tokio::time::sleep(Duration::from_millis(pause)).await;
                    if !api.contains(&["t1", "a"]) || observed.calls().len() != 1 {
                        return Err(TaskError::msg(format!("{name} saw the wrong resources")));
                    }
                    log.lock().unwrap().push(name);
                    Ok(())
                })
            })) as BoxedTask<String>
        })
        .collect();

    loader
        .declare_resources(ResourceNode::group([("t1", ResourceNode::pattern("first/*.json"))]))
        .add_tasks(jobs)
        .declare_resources(ResourceNode::group([("t2", ResourceNode::pattern("second/*.json"))]));
    assert_eq!(loader.len(), 5);

    let api = loader.run().await.expect("Sequence ordering violated");
    assert_eq!(*log.lock().unwrap(), vec!["j1", "j2", "j3"]);
    assert!(api.contains(&["t2", "b"]));
    assert_eq!(mock.calls().len(), 2);
}

#[tokio::test]
async fn first_error_aborts_the_queue() {
    let dir = fixture(&[("first/a.json", "1"), ("second/c.json", "3")]);
    let mut loader = text_loader(dir.path());
    let events = loader.subscribe();

    loader
        .declare_resources(ResourceNode::group([("t1", ResourceNode::pattern("first/*.json"))]))
        .add_task(task(|_: &mut ApiObject<String>| {
            Box::pin(async { Err(TaskError::msg("database unreachable")) })
        }))
        .declare_resources(ResourceNode::group([("t2", ResourceNode::pattern("second/*.json"))]));

    let mut callbacks = 0;
    let result = loader.run_with(|outcome| {
        callbacks += 1;
        assert!(outcome.is_err());
    }).await;

    assert!(matches!(result, Err(BootstrapError::Task { index: 1, .. })));
    assert_eq!(callbacks, 1);

    let events = drain_events(events);
    let loaded = loaded_files(&events);
    assert_eq!(loaded, vec![PathBuf::from("first/a.json")]);

    let failures = events
        .iter()
        .filter(|e| matches!(e, LifecycleEvent::Failed { .. }))
        .count();
    assert_eq!(failures, 1);
    assert!(!events.iter().any(|e| matches!(e, LifecycleEvent::Ready { .. })));
    assert!(events.last().unwrap().is_terminal());
}

#[tokio::test]
async fn later_merge_overwrites_earlier_key() {
    let dir = fixture(&[("a/one.json", "A1"), ("a/two.json", "A2"), ("b/three.json", "B3")]);
    let mut loader = text_loader(dir.path());
    loader
        .declare_resources(ResourceNode::group([("common", ResourceNode::pattern("a/*.json"))]))
        .declare_resources(ResourceNode::group([("common", ResourceNode::pattern("b/*.json"))]));

    let api = loader.run().await.unwrap();
    let common = api.group(&["common"]).unwrap();
    let keys: Vec<_> = common.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["three"]);
}

#[tokio::test]
async fn colliding_identifiers_keep_the_later_file() {
    let dir = fixture(&[("a/x.json", "from a"), ("b/x.json", "from b")]);
    let mut loader = text_loader(dir.path());
    loader.declare_resources(ResourceNode::group([("shared", ResourceNode::pattern("**/x.json"))]));

    let api = loader.run().await.unwrap();
    assert_eq!(api.group(&["shared"]).unwrap().len(), 1);
    assert_eq!(api.module(&["shared", "x"]).unwrap(), "from b");
}

#[tokio::test]
async fn flattened_collision_keeps_the_later_file() {
    let dir = fixture(&[("lib/a/x.json", "from a"), ("lib/b/x.json", "from b")]);
    let mut loader = text_loader(dir.path());
    loader.declare_resources(ResourceNode::group([(
        "lib",
        ResourceNode::group([("_", ResourceNode::pattern("lib/**/x.json"))]),
    )]));

    let api = loader.run().await.unwrap();
    assert_eq!(api.module(&["lib", "x"]).map(String::as_str), Some("from b"));
}

#[tokio::test]
async fn ready_event_carries_the_application_object() {
    let dir = fixture(&[("service/users.json", r#"{"login": true}"#)]);
    let seeded = ApiObject::new().with_module("version", json!("0.0.1"));
    let mut loader = Orchestrator::with_api(JsonLoader, seeded)
        .with_config(LoaderConfig::default().with_root(dir.path()));
    let events = loader.subscribe();
    loader.declare_resources(ResourceNode::group([("service", ResourceNode::pattern("service/*.json"))]));

    let api = loader.run().await.unwrap();
    assert_eq!(api.module(&["version"]), Some(&json!("0.0.1")));
    assert_eq!(api.module(&["service", "users"]), Some(&json!({"login": true})));

    let events = drain_events(events);
    assert_eq!(loaded_files(&events), vec![PathBuf::from("service/users.json")]);
    match events.last() {
        Some(LifecycleEvent::Ready { api: ready }) => assert_eq!(ready, &api),
        other => panic!("Expected a Ready event last, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_tree_is_a_configuration_error() {
    let dir = fixture(&[("svc/a.json", "{}")]);
    let mock = MockLoader::with_fallback(|p: &Path| p.display().to_string());
    let mut loader = Orchestrator::new(mock.clone())
        .with_config(LoaderConfig::default().with_root(dir.path()));
    loader.declare_resources(ResourceNode::group([
        ("svc", ResourceNode::pattern("svc/*.json")),
        (
            "client",
            ResourceNode::group([(
                "_",
                ResourceNode::group([("rest", ResourceNode::pattern("rest/*.json"))]),
            )]),
        ),
    ]));

    let err = loader.run().await.unwrap_err();
    assert!(matches!(err, BootstrapError::Configuration { ref path, .. } if path == "client._"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn tree_parsed_from_json_runs() {
    let dir = fixture(&[("client/rest.json", "rest"), ("client/soap/legacy.json", "soap")]);
    let tree = ResourceNode::from_json(
        &json!({ "client": { "_": "client/*.json", "soap": "client/soap/*.json" } }),
        "_",
    )
    .unwrap();

    let mut loader = text_loader(dir.path());
    loader.declare_resources(tree);
    let api = loader.run().await.unwrap();
    assert_eq!(api.module(&["client", "rest"]).unwrap(), "rest");
    assert_eq!(api.module(&["client", "soap", "legacy"]).unwrap(), "soap");
}

#[tokio::test]
async fn invalid_pattern_is_a_resolution_error() {
    let dir = fixture(&[]);
    let mut loader = text_loader(dir.path());
    loader.declare_resources(ResourceNode::group([("bad", ResourceNode::pattern("svc/***.json"))]));

    let err = loader.run().await.unwrap_err();
    assert!(matches!(err, BootstrapError::PatternResolution { .. }));
}

#[tokio::test]
async fn unparseable_module_is_a_load_error() {
    let dir = fixture(&[("service/broken.json", "{ nope")]);
    let mut loader = Orchestrator::new(JsonLoader)
        .with_config(LoaderConfig::default().with_root(dir.path()));
    loader.declare_resources(ResourceNode::group([("service", ResourceNode::pattern("service/*.json"))]));

    let (api, result) = loader.drain().await;
    let err = result.unwrap_err();
    assert!(matches!(err, BootstrapError::ModuleLoad { ref file, .. } if file == Path::new("service/broken.json")));
    assert!(!api.contains(&["service"]));
}

#[tokio::test]
async fn abandoned_continuation_fails_the_run() {
    let mut loader = Orchestrator::new(TextLoader);
    loader.add_task(continuation(|_: &mut ApiObject<String>, done: Done| drop(done)));

    let err = loader.run().await.unwrap_err();
    assert!(matches!(
        err,
        BootstrapError::Task { cause: TaskError::Abandoned, .. }
    ));
}

#[tokio::test]
async fn preloaded_resources_are_visible_to_tasks() {
    let dir = fixture(&[("common/config.json", "eur")]);
    let mut loader = text_loader(dir.path());
    let events = loader.subscribe();

    loader
        .preload_resources(&ResourceNode::group([("common", ResourceNode::pattern("common/*.json"))]))
        .await
        .unwrap();
    assert!(loader.api().contains(&["common", "config"]));
    assert!(loader.is_empty());

    loader.add_task(task(|api: &mut ApiObject<String>| {
        Box::pin(async move {
            match api.module(&["common", "config"]) {
                Some(currency) if currency == "eur" => Ok(()),
                _ => Err(TaskError::msg("config not preloaded")),
            }
        })
    }));
    loader.run().await.unwrap();

    let events = drain_events(events);
    assert_eq!(loaded_files(&events).len(), 1);
}

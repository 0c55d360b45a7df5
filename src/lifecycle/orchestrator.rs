use crate::framework::{
    ApiObject, BootstrapError, BoxedTask, GlobResolver, ModuleLoader, ResourceNode, Task,
};
use crate::lifecycle::config::LoaderConfig;
use crate::lifecycle::events::{EventBus, LifecycleEvent};
use crate::lifecycle::resource_job::ResourceJob;
use tokio::sync::mpsc;
use tracing::{error, info, info_span, Instrument};

/// One entry of the phase queue.
enum PhaseEntry<V: Send + 'static> {
    Resources(ResourceNode),
    Task(BoxedTask<V>),
}

impl<V: Send + 'static> PhaseEntry<V> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Resources(_) => "resources",
            Self::Task(_) => "task",
        }
    }
}

/// The bootstrap orchestrator.
///
/// `Orchestrator` is responsible for:
/// - **Declaration**: Collecting resource trees and init jobs into one ordered phase queue
/// - **Execution**: Draining that queue strictly in declaration order
/// - **Reporting**: Emitting [`LifecycleEvent`]s and handing back the application object
///
/// # Lifecycle
///
/// `Idle → Draining → {Ready | Failed}`. Declarations are accepted while idle.
/// `run()` consumes the orchestrator, so the queue is fixed once draining
/// starts and a second run needs a new instance.
///
/// # Example
///
/// ```ignore
/// let mut loader = Orchestrator::new(JsonLoader);
/// let mut events = loader.subscribe();
///
/// loader
///     .declare_resources(ResourceNode::group([("service", ResourceNode::pattern("app/service/*.json"))]))
///     .add_task(task(|api| Box::pin(async move { /* open the database */ Ok(()) })))
///     .declare_resources(ResourceNode::group([("public", ResourceNode::pattern("app/public/**/*.json"))]));
///
/// let api = loader.run().await?;
/// ```
pub struct Orchestrator<L: ModuleLoader> {
    api: ApiObject<L::Module>,
    queue: Vec<PhaseEntry<L::Module>>,
    loader: L,
    config: LoaderConfig,
    events: EventBus<L::Module>,
}

impl<L: ModuleLoader> Orchestrator<L> {
    /// Creates an idle orchestrator with an empty application object.
    pub fn new(loader: L) -> Self {
        Self::with_api(loader, ApiObject::new())
    }

    /// Creates an idle orchestrator around a pre-seeded application object.
    pub fn with_api(loader: L, api: ApiObject<L::Module>) -> Self {
        Self {
            api,
            queue: Vec::new(),
            loader,
            config: LoaderConfig::default(),
            events: EventBus::new(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// The application object as built so far.
    pub fn api(&self) -> &ApiObject<L::Module> {
        &self.api
    }

    /// Registers an observer. Subscribe before `run()` to see every event.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<LifecycleEvent<L::Module>> {
        self.events.subscribe()
    }

    /// Appends one resource job to the queue.
    pub fn declare_resources(&mut self, tree: ResourceNode) -> &mut Self {
        self.queue.push(PhaseEntry::Resources(tree));
        self
    }

    /// Appends one init job to the queue.
    pub fn add_task(&mut self, task: impl Task<L::Module>) -> &mut Self {
        self.queue.push(PhaseEntry::Task(Box::new(task)));
        self
    }

    /// Appends several init jobs, keeping their order.
    pub fn add_tasks<I>(&mut self, tasks: I) -> &mut Self
    where
        I: IntoIterator<Item = BoxedTask<L::Module>>,
    {
        self.queue.extend(tasks.into_iter().map(PhaseEntry::Task));
        self
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Resolves `tree` right away and merges it, outside the queue.
    ///
    /// Emits `ResourceLoaded` events like a queued job, but a failure is
    /// returned here instead of ending a run.
    pub async fn preload_resources(&mut self, tree: &ResourceNode) -> Result<&mut Self, BootstrapError> {
        let resolver = resolver_for(&self.config)?;
        let job = ResourceJob {
            resolver: &resolver,
            loader: &self.loader,
            events: &self.events,
            flatten_marker: &self.config.flatten_marker,
        };
        let registry = job.resolve(tree).instrument(info_span!("preload")).await?;
        self.api.merge(registry);
        Ok(self)
    }

    /// Drains the queue and returns the application object on success.
    pub async fn run(self) -> Result<ApiObject<L::Module>, BootstrapError> {
        self.run_with(|_| ()).await
    }

    /// Like [`Orchestrator::run`], also invoking `done` once with the outcome.
    pub async fn run_with<F>(self, done: F) -> Result<ApiObject<L::Module>, BootstrapError>
    where
        F: FnOnce(Result<&ApiObject<L::Module>, &BootstrapError>),
    {
        let (api, result) = self.drain().await;
        match result {
            Ok(()) => {
                done(Ok(&api));
                Ok(api)
            }
            Err(error) => {
                done(Err(&error));
                Err(error)
            }
        }
    }

    /// Drains the queue, returning whatever was built alongside the outcome.
    ///
    /// After a failure the object holds an unspecified subset of what was
    /// declared.
    pub async fn drain(self) -> (ApiObject<L::Module>, Result<(), BootstrapError>) {
        let Self {
            mut api,
            queue,
            loader,
            config,
            events,
        } = self;

        let result = drain_queue(&mut api, queue, &loader, &config, &events).await;

        match &result {
            Ok(()) => {
                info!(modules = api.module_count(), "Application ready");
                if events.has_subscribers() {
                    events.emit(LifecycleEvent::Ready { api: api.clone() });
                }
            }
            Err(e) => {
                error!(error = %e, "Bootstrap failed");
                events.emit(LifecycleEvent::Failed { error: e.clone() });
            }
        }
        (api, result)
    }
}

fn resolver_for(config: &LoaderConfig) -> Result<GlobResolver, BootstrapError> {
    Ok(GlobResolver::new(config.working_root()?).files_only(config.files_only))
}

async fn drain_queue<L: ModuleLoader>(
    api: &mut ApiObject<L::Module>,
    queue: Vec<PhaseEntry<L::Module>>,
    loader: &L,
    config: &LoaderConfig,
    events: &EventBus<L::Module>,
) -> Result<(), BootstrapError> {
    let resolver = resolver_for(config)?;
    let job = ResourceJob {
        resolver: &resolver,
        loader,
        events,
        flatten_marker: &config.flatten_marker,
    };
    info!(entries = queue.len(), root = %resolver.root().display(), "Bootstrap started");

    for (index, entry) in queue.into_iter().enumerate() {
        let span = info_span!("phase", index, kind = entry.kind());
        match entry {
            PhaseEntry::Resources(tree) => {
                let registry = job.resolve(&tree).instrument(span.clone()).await?;
                span.in_scope(|| info!(keys = registry.len(), "Resources merged"));
                api.merge(registry);
            }
            PhaseEntry::Task(task) => {
                task.run(api)
                    .instrument(span.clone())
                    .await
                    .map_err(|cause| BootstrapError::Task { index, cause })?;
                span.in_scope(|| info!("Task complete"));
            }
        }
    }
    Ok(())
}

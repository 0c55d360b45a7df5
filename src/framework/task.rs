//! # Init Jobs
//!
//! An init job ([`Task`]) is an arbitrary asynchronous bootstrap step: open a
//! connection, warm a cache, start a plugin. It receives the application object
//! built so far and reports success or failure exactly once, by returning.
//!
//! Two ways to write one:
//!
//! - [`task`]: an async closure returning `Result<(), TaskError>`.
//! - [`continuation`]: a callback that receives a single-use [`Done`] handle,
//!   for steps that finish from somewhere else (a spawned task, a timer).
//!
//! ```rust
//! use loader_recipe::framework::{task, continuation, ApiObject, TaskError};
//!
//! let connect = task(|api: &mut ApiObject<String>| Box::pin(async move {
//!     api.insert("db", loader_recipe::framework::ApiNode::Module("connected".into()));
//!     Ok::<_, TaskError>(())
//! }));
//!
//! let warm_cache = continuation(|_api: &mut ApiObject<String>, done| {
//!     tokio::spawn(async move { done.ok() });
//! });
//! # let _ = (connect, warm_cache);
//! ```

use crate::framework::error::TaskError;
use crate::framework::registry::ApiObject;
use async_trait::async_trait;
use futures::future::BoxFuture;
use tokio::sync::oneshot;

/// The future returned by closure tasks.
pub type TaskFuture<'a> = BoxFuture<'a, Result<(), TaskError>>;

/// A boxed init job, as stored in the phase queue.
pub type BoxedTask<V> = Box<dyn Task<V>>;

/// One unit of asynchronous bootstrap work.
#[async_trait]
pub trait Task<V: Send + 'static>: Send + 'static {
    /// Runs the job. The returned result is its one completion signal.
    async fn run(self: Box<Self>, api: &mut ApiObject<V>) -> Result<(), TaskError>;
}

/// A task built from an async closure. See [`task`].
pub struct FnTask<F>(F);

/// Wraps an async closure as a [`Task`].
pub fn task<V, F>(f: F) -> FnTask<F>
where
    V: Send + 'static,
    F: for<'a> FnOnce(&'a mut ApiObject<V>) -> TaskFuture<'a> + Send + 'static,
{
    FnTask(f)
}

#[async_trait]
impl<V, F> Task<V> for FnTask<F>
where
    V: Send + 'static,
    F: for<'a> FnOnce(&'a mut ApiObject<V>) -> TaskFuture<'a> + Send + 'static,
{
    async fn run(self: Box<Self>, api: &mut ApiObject<V>) -> Result<(), TaskError> {
        let FnTask(f) = *self;
        f(api).await
    }
}

/// Single-use completion handle for [`continuation`] tasks.
///
/// Every method consumes the handle, so a job can signal at most once.
/// Dropping it without signaling fails the job with [`TaskError::Abandoned`].
#[derive(Debug)]
pub struct Done {
    respond_to: oneshot::Sender<Result<(), TaskError>>,
}

impl Done {
    pub fn ok(self) {
        self.finish(Ok(()));
    }

    pub fn fail(self, error: TaskError) {
        self.finish(Err(error));
    }

    pub fn finish(self, result: Result<(), TaskError>) {
        // The receiver is gone only if the run itself was dropped.
        let _ = self.respond_to.send(result);
    }
}

/// A callback-style task. See [`continuation`].
pub struct ContinuationTask<F>(F);

/// Wraps a callback that signals completion through a [`Done`] handle.
pub fn continuation<V, F>(f: F) -> ContinuationTask<F>
where
    V: Send + 'static,
    F: FnOnce(&mut ApiObject<V>, Done) + Send + 'static,
{
    ContinuationTask(f)
}

#[async_trait]
impl<V, F> Task<V> for ContinuationTask<F>
where
    V: Send + 'static,
    F: FnOnce(&mut ApiObject<V>, Done) + Send + 'static,
{
    async fn run(self: Box<Self>, api: &mut ApiObject<V>) -> Result<(), TaskError> {
        let (respond_to, response) = oneshot::channel();
        let ContinuationTask(f) = *self;
        f(api, Done { respond_to });
        response.await.map_err(|_| TaskError::Abandoned)?
    }
}

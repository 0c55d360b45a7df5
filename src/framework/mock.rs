//! # Mock Loader
//!
//! Utilities for testing resource trees without real module content.
//!
//! [`MockLoader`] answers loads from a list of expectations keyed by path
//! suffix, records every file it was asked for, and can inject failures.
//! Files without an expectation fall back to a default value builder, or fail
//! if none is set.
//!
//! ```ignore
//! let mut mock = MockLoader::<String>::new();
//! mock.expect_load("service/users.json").return_ok("users".to_string());
//! mock.expect_load("service/broken.json").return_err("corrupt module");
//!
//! let mut loader = Orchestrator::new(mock.clone());
//! // ... declare resources, run ...
//! mock.verify(); // Ensures every expectation was loaded
//! ```

use crate::framework::error::BoxError;
use crate::framework::loader::ModuleLoader;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

type Fallback<V> = Arc<dyn Fn(&Path) -> V + Send + Sync>;

struct Expectation<V> {
    suffix: PathBuf,
    response: Result<V, String>,
    hits: usize,
}

struct MockState<V> {
    expectations: Vec<Expectation<V>>,
    calls: Vec<PathBuf>,
}

/// A scripted [`ModuleLoader`] for tests. Clones share state.
pub struct MockLoader<V> {
    state: Arc<Mutex<MockState<V>>>,
    fallback: Option<Fallback<V>>,
}

impl<V> Clone for MockLoader<V> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            fallback: self.fallback.clone(),
        }
    }
}

impl<V> Default for MockLoader<V> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                expectations: Vec::new(),
                calls: Vec::new(),
            })),
            fallback: None,
        }
    }
}

impl<V: Clone + Send + Sync + Debug + 'static> MockLoader<V> {
    /// Creates a mock with no expectations; every load fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock that answers unexpected files with `fallback(file)`.
    pub fn with_fallback(fallback: impl Fn(&Path) -> V + Send + Sync + 'static) -> Self {
        Self {
            fallback: Some(Arc::new(fallback)),
            ..Self::default()
        }
    }

    /// Expects a load of any file whose path ends with `suffix`.
    pub fn expect_load(&mut self, suffix: impl Into<PathBuf>) -> LoadExpectationBuilder<V> {
        LoadExpectationBuilder {
            suffix: suffix.into(),
            state: self.state.clone(),
        }
    }

    /// Every file loaded so far, in call order.
    pub fn calls(&self) -> Vec<PathBuf> {
        self.lock().calls.clone()
    }

    /// Panics unless every expectation was hit at least once.
    pub fn verify(&self) {
        let state = self.lock();
        let missed: Vec<_> = state
            .expectations
            .iter()
            .filter(|e| e.hits == 0)
            .map(|e| e.suffix.display().to_string())
            .collect();
        if !missed.is_empty() {
            panic!("Not all expectations were met. Never loaded: {missed:?}");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState<V>> {
        // A poisoned lock only means another test thread panicked mid-call.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Builder for load expectations.
pub struct LoadExpectationBuilder<V> {
    suffix: PathBuf,
    state: Arc<Mutex<MockState<V>>>,
}

impl<V> LoadExpectationBuilder<V> {
    pub fn return_ok(self, value: V) {
        self.push(Ok(value));
    }

    pub fn return_err(self, message: impl Into<String>) {
        self.push(Err(message.into()));
    }

    fn push(self, response: Result<V, String>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.expectations.push(Expectation {
            suffix: self.suffix,
            response,
            hits: 0,
        });
    }
}

#[async_trait]
impl<V: Clone + Send + Sync + Debug + 'static> ModuleLoader for MockLoader<V> {
    type Module = V;

    async fn load(&self, file: &Path) -> Result<V, BoxError> {
        let mut state = self.lock();
        state.calls.push(file.to_path_buf());
        if let Some(expectation) = state
            .expectations
            .iter_mut()
            .find(|e| file.ends_with(&e.suffix))
        {
            expectation.hits += 1;
            return expectation.response.clone().map_err(BoxError::from);
        }
        drop(state);

        match &self.fallback {
            Some(fallback) => Ok(fallback(file)),
            None => Err(format!("unexpected load of {}", file.display()).into()),
        }
    }
}

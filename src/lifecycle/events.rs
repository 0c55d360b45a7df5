//! # Lifecycle Events
//!
//! Observers subscribe before `run()` and receive every [`LifecycleEvent`] on
//! their own unbounded channel, so emitting never waits on a slow consumer.
//!
//! Per run there are zero or more `ResourceLoaded` events and exactly one
//! terminal event (`Failed` or `Ready`), always last.

use crate::framework::{ApiObject, BootstrapError};
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum LifecycleEvent<V> {
    /// A module file was loaded. `file` is relative to the working root.
    ResourceLoaded { file: PathBuf },
    /// The run stopped at its first error.
    Failed { error: BootstrapError },
    /// Every queue entry completed.
    Ready { api: ApiObject<V> },
}

impl<V> LifecycleEvent<V> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::ResourceLoaded { .. })
    }
}

/// Fan-out of events to every subscriber.
pub(crate) struct EventBus<V> {
    subscribers: Vec<mpsc::UnboundedSender<LifecycleEvent<V>>>,
}

impl<V: Clone> EventBus<V> {
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub(crate) fn subscribe(&mut self) -> mpsc::UnboundedReceiver<LifecycleEvent<V>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.push(sender);
        receiver
    }

    pub(crate) fn has_subscribers(&self) -> bool {
        self.subscribers.iter().any(|s| !s.is_closed())
    }

    pub(crate) fn emit(&self, event: LifecycleEvent<V>) {
        for subscriber in &self.subscribers {
            // Dropped receivers just stop listening.
            let _ = subscriber.send(event.clone());
        }
    }
}

//! # Resource Jobs
//!
//! One resource job turns a [`ResourceNode`] into a fresh [`Registry`] with the
//! same shape, every pattern replaced by the modules it matched:
//!
//! 1. Validate the tree (configuration errors surface before any I/O).
//! 2. Collect the pattern leaves.
//! 3. Resolve and load all of them concurrently, stopping at the first error.
//! 4. Rebuild the tree from the results. Flatten-marker matches land in the
//!    parent group; every other leaf becomes a nested group, even when empty.
//!
//! The caller's tree is never mutated. Merging the rebuilt registry into the
//! application object is the orchestrator's job.

use crate::framework::{
    ApiNode, BootstrapError, BoxError, FileLocation, GlobResolver, ModuleLoader, Registry,
    ResourceNode,
};
use crate::lifecycle::events::{EventBus, LifecycleEvent};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, debug_span, Instrument};

/// Modules resolved from one pattern, in load order.
type Resolved<V> = Vec<(String, V)>;

pub(crate) struct ResourceJob<'a, L: ModuleLoader> {
    pub(crate) resolver: &'a GlobResolver,
    pub(crate) loader: &'a L,
    pub(crate) events: &'a EventBus<L::Module>,
    pub(crate) flatten_marker: &'a str,
}

impl<L: ModuleLoader> ResourceJob<'_, L> {
    pub(crate) async fn resolve(&self, tree: &ResourceNode) -> Result<Registry<L::Module>, BootstrapError> {
        tree.validate(self.flatten_marker)?;

        let leaves = tree.leaves();
        let resolved = try_join_all(leaves.iter().map(|leaf| {
            let span = debug_span!("leaf", path = %leaf.path.join("."), pattern = %leaf.pattern);
            self.resolve_pattern(&leaf.pattern).instrument(span)
        }))
        .await?;

        let mut results = resolved.into_iter();
        Ok(match self.rebuild(tree, &mut results) {
            ApiNode::Group(registry) => registry,
            ApiNode::Module(_) => Registry::new(),
        })
    }

    async fn resolve_pattern(&self, pattern: &str) -> Result<Resolved<L::Module>, BootstrapError> {
        let files = self.resolver.resolve(pattern).await?;
        try_join_all(files.iter().map(|file| self.load(file))).await
    }

    async fn load(&self, file: &FileLocation) -> Result<(String, L::Module), BootstrapError> {
        let identifier = file.identifier().ok_or_else(|| {
            BootstrapError::module(&file.relative, Arc::from(BoxError::from("file has no name")))
        })?;
        let module = self
            .loader
            .load(&file.path)
            .await
            .map_err(|e| BootstrapError::module(&file.relative, Arc::from(e)))?;

        debug!(file = %file.relative.display(), identifier = %identifier, "Resource loaded");
        self.events.emit(LifecycleEvent::ResourceLoaded {
            file: file.relative.clone(),
        });
        Ok((identifier, module))
    }

    /// Consumes `results` in the same depth-first key order as
    /// [`ResourceNode::leaves`].
    fn rebuild(
        &self,
        node: &ResourceNode,
        results: &mut impl Iterator<Item = Resolved<L::Module>>,
    ) -> ApiNode<L::Module> {
        match node {
            ResourceNode::Pattern(_) => {
                // Collect into a map: a repeated identifier keeps the later module.
                let modules = results.next().unwrap_or_default();
                ApiNode::Group(
                    modules
                        .into_iter()
                        .map(|(id, module)| (id, ApiNode::Module(module)))
                        .collect(),
                )
            }
            ResourceNode::Group(children) => {
                let mut group = Registry::new();
                let mut flattened = Registry::new();
                for (key, child) in children {
                    if key == self.flatten_marker && matches!(child, ResourceNode::Pattern(_)) {
                        // A repeated identifier keeps the later module here too.
                        flattened.extend(
                            results
                                .next()
                                .unwrap_or_default()
                                .into_iter()
                                .map(|(id, module)| (id, ApiNode::Module(module))),
                        );
                        continue;
                    }
                    group.insert(key.clone(), self.rebuild(child, results));
                }
                // Named siblings win over flattened identifiers.
                for (id, node) in flattened {
                    group.entry(id).or_insert(node);
                }
                ApiNode::Group(group)
            }
        }
    }
}

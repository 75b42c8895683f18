//! Generator Service - resolves and runs generators.
//!
//! One top-level call builds an [`Invocation`] that threads the resource tree
//! through every nested generator:
//! 1. Resolve the generator by name
//! 2. Validate its properties against the descriptor schema
//! 3. Run the generator (which may invoke sub-generators)
//! 4. Apply the descriptor's transform actions
//!
//! The tree is moved in and only handed back on success, so a failure at
//! any step discards every mutation made by that invocation.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::{
    application::registry::GeneratorRegistry,
    domain::{
        DomainError, GeneratorInvocationResult, Properties, ResourceTree, TransformEngine,
    },
    error::KilnResult,
};

/// Runs generators from an immutable registry.
#[derive(Debug, Clone)]
pub struct GeneratorService {
    registry: Arc<GeneratorRegistry>,
    engine: TransformEngine,
}

impl GeneratorService {
    pub fn new(registry: Arc<GeneratorRegistry>) -> Self {
        Self {
            registry,
            engine: TransformEngine::new(),
        }
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }

    /// Run `name` on `tree` and return the resulting tree.
    ///
    /// `extra` is visible unchanged to every nested generator and is not
    /// schema-checked.
    pub fn apply(
        &self,
        name: &str,
        tree: ResourceTree,
        props: &Properties,
        extra: &Properties,
    ) -> KilnResult<ResourceTree> {
        self.invoke(name, tree, props, extra).map(|result| result.tree)
    }

    /// Like [`apply`](Self::apply) but also returns the derived properties.
    #[instrument(skip_all, fields(generator = %name))]
    pub fn invoke(
        &self,
        name: &str,
        tree: ResourceTree,
        props: &Properties,
        extra: &Properties,
    ) -> KilnResult<GeneratorInvocationResult> {
        info!("Invoking generator");
        let mut invocation = Invocation {
            service: self,
            extra,
            stack: Vec::new(),
        };
        let result = invocation.run(name, tree, props)?;
        info!(entries = result.tree.len(), "Generator completed");
        Ok(result)
    }
}

/// Handle passed to a running generator for nested calls.
///
/// Tracks the active call chain so that a generator reachable from itself
/// fails with [`DomainError::InvocationCycle`].
pub struct Invocation<'a> {
    service: &'a GeneratorService,
    extra: &'a Properties,
    stack: Vec<String>,
}

impl<'a> Invocation<'a> {
    /// Invocation-wide context shared by every nested generator.
    pub fn extra(&self) -> &Properties {
        self.extra
    }

    /// Nesting level of the generator currently running (0 for top level).
    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// Call a sub-generator; it observes and returns the tree it is given.
    pub fn invoke(
        &mut self,
        name: &str,
        tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<ResourceTree> {
        self.run(name, tree, props).map(|result| result.tree)
    }

    #[instrument(skip_all, fields(generator = %name, depth = self.stack.len()))]
    fn run(
        &mut self,
        name: &str,
        tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<GeneratorInvocationResult> {
        let generator = self.service.registry.get(name)?;

        if self.stack.iter().any(|active| active == name) {
            let mut chain = self.stack.clone();
            chain.push(name.to_string());
            return Err(DomainError::InvocationCycle {
                chain: chain.join(" -> "),
            }
            .into());
        }

        let descriptor = generator.descriptor();
        descriptor.schema().validate(props)?;

        self.stack.push(name.to_string());
        let outcome = generator.generate(self, tree, props);
        self.stack.pop();
        let result = outcome?;

        debug!(
            transforms = descriptor.transforms().len(),
            "Applying transforms"
        );
        let tree = self.service.engine.apply(result.tree, descriptor.transforms())?;

        Ok(GeneratorInvocationResult::new(tree, result.derived))
    }
}

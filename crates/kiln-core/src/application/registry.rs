//! Immutable name-to-generator registry.
//!
//! Built once at startup with [`GeneratorRegistryBuilder`] and shared behind
//! an `Arc`. Nothing can be added after `build()`.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::application::{ApplicationError, ports::Generator};
use crate::domain::{DomainError, GeneratorDescriptor};

static GLOBAL: OnceLock<Arc<GeneratorRegistry>> = OnceLock::new();

pub struct GeneratorRegistry {
    generators: BTreeMap<String, Arc<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn builder() -> GeneratorRegistryBuilder {
        GeneratorRegistryBuilder::default()
    }

    /// Resolve a generator by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Generator>, DomainError> {
        self.generators
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::UnknownGenerator { name: name.into() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Descriptors sorted by name.
    pub fn descriptors(&self) -> impl Iterator<Item = &GeneratorDescriptor> {
        self.generators.values().map(|g| g.descriptor())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Publish `registry` as the process-wide instance. Only the first call succeeds.
    pub fn install_global(registry: Arc<Self>) -> Result<(), ApplicationError> {
        GLOBAL
            .set(registry)
            .map_err(|_| ApplicationError::RegistryAlreadyInstalled)
    }

    /// The process-wide instance, if one was installed.
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.generators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Default)]
pub struct GeneratorRegistryBuilder {
    generators: BTreeMap<String, Arc<dyn Generator>>,
}

impl GeneratorRegistryBuilder {
    /// Add a generator under its descriptor name.
    pub fn register(self, generator: impl Generator + 'static) -> Result<Self, DomainError> {
        self.register_shared(Arc::new(generator))
    }

    pub fn register_shared(mut self, generator: Arc<dyn Generator>) -> Result<Self, DomainError> {
        let name = generator.descriptor().name().to_string();
        if self.generators.contains_key(&name) {
            return Err(DomainError::DuplicateGenerator { name });
        }
        debug!(generator = %name, "Registered generator");
        self.generators.insert(name, generator);
        Ok(self)
    }

    pub fn build(self) -> Arc<GeneratorRegistry> {
        Arc::new(GeneratorRegistry {
            generators: self.generators,
        })
    }
}

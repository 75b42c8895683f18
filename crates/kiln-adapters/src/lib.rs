//! Infrastructure adapters for Kiln.
//!
//! This crate implements the ports defined in `kiln-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod archive;
pub mod filesystem;
pub mod generators;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use kiln_core::application::GeneratorRegistry;
use kiln_core::error::KilnResult;

// Re-export commonly used adapters
pub use archive::ZipCodec;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use generators::{CatalogError, CatalogLoader, DeclarativeGenerator};

/// Registry with the built-ins plus every generator found in `catalog`.
///
/// A missing catalog directory is logged and ignored; a catalog generator
/// that reuses a registered name is an error.
pub fn build_registry(catalog: Option<&Path>) -> KilnResult<Arc<GeneratorRegistry>> {
    let mut builder = generators::register_builtins(GeneratorRegistry::builder())?;

    if let Some(dir) = catalog {
        match CatalogLoader::new(dir).load_all() {
            Ok(loaded) => {
                info!(count = loaded.len(), dir = %dir.display(), "Loaded generator catalog");
                for generator in loaded {
                    builder = builder.register(generator)?;
                }
            }
            Err(CatalogError::MissingDirectory(path)) => {
                warn!(dir = %path.display(), "Catalog directory not found; using built-ins only");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(builder.build())
}

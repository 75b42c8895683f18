//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `kiln-adapters` crate provides implementations.

use std::path::Path;

use crate::application::services::generator_service::Invocation;
use crate::domain::{
    FileMode, GeneratorDescriptor, GeneratorInvocationResult, Properties, ResourceTree,
};
use crate::error::KilnResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `kiln_adapters::filesystem::LocalFilesystem` (production)
/// - `kiln_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Write content to a file, replacing any previous content.
    fn write_file(&self, path: &Path, content: &[u8]) -> KilnResult<()>;

    /// Set POSIX permission bits. A no-op where the platform has none.
    fn set_permissions(&self, path: &Path, mode: FileMode) -> KilnResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    ///
    /// A directory that does not exist is a no-op, as are entries that
    /// disappear while the removal is in progress.
    fn remove_dir_all(&self, path: &Path) -> KilnResult<()>;

    /// Read a directory into a tree relative to `root`, with modes.
    fn read_tree(&self, root: &Path) -> KilnResult<ResourceTree>;
}

/// Port for converting trees to and from archive bytes.
///
/// Implemented by `kiln_adapters::archive::ZipCodec`.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveCodec: Send + Sync {
    /// Serialize `tree` under `root_label` (empty for no prefix).
    fn zip(&self, root_label: &str, tree: &ResourceTree) -> KilnResult<Vec<u8>>;

    /// Extract `bytes` into `output_dir`, returning what was written
    /// relative to `output_dir`.
    fn unzip(&self, bytes: &[u8], output_dir: &Path) -> KilnResult<ResourceTree>;
}

/// A named unit of project generation.
///
/// `generate` receives the tree by value and hands it back inside the
/// result; nested generators are reached through `invocation`.
pub trait Generator: Send + Sync {
    fn descriptor(&self) -> &GeneratorDescriptor;

    fn generate(
        &self,
        invocation: &mut Invocation<'_>,
        tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<GeneratorInvocationResult>;
}

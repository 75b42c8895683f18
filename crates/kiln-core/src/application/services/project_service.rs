//! Project Service - main application orchestrator.
//!
//! Connects generator runs to the outside world:
//! - generate a project and serialize it as an archive
//! - import an uploaded archive as the seed tree of a run
//! - materialize a tree on disk, rolling back on failure

use std::path::Path;

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{ArchiveCodec, Filesystem},
        services::generator_service::GeneratorService,
    },
    domain::{GeneratorCategory, Properties, ResourceTree},
    error::KilnResult,
};

/// Information about a generator for display purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorInfo {
    pub name: String,
    pub category: GeneratorCategory,
    pub description: String,
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub transforms: usize,
}

/// Main project service.
pub struct ProjectService {
    generators: GeneratorService,
    archive: Box<dyn ArchiveCodec>,
    filesystem: Box<dyn Filesystem>,
}

impl ProjectService {
    pub fn new(
        generators: GeneratorService,
        archive: Box<dyn ArchiveCodec>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            generators,
            archive,
            filesystem,
        }
    }

    pub fn generators(&self) -> &GeneratorService {
        &self.generators
    }

    /// Run a generator on `seed`.
    pub fn generate(
        &self,
        name: &str,
        seed: ResourceTree,
        props: &Properties,
        extra: &Properties,
    ) -> KilnResult<ResourceTree> {
        self.generators.apply(name, seed, props, extra)
    }

    /// Run a generator and serialize the result under `root_label`.
    #[instrument(skip_all, fields(generator = %name, root = %root_label))]
    pub fn generate_archive(
        &self,
        name: &str,
        root_label: &str,
        seed: ResourceTree,
        props: &Properties,
        extra: &Properties,
    ) -> KilnResult<Vec<u8>> {
        let tree = self.generate(name, seed, props, extra)?;
        self.export_archive(root_label, &tree)
    }

    /// Serialize an existing tree under `root_label`.
    pub fn export_archive(&self, root_label: &str, tree: &ResourceTree) -> KilnResult<Vec<u8>> {
        let bytes = self.archive.zip(root_label, tree)?;
        info!(bytes = bytes.len(), entries = tree.len(), "Archive written");
        Ok(bytes)
    }

    /// Extract an uploaded archive into a tree.
    ///
    /// Extraction happens in a fresh `kiln-import-<uuid>` directory under
    /// `scratch_root`, which is always removed afterwards. An archive with a
    /// single top-level directory is rebased onto it.
    #[instrument(skip_all, fields(bytes = bytes.len(), scratch_root = %scratch_root.display()))]
    pub fn import_archive(&self, bytes: &[u8], scratch_root: &Path) -> KilnResult<ResourceTree> {
        let scratch = scratch_root.join(format!("kiln-import-{}", Uuid::new_v4()));
        self.filesystem.create_dir_all(&scratch)?;

        let extracted = self.archive.unzip(bytes, &scratch);
        self.cleanup(&scratch);
        let tree = extracted?;

        let top_level = tree.top_level();
        if let [single] = top_level.as_slice() {
            if single.is_directory() {
                let root = single.path().to_string();
                info!(root = %root, "Rebasing import on its single top-level directory");
                return Ok(tree.subtree(&root)?);
            }
        }
        Ok(tree)
    }

    /// Read a directory from disk and serialize it under `root_label`.
    pub fn pack_directory(&self, dir: &Path, root_label: &str) -> KilnResult<Vec<u8>> {
        let tree = self.filesystem.read_tree(dir)?;
        self.export_archive(root_label, &tree)
    }

    /// Write `tree` under `output_dir`.
    ///
    /// An existing `output_dir` is an error unless `force` is set, in which
    /// case it is removed first. On a failed write everything under
    /// `output_dir` is removed again.
    #[instrument(skip_all, fields(output = %output_dir.display(), entries = tree.len()))]
    pub fn materialize(&self, tree: &ResourceTree, output_dir: &Path, force: bool) -> KilnResult<()> {
        if self.filesystem.exists(output_dir) {
            if !force {
                return Err(ApplicationError::OutputExists {
                    path: output_dir.to_path_buf(),
                }
                .into());
            }
            warn!("Removing existing output (--force)");
            self.filesystem.remove_dir_all(output_dir)?;
        }

        match self.write_all(tree, output_dir) {
            Ok(()) => {
                info!("Successfully wrote all files");
                Ok(())
            }
            Err(e) => {
                warn!("Write failed, attempting rollback");
                self.rollback(output_dir);
                Err(e)
            }
        }
    }

    /// All registered generators, sorted by name.
    pub fn list_generators(&self) -> Vec<GeneratorInfo> {
        self.generators
            .registry()
            .descriptors()
            .map(|d| GeneratorInfo {
                name: d.name().to_string(),
                category: d.category(),
                description: d.description().to_string(),
                required: d
                    .schema()
                    .specs()
                    .iter()
                    .filter(|s| s.required)
                    .map(|s| s.key.clone())
                    .collect(),
                optional: d
                    .schema()
                    .specs()
                    .iter()
                    .filter(|s| !s.required)
                    .map(|s| s.key.clone())
                    .collect(),
                transforms: d.transforms().len(),
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn write_all(&self, tree: &ResourceTree, output_dir: &Path) -> KilnResult<()> {
        self.filesystem.create_dir_all(output_dir)?;

        for resource in tree {
            let path = resource.path().to_path_under(output_dir);
            if resource.is_directory() {
                self.filesystem.create_dir_all(&path)?;
                continue;
            }

            if let Some(parent) = path.parent() {
                self.filesystem.create_dir_all(parent)?;
            }
            self.filesystem.write_file(&path, resource.content())?;

            if resource.mode() != crate::domain::FileMode::FILE {
                self.filesystem.set_permissions(&path, resource.mode())?;
            }
        }

        Ok(())
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(root) {
            warn!(
                error = %e,
                path = %root.display(),
                "Rollback failed"
            );
        } else {
            info!("Rollback successful");
        }
    }

    fn cleanup(&self, scratch: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(scratch) {
            warn!(
                error = %e,
                path = %scratch.display(),
                "Failed to remove scratch directory"
            );
        }
    }
}

//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use kiln_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{FileMode, RelativePath, Resource, ResourceTree},
    error::{KilnError, KilnResult},
};

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, (Vec<u8>, FileMode)>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<Vec<u8>> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).map(|(content, _)| content.clone())
    }

    /// Mode of a file (testing helper).
    pub fn mode(&self, path: &Path) -> Option<FileMode> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).map(|(_, mode)| *mode)
    }

    /// List all files.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self) -> KilnResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> KilnResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> KilnError {
    KilnError::Internal {
        message: "memory filesystem lock poisoned".into(),
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        let mut inner = self.write()?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if inner.files.contains_key(&current) {
                return Err(ApplicationError::FilesystemError {
                    path: current,
                    reason: "A file exists at this path".into(),
                }
                .into());
            }
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> KilnResult<()> {
        let mut inner = self.write()?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner
            .files
            .insert(path.to_path_buf(), (content.to_vec(), FileMode::FILE));
        Ok(())
    }

    fn set_permissions(&self, path: &Path, mode: FileMode) -> KilnResult<()> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        match inner.files.get_mut(path) {
            Some((_, current)) => {
                *current = mode;
                Ok(())
            }
            None if inner.directories.contains(path) => Ok(()),
            None => Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "No such file".into(),
            }
            .into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_dir_all(&self, path: &Path) -> KilnResult<()> {
        let mut inner = self.write()?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));

        Ok(())
    }

    fn read_tree(&self, root: &Path) -> KilnResult<ResourceTree> {
        let inner = self.read()?;
        let mut tree = ResourceTree::new();

        for dir in &inner.directories {
            if let Ok(relative) = dir.strip_prefix(root) {
                if relative.as_os_str().is_empty() {
                    continue;
                }
                tree.insert(Resource::directory(RelativePath::from_path(relative)?))?;
            }
        }
        for (file, (content, mode)) in &inner.files {
            if let Ok(relative) = file.strip_prefix(root) {
                let path = RelativePath::from_path(relative)?;
                tree.insert(Resource::file(path, content.clone(), *mode))?;
            }
        }

        Ok(tree)
    }
}

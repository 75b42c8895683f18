//! Local filesystem adapter using std::fs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use kiln_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{FileMode, RelativePath, Resource, ResourceTree},
    error::{KilnError, KilnResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> KilnResult<()> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> KilnResult<()> {
        fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn set_permissions(&self, path: &Path, mode: FileMode) -> KilnResult<()> {
        apply_mode(path, mode)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_dir_all(&self, path: &Path) -> KilnResult<()> {
        delete_directory(path)
    }

    fn read_tree(&self, root: &Path) -> KilnResult<ResourceTree> {
        read_tree(root)
    }
}

/// Read `root` recursively into a tree of paths relative to it.
///
/// Entries are visited in file-name order. Symbolic links are skipped.
pub fn read_tree(root: &Path) -> KilnResult<ResourceTree> {
    let mut tree = ResourceTree::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| map_io_error(entry.path(), io::Error::other(e), "relativize path"))?;
        let path = RelativePath::from_path(relative)?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            tree.insert(Resource::directory(path))?;
        } else if file_type.is_file() {
            let content =
                fs::read(entry.path()).map_err(|e| map_io_error(entry.path(), e, "read file"))?;
            let mode = read_mode(entry.path())?;
            tree.insert(Resource::file(path, content, mode))?;
        } else {
            debug!(path = %entry.path().display(), "Skipping non-regular entry");
        }
    }

    Ok(tree)
}

/// Remove `directory` and everything below it.
///
/// A missing directory is a no-op, and files that disappear between listing
/// and deletion are ignored.
pub fn delete_directory(directory: &Path) -> KilnResult<()> {
    if !directory.exists() {
        return Ok(());
    }
    let entries = list_for_deletion(directory)?;
    delete_entries(&entries)
}

/// Entries under `directory` (inclusive), children before their parent.
pub(crate) fn list_for_deletion(directory: &Path) -> KilnResult<Vec<(PathBuf, bool)>> {
    WalkDir::new(directory)
        .contents_first(true)
        .into_iter()
        .map(|entry| {
            entry
                .map(|e| (e.path().to_path_buf(), e.file_type().is_dir()))
                .map_err(|e| walk_error(directory, e))
        })
        .collect()
}

pub(crate) fn delete_entries(entries: &[(PathBuf, bool)]) -> KilnResult<()> {
    for (path, is_dir) in entries {
        let result = if *is_dir {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Already removed");
            }
            Err(e) => return Err(map_io_error(path, e, "delete")),
        }
    }
    Ok(())
}

/// Set POSIX permission bits; a no-op off Unix.
pub(crate) fn apply_mode(path: &Path, mode: FileMode) -> KilnResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode.bits()))
            .map_err(|e| map_io_error(path, e, "set permissions"))?;
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

fn read_mode(path: &Path) -> KilnResult<FileMode> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
        Ok(FileMode::new(metadata.permissions().mode()))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(FileMode::FILE)
    }
}

fn walk_error(root: &Path, e: walkdir::Error) -> KilnError {
    let path = e.path().unwrap_or(root).to_path_buf();
    ApplicationError::FilesystemError {
        path,
        reason: format!("Failed to walk directory: {}", e),
    }
    .into()
}

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> KilnError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

use crate::domain::{
    entities::common::{FileMode, RelativePath},
    error::DomainError,
};

/// Whether a resource is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    File,
    Directory,
}

/// A single entry of a [`ResourceTree`](super::resource_tree::ResourceTree).
///
/// Directories never carry content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    path: RelativePath,
    kind: ResourceKind,
    content: Option<Vec<u8>>,
    mode: FileMode,
}

impl Resource {
    pub fn file(path: RelativePath, content: Vec<u8>, mode: FileMode) -> Self {
        Self {
            path,
            kind: ResourceKind::File,
            content: Some(content),
            mode,
        }
    }

    pub fn directory(path: RelativePath) -> Self {
        Self {
            path,
            kind: ResourceKind::Directory,
            content: None,
            mode: FileMode::DIRECTORY,
        }
    }

    pub fn path(&self) -> &RelativePath {
        &self.path
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn is_file(&self) -> bool {
        self.kind == ResourceKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == ResourceKind::Directory
    }

    /// Raw bytes; empty for directories.
    pub fn content(&self) -> &[u8] {
        self.content.as_deref().unwrap_or_default()
    }

    /// UTF-8 view of a file's content.
    pub fn text(&self) -> Result<&str, DomainError> {
        match &self.content {
            None => Err(DomainError::UnsupportedResourceKind {
                path: self.path.to_string(),
                reason: "resource is a directory".into(),
            }),
            Some(bytes) => {
                std::str::from_utf8(bytes).map_err(|_| DomainError::UnsupportedResourceKind {
                    path: self.path.to_string(),
                    reason: "content is not valid UTF-8 text".into(),
                })
            }
        }
    }

    pub fn size(&self) -> usize {
        self.content().len()
    }

    pub(crate) fn with_path(mut self, path: RelativePath) -> Self {
        self.path = path;
        self
    }
}

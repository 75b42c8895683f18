//! In-memory overlay filesystem shared by chained generator invocations.
//!
//! A [`ResourceTree`] is owned by exactly one invocation at a time: it is
//! moved into a generator and moved back out with the generator's result.
//! Every path is a [`RelativePath`], so nothing in a tree can resolve outside
//! the root it is eventually materialized under.

use std::collections::BTreeMap;

use crate::domain::{
    entities::{
        common::{FileMode, RelativePath},
        resource::Resource,
    },
    error::DomainError,
};

/// How [`ResourceTree::merge`] treats a file present in both trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The incoming tree overwrites.
    #[default]
    LastWriterWins,
    /// Differing content is a [`DomainError::MergeConflict`].
    DetectConflicts,
}

/// Ordered mapping from normalized path to resource.
///
/// Iteration is a depth-first pre-order: a directory always precedes the
/// entries beneath it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTree {
    entries: BTreeMap<RelativePath, Resource>,
}

impl ResourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a file, creating implicit parent directories.
    pub fn put(
        &mut self,
        path: &str,
        content: impl Into<Vec<u8>>,
        mode: FileMode,
    ) -> Result<(), DomainError> {
        let path = RelativePath::parse(path)?;
        self.insert(Resource::file(path, content.into(), mode))
    }

    /// Insert a UTF-8 file with the default file mode.
    pub fn put_text(&mut self, path: &str, content: &str) -> Result<(), DomainError> {
        self.put(path, content.as_bytes(), FileMode::FILE)
    }

    /// Create a directory and every missing parent.
    pub fn put_directory(&mut self, path: &str) -> Result<(), DomainError> {
        let path = RelativePath::parse(path)?;
        self.insert(Resource::directory(path))
    }

    /// Insert an already-built resource.
    ///
    /// Parents are materialized on demand; a parent occupied by a file, or a
    /// kind change at the path itself, is a [`DomainError::PathConflict`].
    pub fn insert(&mut self, resource: Resource) -> Result<(), DomainError> {
        for ancestor in resource.path().ancestors() {
            match self.entries.get(&ancestor) {
                Some(existing) if existing.is_file() => {
                    return Err(DomainError::PathConflict {
                        path: resource.path().to_string(),
                        reason: format!("parent '{}' is a file", ancestor),
                    });
                }
                Some(_) => {}
                None => {
                    self.entries
                        .insert(ancestor.clone(), Resource::directory(ancestor));
                }
            }
        }

        if let Some(existing) = self.entries.get(resource.path()) {
            if existing.kind() != resource.kind() {
                return Err(DomainError::PathConflict {
                    path: resource.path().to_string(),
                    reason: format!(
                        "cannot replace a {:?} with a {:?}",
                        existing.kind(),
                        resource.kind()
                    ),
                });
            }
            if resource.is_directory() {
                return Ok(());
            }
        }

        self.entries.insert(resource.path().clone(), resource);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Result<&Resource, DomainError> {
        let key = RelativePath::parse(path)?;
        self.entries
            .get(&key)
            .ok_or_else(|| DomainError::ResourceNotFound {
                path: key.to_string(),
            })
    }

    /// UTF-8 content of the file at `path`.
    pub fn text(&self, path: &str) -> Result<&str, DomainError> {
        self.get(path)?.text()
    }

    pub fn contains(&self, path: &str) -> bool {
        RelativePath::parse(path)
            .map(|key| self.entries.contains_key(&key))
            .unwrap_or(false)
    }

    /// Remove `path` and everything beneath it. Returns the number of removed entries.
    pub fn remove(&mut self, path: &str) -> Result<usize, DomainError> {
        let key = RelativePath::parse(path)?;
        let doomed: Vec<RelativePath> = self
            .entries
            .range(key.clone()..)
            .map(|(p, _)| p)
            .take_while(|p| p.starts_with(&key))
            .cloned()
            .collect();

        for path in &doomed {
            self.entries.remove(path);
        }
        Ok(doomed.len())
    }

    /// Overlay `other` onto this tree.
    pub fn merge(mut self, other: ResourceTree, strategy: MergeStrategy) -> Result<Self, DomainError> {
        for (path, incoming) in other.entries {
            if strategy == MergeStrategy::DetectConflicts {
                if let Some(existing) = self.entries.get(&path) {
                    if existing.is_file()
                        && incoming.is_file()
                        && existing.content() != incoming.content()
                    {
                        return Err(DomainError::MergeConflict {
                            path: path.to_string(),
                        });
                    }
                }
            }
            self.insert(incoming)?;
        }
        Ok(self)
    }

    /// Re-root the entries beneath `prefix`.
    pub fn subtree(&self, prefix: &str) -> Result<Self, DomainError> {
        let prefix = RelativePath::parse(prefix)?;
        let mut out = Self::new();
        for (path, resource) in &self.entries {
            if let Some(rebased) = path.strip_prefix(&prefix) {
                out.entries
                    .insert(rebased.clone(), resource.clone().with_path(rebased));
            }
        }
        Ok(out)
    }

    /// Entries directly under the root.
    pub fn top_level(&self) -> Vec<&Resource> {
        self.entries.values().filter(|r| r.path().depth() == 1).collect()
    }

    /// Replace the content of an existing file, keeping its mode.
    pub fn replace_content(
        &mut self,
        path: &RelativePath,
        content: impl Into<Vec<u8>>,
    ) -> Result<(), DomainError> {
        let mode = match self.entries.get(path) {
            Some(existing) if existing.is_file() => existing.mode(),
            Some(_) => {
                return Err(DomainError::UnsupportedResourceKind {
                    path: path.to_string(),
                    reason: "resource is a directory".into(),
                });
            }
            None => {
                return Err(DomainError::ResourceNotFound {
                    path: path.to_string(),
                });
            }
        };
        self.entries.insert(
            path.clone(),
            Resource::file(path.clone(), content.into(), mode),
        );
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.entries.values()
    }

    pub fn files(&self) -> impl Iterator<Item = &Resource> {
        self.entries.values().filter(|r| r.is_file())
    }

    pub fn directories(&self) -> impl Iterator<Item = &Resource> {
        self.entries.values().filter(|r| r.is_directory())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResourceTree {
    type Item = &'a Resource;
    type IntoIter = std::collections::btree_map::Values<'a, RelativePath, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(tree: &ResourceTree) -> Vec<String> {
        tree.iter().map(|r| r.path().to_string()).collect()
    }

    #[test]
    fn put_materializes_parent_directories() {
        let mut tree = ResourceTree::new();
        tree.put_text("src/main/java/App.java", "class App {}").unwrap();

        assert_eq!(
            paths(&tree),
            vec!["src", "src/main", "src/main/java", "src/main/java/App.java"]
        );
        assert!(tree.get("src/main").unwrap().is_directory());
        assert_eq!(tree.text("src/main/java/App.java").unwrap(), "class App {}");
    }

    #[test]
    fn put_normalizes_and_rejects_traversal() {
        let mut tree = ResourceTree::new();
        tree.put_text("./a/b/../c.txt", "c").unwrap();
        assert!(tree.contains("a/c.txt"));

        let err = tree.put_text("../outside.txt", "x").unwrap_err();
        assert!(matches!(err, DomainError::PathTraversal { .. }));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn put_overwrites_existing_file() {
        let mut tree = ResourceTree::new();
        tree.put_text("a.txt", "one").unwrap();
        tree.put("a.txt", "two", FileMode::EXECUTABLE).unwrap();

        let resource = tree.get("a.txt").unwrap();
        assert_eq!(resource.text().unwrap(), "two");
        assert_eq!(resource.mode(), FileMode::EXECUTABLE);
    }

    #[test]
    fn file_cannot_become_a_parent() {
        let mut tree = ResourceTree::new();
        tree.put_text("a", "file").unwrap();

        assert!(matches!(
            tree.put_text("a/b.txt", "x"),
            Err(DomainError::PathConflict { .. })
        ));
        assert!(matches!(
            tree.put_directory("a"),
            Err(DomainError::PathConflict { .. })
        ));
    }

    #[test]
    fn get_missing_is_not_found() {
        let tree = ResourceTree::new();
        assert_eq!(
            tree.get("nope.txt"),
            Err(DomainError::ResourceNotFound {
                path: "nope.txt".into()
            })
        );
    }

    #[test]
    fn remove_is_transitive() {
        let mut tree = ResourceTree::new();
        tree.put_text("a/b/c.txt", "c").unwrap();
        tree.put_text("a/d.txt", "d").unwrap();
        tree.put_text("a-sibling.txt", "s").unwrap();

        let removed = tree.remove("a").unwrap();

        assert_eq!(removed, 4);
        assert_eq!(paths(&tree), vec!["a-sibling.txt"]);
    }

    #[test]
    fn merge_last_writer_wins() {
        let mut base = ResourceTree::new();
        base.put_text("README.md", "base").unwrap();
        base.put_text("keep.txt", "keep").unwrap();

        let mut overlay = ResourceTree::new();
        overlay.put_text("README.md", "overlay").unwrap();
        overlay.put_text("docs/new.md", "new").unwrap();

        let merged = base.merge(overlay, MergeStrategy::LastWriterWins).unwrap();

        assert_eq!(merged.text("README.md").unwrap(), "overlay");
        assert_eq!(merged.text("keep.txt").unwrap(), "keep");
        assert!(merged.get("docs").unwrap().is_directory());
    }

    #[test]
    fn merge_detects_conflicting_content() {
        let mut base = ResourceTree::new();
        base.put_text("README.md", "base").unwrap();
        let mut overlay = ResourceTree::new();
        overlay.put_text("README.md", "overlay").unwrap();

        let err = base
            .merge(overlay, MergeStrategy::DetectConflicts)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::MergeConflict {
                path: "README.md".into()
            }
        );
    }

    #[test]
    fn merge_detect_accepts_identical_content() {
        let mut base = ResourceTree::new();
        base.put_text("same.txt", "x").unwrap();
        let overlay = base.clone();

        let merged = base.merge(overlay, MergeStrategy::DetectConflicts).unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn subtree_rebases_entries() {
        let mut tree = ResourceTree::new();
        tree.put_text("myapp/src/main.rs", "fn main() {}").unwrap();
        tree.put_text("other.txt", "x").unwrap();

        let sub = tree.subtree("myapp").unwrap();

        assert_eq!(paths(&sub), vec!["src", "src/main.rs"]);
        assert_eq!(sub.get("src/main.rs").unwrap().path().as_str(), "src/main.rs");
    }

    #[test]
    fn replace_content_keeps_mode() {
        let mut tree = ResourceTree::new();
        tree.put("run.sh", "echo a", FileMode::EXECUTABLE).unwrap();
        let path = RelativePath::parse("run.sh").unwrap();

        tree.replace_content(&path, "echo b").unwrap();

        let resource = tree.get("run.sh").unwrap();
        assert_eq!(resource.text().unwrap(), "echo b");
        assert_eq!(resource.mode(), FileMode::EXECUTABLE);
    }
}

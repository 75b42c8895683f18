//! Anchor-based text transforms.
//!
//! Each [`TransformAction`] names a glob of target files, a literal anchor and
//! a snippet. Only the first occurrence of the anchor is acted upon; a target
//! without the anchor aborts the whole run.

use tracing::debug;

use crate::domain::{
    entities::{
        common::RelativePath,
        generator::{SnippetSource, TransformAction, TransformKind},
        resource_tree::ResourceTree,
    },
    error::DomainError,
};

/// Applies transform actions to a [`ResourceTree`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformEngine;

impl TransformEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run `actions` in order. Actions on the same file chain: each sees
    /// the output of the previous one.
    pub fn apply(
        &self,
        mut tree: ResourceTree,
        actions: &[TransformAction],
    ) -> Result<ResourceTree, DomainError> {
        for action in actions {
            self.apply_one(&mut tree, action)?;
        }
        Ok(tree)
    }

    fn apply_one(&self, tree: &mut ResourceTree, action: &TransformAction) -> Result<(), DomainError> {
        let targets: Vec<RelativePath> = tree
            .files()
            .filter(|r| action.target().matches(r.path()))
            .map(|r| r.path().clone())
            .collect();

        if targets.is_empty() {
            debug!(
                target_glob = action.target().as_str(),
                anchor = action.anchor(),
                "Transform target matched no files; skipping"
            );
            return Ok(());
        }

        let snippet = resolve_snippet(tree, action.snippet())?;

        for path in targets {
            let original = tree.text(path.as_str())?;
            let updated = splice(original, action.kind(), action.anchor(), &snippet).ok_or_else(
                || DomainError::AnchorNotFound {
                    file: path.to_string(),
                    anchor: action.anchor().to_string(),
                },
            )?;
            debug!(file = %path, kind = %action.kind(), "Applied transform");
            tree.replace_content(&path, updated)?;
        }
        Ok(())
    }
}

fn resolve_snippet(tree: &ResourceTree, source: &SnippetSource) -> Result<String, DomainError> {
    match source {
        SnippetSource::Inline(text) => Ok(text.clone()),
        SnippetSource::Resource(path) => tree.text(path.as_str()).map(str::to_string),
    }
}

/// Splice `snippet` relative to the first occurrence of `anchor`.
///
/// Returns `None` when the anchor does not occur in `text`.
pub fn splice(text: &str, kind: TransformKind, anchor: &str, snippet: &str) -> Option<String> {
    let start = text.find(anchor)?;
    let end = start + anchor.len();

    let mut out = String::with_capacity(text.len() + snippet.len());
    match kind {
        TransformKind::InsertBefore => {
            out.push_str(&text[..start]);
            out.push_str(snippet);
            out.push_str(&text[start..]);
        }
        TransformKind::InsertAfter => {
            out.push_str(&text[..end]);
            out.push_str(snippet);
            out.push_str(&text[end..]);
        }
        TransformKind::Replace => {
            out.push_str(&text[..start]);
            out.push_str(snippet);
            out.push_str(&text[end..]);
        }
    }
    Some(out)
}

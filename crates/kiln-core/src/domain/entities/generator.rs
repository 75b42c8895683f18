//! Generator descriptors and their declared text transforms.

use std::fmt;
use std::str::FromStr;

use crate::domain::{
    entities::{
        common::RelativePath,
        properties::{Properties, PropertySchema},
        resource_tree::ResourceTree,
    },
    error::DomainError,
};

/// Grouping used for listing; has no effect on invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeneratorCategory {
    Runtime,
    Capability,
    Database,
    Support,
    Import,
}

impl GeneratorCategory {
    pub const ALL: [Self; 5] = [
        Self::Runtime,
        Self::Capability,
        Self::Database,
        Self::Support,
        Self::Import,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Capability => "capability",
            Self::Database => "database",
            Self::Support => "support",
            Self::Import => "import",
        }
    }
}

impl FromStr for GeneratorCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidDescriptor {
                name: s.into(),
                reason: format!(
                    "unknown category (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                ),
            })
    }
}

impl fmt::Display for GeneratorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a transform splices its snippet relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    InsertBefore,
    InsertAfter,
    Replace,
}

impl FromStr for TransformKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "insert-before" => Ok(Self::InsertBefore),
            "insert-after" => Ok(Self::InsertAfter),
            "replace" => Ok(Self::Replace),
            other => Err(DomainError::InvalidDescriptor {
                name: other.into(),
                reason: "transform kind must be insert-before, insert-after or replace".into(),
            }),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InsertBefore => "insert-before",
            Self::InsertAfter => "insert-after",
            Self::Replace => "replace",
        })
    }
}

/// Snippet text, given inline or read from the tree being transformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetSource {
    Inline(String),
    Resource(RelativePath),
}

/// A compiled glob over normalized `/`-separated resource paths.
#[derive(Debug, Clone)]
pub struct TargetGlob {
    raw: String,
    pattern: glob::Pattern,
}

impl TargetGlob {
    const OPTIONS: glob::MatchOptions = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let pattern = glob::Pattern::new(raw).map_err(|e| DomainError::InvalidGlob {
            pattern: raw.into(),
            reason: e.msg.to_string(),
        })?;
        Ok(Self {
            raw: raw.into(),
            pattern,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &RelativePath) -> bool {
        self.pattern.matches_with(path.as_str(), Self::OPTIONS)
    }
}

impl PartialEq for TargetGlob {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for TargetGlob {}

/// A single anchor-based edit declared by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformAction {
    kind: TransformKind,
    target: TargetGlob,
    anchor: String,
    snippet: SnippetSource,
}

impl TransformAction {
    pub fn new(
        kind: TransformKind,
        target: &str,
        anchor: impl Into<String>,
        snippet: SnippetSource,
    ) -> Result<Self, DomainError> {
        let anchor = anchor.into();
        if anchor.is_empty() {
            return Err(DomainError::InvalidDescriptor {
                name: target.into(),
                reason: "transform anchor must not be empty".into(),
            });
        }
        Ok(Self {
            kind,
            target: TargetGlob::new(target)?,
            anchor,
            snippet,
        })
    }

    pub fn insert_before(target: &str, anchor: &str, snippet: &str) -> Result<Self, DomainError> {
        Self::new(
            TransformKind::InsertBefore,
            target,
            anchor,
            SnippetSource::Inline(snippet.into()),
        )
    }

    pub fn insert_after(target: &str, anchor: &str, snippet: &str) -> Result<Self, DomainError> {
        Self::new(
            TransformKind::InsertAfter,
            target,
            anchor,
            SnippetSource::Inline(snippet.into()),
        )
    }

    pub fn replace(target: &str, anchor: &str, snippet: &str) -> Result<Self, DomainError> {
        Self::new(
            TransformKind::Replace,
            target,
            anchor,
            SnippetSource::Inline(snippet.into()),
        )
    }

    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    pub fn target(&self) -> &TargetGlob {
        &self.target
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn snippet(&self) -> &SnippetSource {
        &self.snippet
    }
}

/// Static description of a registered generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorDescriptor {
    name: String,
    category: GeneratorCategory,
    description: String,
    schema: PropertySchema,
    transforms: Vec<TransformAction>,
}

impl GeneratorDescriptor {
    /// Validate and build a descriptor.
    ///
    /// Names are non-empty and contain no whitespace.
    pub fn new(
        name: impl Into<String>,
        category: GeneratorCategory,
        schema: PropertySchema,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidDescriptor {
                name,
                reason: "generator names must be non-empty and contain no whitespace".into(),
            });
        }
        Ok(Self {
            name,
            category,
            description: String::new(),
            schema,
            transforms: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_transform(mut self, action: TransformAction) -> Self {
        self.transforms.push(action);
        self
    }

    pub fn with_transforms(mut self, actions: impl IntoIterator<Item = TransformAction>) -> Self {
        self.transforms.extend(actions);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> GeneratorCategory {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    pub fn transforms(&self) -> &[TransformAction] {
        &self.transforms
    }
}

/// Output of one invocation: the mutated tree and the properties it derived.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorInvocationResult {
    pub tree: ResourceTree,
    pub derived: Properties,
}

impl GeneratorInvocationResult {
    pub fn new(tree: ResourceTree, derived: Properties) -> Self {
        Self { tree, derived }
    }
}

//! Filesystem-based generator catalog.
//!
//! Discovers and parses `generator.toml` manifests from a directory tree,
//! converting them into [`DeclarativeGenerator`]s ready for registration.
//!
//! # Directory layout expected
//!
//! ```text
//! catalog/
//! ├── readme/
//! │   ├── generator.toml        ← manifest (required)
//! │   ├── files/README.md       ← referenced by `source`
//! │   └── snippets/usage.md     ← referenced by `snippet_file`
//! └── docker/
//!     └── generator.toml
//! ```
//!
//! # `generator.toml` format
//!
//! ```toml
//! [generator]
//! name        = "readme"
//! category    = "support"          # runtime | capability | database | support | import
//! description = "Project README"   # optional
//!
//! [properties]                     # optional
//! required      = ["serviceName"]
//! optional      = ["description"]
//! allow_unknown = false
//!
//! [[files]]
//! path    = "README.md"
//! content = "# {{serviceName}}\n"  # or: source = "files/README.md"
//! mode    = "644"                  # optional octal string
//!
//! [[invoke]]
//! generator = "gitignore"
//!
//! [[transforms]]
//! kind    = "insert-after"         # insert-before | insert-after | replace
//! target  = "README.md"            # glob over generated paths
//! anchor  = "<!-- sections -->"
//! snippet = "\n## Usage\n"         # or: snippet_file / snippet_resource
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use kiln_core::{
    application::Generator,
    domain::{
        DomainError, FileMode, GeneratorCategory, GeneratorDescriptor, PropertySchema,
        PropertyShape, RelativePath, SnippetSource, TransformAction, TransformKind,
    },
    error::KilnError,
};

use crate::generators::declarative::DeclarativeGenerator;

const MANIFEST: &str = "generator.toml";

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("missing generator.toml in '{}'", .0.display())]
    MissingManifest(PathBuf),

    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest '{}': {reason}", .path.display())]
    Invalid { path: PathBuf, reason: String },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<CatalogError> for KilnError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Domain(e) => KilnError::Domain(e),
            other => KilnError::Configuration {
                message: other.to_string(),
            },
        }
    }
}

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `generator.toml` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct GeneratorManifest {
    pub generator: GeneratorSection,
    #[serde(default)]
    pub properties: PropertiesSection,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub invoke: Vec<InvokeEntry>,
    #[serde(default)]
    pub transforms: Vec<TransformEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PropertiesSection {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub allow_unknown: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub path: String,
    pub content: Option<String>,
    /// File inside the generator directory.
    pub source: Option<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct InvokeEntry {
    pub generator: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TransformEntry {
    pub kind: String,
    pub target: String,
    pub anchor: String,
    pub snippet: Option<String>,
    /// File inside the generator directory, read at load time.
    pub snippet_file: Option<String>,
    /// Path in the tree being transformed, read at run time.
    pub snippet_resource: Option<String>,
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads every generator under a catalog directory.
///
/// ```rust,no_run
/// use kiln_adapters::CatalogLoader;
///
/// let generators = CatalogLoader::new("./catalog").load_all()?;
/// println!("Loaded {} generators", generators.len());
/// # Ok::<(), kiln_adapters::CatalogError>(())
/// ```
pub struct CatalogLoader {
    root: PathBuf,
}

impl CatalogLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load every valid generator, in directory-name order.
    ///
    /// Subdirectories whose manifest is missing or invalid are skipped with
    /// a `WARN` log rather than failing the whole catalog.
    #[instrument(skip(self), fields(dir = %self.root.display()))]
    pub fn load_all(&self) -> Result<Vec<DeclarativeGenerator>, CatalogError> {
        if !self.root.is_dir() {
            return Err(CatalogError::MissingDirectory(self.root.clone()));
        }

        let read_dir = fs::read_dir(&self.root).map_err(|source| CatalogError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut dirs = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| CatalogError::Io {
                path: self.root.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();

        let mut generators = Vec::new();
        for dir in dirs {
            match self.load_dir(&dir) {
                Ok(generator) => {
                    debug!(generator = %generator.descriptor().name(), "loaded generator");
                    generators.push(generator);
                }
                Err(e) => {
                    warn!(
                        dir   = %dir.display(),
                        error = %e,
                        "skipping catalog directory due to load error"
                    );
                }
            }
        }

        debug!(count = generators.len(), "finished loading catalog");
        Ok(generators)
    }

    /// Load a single generator from one subdirectory.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_dir(&self, dir: &Path) -> Result<DeclarativeGenerator, CatalogError> {
        let manifest_path = dir.join(MANIFEST);
        if !manifest_path.is_file() {
            return Err(CatalogError::MissingManifest(dir.to_path_buf()));
        }

        let raw = fs::read_to_string(&manifest_path).map_err(|source| CatalogError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        let manifest: GeneratorManifest =
            toml::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: manifest_path.clone(),
                source,
            })?;

        build_generator(dir, &manifest_path, manifest)
    }
}

fn build_generator(
    dir: &Path,
    manifest_path: &Path,
    manifest: GeneratorManifest,
) -> Result<DeclarativeGenerator, CatalogError> {
    let category: GeneratorCategory = manifest.generator.category.parse()?;

    let mut schema = PropertySchema::new().allow_unknown(manifest.properties.allow_unknown);
    for key in &manifest.properties.required {
        schema = schema.required(key, PropertyShape::Any);
    }
    for key in &manifest.properties.optional {
        schema = schema.optional(key, PropertyShape::Any);
    }

    let mut transforms = Vec::with_capacity(manifest.transforms.len());
    for entry in &manifest.transforms {
        transforms.push(build_transform(dir, manifest_path, entry)?);
    }

    let name = manifest.generator.name;
    let descriptor = GeneratorDescriptor::new(name.clone(), category, schema)?
        .with_description(manifest.generator.description.unwrap_or_default())
        .with_transforms(transforms);

    let mut generator = DeclarativeGenerator::new(descriptor);
    for file in manifest.files {
        let content = match (file.content, file.source) {
            (Some(content), None) => content.into_bytes(),
            (None, Some(source)) => read_local(dir, &source)?,
            _ => {
                return Err(CatalogError::Invalid {
                    path: manifest_path.to_path_buf(),
                    reason: format!("file '{}' needs exactly one of content or source", file.path),
                });
            }
        };
        let mode = match file.mode {
            Some(raw) => FileMode::parse_octal(&raw).ok_or_else(|| {
                DomainError::InvalidDescriptor {
                    name: name.clone(),
                    reason: format!("file '{}' has invalid mode '{raw}'", file.path),
                }
            })?,
            None => FileMode::FILE,
        };
        generator = generator.with_file(file.path, content, mode);
    }

    for entry in manifest.invoke {
        generator = generator.with_invoke(entry.generator);
    }

    Ok(generator)
}

fn build_transform(
    dir: &Path,
    manifest_path: &Path,
    entry: &TransformEntry,
) -> Result<TransformAction, CatalogError> {
    let kind: TransformKind = entry.kind.parse()?;
    let snippet = match (&entry.snippet, &entry.snippet_file, &entry.snippet_resource) {
        (Some(text), None, None) => SnippetSource::Inline(text.clone()),
        (None, Some(file), None) => {
            let bytes = read_local(dir, file)?;
            let text = String::from_utf8(bytes).map_err(|_| CatalogError::Invalid {
                path: manifest_path.to_path_buf(),
                reason: format!("snippet file '{file}' is not UTF-8"),
            })?;
            SnippetSource::Inline(text)
        }
        (None, None, Some(resource)) => SnippetSource::Resource(RelativePath::parse(resource)?),
        _ => {
            return Err(CatalogError::Invalid {
                path: manifest_path.to_path_buf(),
                reason: format!(
                    "transform on '{}' needs exactly one of snippet, snippet_file or snippet_resource",
                    entry.target
                ),
            });
        }
    };
    Ok(TransformAction::new(kind, &entry.target, entry.anchor.clone(), snippet)?)
}

/// Read a file referenced by a manifest; it must stay inside `dir`.
fn read_local(dir: &Path, relative: &str) -> Result<Vec<u8>, CatalogError> {
    let path = RelativePath::parse(relative)?.to_path_under(dir);
    fs::read(&path).map_err(|source| CatalogError::Io { path, source })
}

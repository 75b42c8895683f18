//! Data-driven generator: files to write, generators to invoke.
//!
//! Built either in code (the built-in set) or from a catalog manifest.

use tracing::debug;

use kiln_core::{
    application::{Generator, Invocation},
    domain::{
        FileMode, GeneratorDescriptor, GeneratorInvocationResult, Properties, ResourceTree,
        derive_service_name, render_placeholders,
    },
    error::KilnResult,
};

/// A file written by a [`DeclarativeGenerator`].
///
/// Both the path and UTF-8 content are rendered with the derived properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTemplate {
    pub path: String,
    pub content: Vec<u8>,
    pub mode: FileMode,
}

#[derive(Debug, Clone)]
pub struct DeclarativeGenerator {
    descriptor: GeneratorDescriptor,
    files: Vec<FileTemplate>,
    invokes: Vec<String>,
}

impl DeclarativeGenerator {
    pub fn new(descriptor: GeneratorDescriptor) -> Self {
        Self {
            descriptor,
            files: Vec::new(),
            invokes: Vec::new(),
        }
    }

    pub fn with_file(
        mut self,
        path: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mode: FileMode,
    ) -> Self {
        self.files.push(FileTemplate {
            path: path.into(),
            content: content.into(),
            mode,
        });
        self
    }

    /// Invoke `generator` after the files are written.
    pub fn with_invoke(mut self, generator: impl Into<String>) -> Self {
        self.invokes.push(generator.into());
        self
    }

    pub fn files(&self) -> &[FileTemplate] {
        &self.files
    }

    pub fn invokes(&self) -> &[String] {
        &self.invokes
    }

    /// Input properties plus `serviceName` when `application` is given.
    fn derive(props: &Properties) -> KilnResult<Properties> {
        let mut derived = props.clone();
        if let Some(application) = props.optional_str("application")? {
            let sub_folder = props.optional_str("subFolderName")?;
            derived.insert("serviceName", derive_service_name(application, sub_folder));
        }
        Ok(derived)
    }
}

impl Generator for DeclarativeGenerator {
    fn descriptor(&self) -> &GeneratorDescriptor {
        &self.descriptor
    }

    fn generate(
        &self,
        invocation: &mut Invocation<'_>,
        mut tree: ResourceTree,
        props: &Properties,
    ) -> KilnResult<GeneratorInvocationResult> {
        let derived = Self::derive(props)?;

        for file in &self.files {
            let path = render_placeholders(&file.path, &derived);
            let content = match std::str::from_utf8(&file.content) {
                Ok(text) => render_placeholders(text, &derived).into_bytes(),
                Err(_) => file.content.clone(),
            };
            debug!(file = %path, "Writing file");
            tree.put(&path, content, file.mode)?;
        }

        for name in &self.invokes {
            tree = invocation.invoke(name, tree, &derived)?;
        }

        Ok(GeneratorInvocationResult::new(tree, derived))
    }
}

// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Kiln.
//!
//! Pure logic over the in-memory project model: no filesystem, no archive
//! format, no process-wide state. Everything that touches the outside world
//! is reached through the ports defined in the application layer.
//!
//! - **Resource tree**: normalized relative paths, files and directories
//! - **Properties**: loosely shaped generator inputs and their schemas
//! - **Descriptors**: generator metadata and declared transform actions
//! - **Transforms**: first-match anchor splicing over text resources
pub mod entities;
pub mod error;
pub mod naming;
pub mod paths;
pub mod render;
pub mod transform;

pub use entities::{
    common::{FileMode, RelativePath},
    generator::{
        GeneratorCategory, GeneratorDescriptor, GeneratorInvocationResult, SnippetSource,
        TargetGlob, TransformAction, TransformKind,
    },
    properties::{Properties, PropertySchema, PropertyShape, PropertySpec, PropertyValue},
    resource::{Resource, ResourceKind},
    resource_tree::{MergeStrategy, ResourceTree},
};
pub use error::{DomainError, ErrorCategory};
pub use naming::derive_service_name;
pub use render::render_placeholders;
pub use transform::TransformEngine;

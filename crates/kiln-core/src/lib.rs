//! Kiln Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Kiln, a
//! project generator that composes reusable generators over an in-memory
//! resource tree.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            kiln-cli (CLI)               │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (GeneratorService, ProjectService)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (Generator, ArchiveCodec, Filesystem)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │  (ZipCodec, LocalFilesystem, catalog)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ResourceTree, Properties, Transforms)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kiln_core::prelude::*;
//!
//! # fn run(registry: std::sync::Arc<GeneratorRegistry>) -> KilnResult<()> {
//! let service = GeneratorService::new(registry);
//! let props = Properties::new().with("application", "shop");
//!
//! let tree = service.apply("application", ResourceTree::new(), &props, &Properties::new())?;
//! assert!(tree.contains("README.md"));
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ApplicationError, GeneratorInfo, GeneratorRegistry, GeneratorService, Invocation,
        ProjectService,
        ports::{ArchiveCodec, Filesystem, Generator},
    };
    pub use crate::domain::{
        DomainError, FileMode, GeneratorCategory, GeneratorDescriptor, GeneratorInvocationResult,
        MergeStrategy, Properties, PropertySchema, PropertyShape, PropertyValue, RelativePath,
        Resource, ResourceTree, SnippetSource, TransformAction, TransformKind,
    };
    pub use crate::error::{KilnError, KilnResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

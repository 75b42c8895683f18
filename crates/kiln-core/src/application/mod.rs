//! Application layer for Kiln.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GeneratorService, ProjectService)
//! - **Registry**: The immutable generator registry
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod registry;
pub mod services;

pub use services::{GeneratorInfo, GeneratorService, Invocation, ProjectService};

pub use ports::{ArchiveCodec, Filesystem, Generator};
pub use registry::{GeneratorRegistry, GeneratorRegistryBuilder};

pub use error::ApplicationError;

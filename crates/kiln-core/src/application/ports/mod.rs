//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `kiln-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: materializing and reading trees on disk
//!   - `ArchiveCodec`: zip serialization
//!   - `Generator`: project generation units held by the registry

pub mod output;

pub use output::{ArchiveCodec, Filesystem, Generator};

#[cfg(test)]
pub use output::{MockArchiveCodec, MockFilesystem};

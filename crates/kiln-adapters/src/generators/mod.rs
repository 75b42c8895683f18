//! Generator implementations: built-ins and the declarative catalog.

pub mod builtin;
pub mod declarative;
pub mod loader;

pub use builtin::{builtin_generators, register_builtins};
pub use declarative::{DeclarativeGenerator, FileTemplate};
pub use loader::{CatalogError, CatalogLoader};

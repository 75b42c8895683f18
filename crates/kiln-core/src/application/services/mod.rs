//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "run a generator" or "import an archive".

pub mod generator_service;
pub mod project_service;

pub use generator_service::{GeneratorService, Invocation};
pub use project_service::{GeneratorInfo, ProjectService};

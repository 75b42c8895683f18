pub mod common;
pub mod generator;
pub mod properties;
pub mod resource;
pub mod resource_tree;

pub use crate::domain::DomainError;
pub use generator::GeneratorDescriptor;
pub use properties::Properties;
pub use resource::Resource;
pub use resource_tree::ResourceTree;

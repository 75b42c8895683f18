//! Filesystem adapters.

mod local;
mod memory;

pub use local::{LocalFilesystem, delete_directory, read_tree};
pub use memory::MemoryFilesystem;

pub(crate) use local::{apply_mode, map_io_error};

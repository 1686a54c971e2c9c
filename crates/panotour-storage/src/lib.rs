//! Panotour Storage - Document stores for tours
//!
//! A tour is persisted as one [`panotour_core::TourDocument`] under a name.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::DocumentStore;

//! Document store trait definitions

use crate::error::StorageResult;
use async_trait::async_trait;
use panotour_core::TourDocument;

/// Named, whole-document persistence for tours
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Prepare the store (create directories, etc.)
    async fn initialize(&self) -> StorageResult<()>;

    /// Load a tour; `TourNotFound` when there is none by that name
    async fn load(&self, name: &str) -> StorageResult<TourDocument>;

    /// Save a tour, replacing any previous version
    async fn save(&self, name: &str, document: &TourDocument) -> StorageResult<()>;

    /// Names of all stored tours, sorted
    async fn list(&self) -> StorageResult<Vec<String>>;

    async fn delete(&self, name: &str) -> StorageResult<()>;

    async fn exists(&self, name: &str) -> StorageResult<bool>;
}

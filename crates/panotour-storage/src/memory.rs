//! In-memory document store for testing

use crate::error::{check_name, StorageError, StorageResult};
use crate::traits::DocumentStore;
use async_trait::async_trait;
use panotour_core::TourDocument;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory document store
///
/// Useful for testing and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tours: RwLock<BTreeMap<String, TourDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Lock(e.to_string())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn initialize(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn load(&self, name: &str) -> StorageResult<TourDocument> {
        let tours = self.tours.read().map_err(lock_error)?;
        tours
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::TourNotFound(name.to_string()))
    }

    async fn save(&self, name: &str, document: &TourDocument) -> StorageResult<()> {
        check_name(name)?;
        let mut tours = self.tours.write().map_err(lock_error)?;
        tours.insert(name.to_string(), document.clone());
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let tours = self.tours.read().map_err(lock_error)?;
        Ok(tours.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        let mut tours = self.tours.write().map_err(lock_error)?;
        tours
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::TourNotFound(name.to_string()))
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let tours = self.tours.read().map_err(lock_error)?;
        Ok(tours.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panotour_core::{Graph, NewSpatialGroup, NewVertex, SerializeOptions};

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        store.initialize().await.unwrap();

        let mut graph = Graph::new();
        graph
            .create_spatial_group(NewSpatialGroup::new("Day1"))
            .unwrap();
        graph
            .create_vertex(NewVertex::new([1.0, 2.0]).with_id("A").in_group("day1"))
            .unwrap();
        let document = graph.to_json(&SerializeOptions::default());

        store.save("lisbon", &document).await.unwrap();
        assert!(store.exists("lisbon").await.unwrap());
        assert_eq!(store.load("lisbon").await.unwrap(), document);
        assert_eq!(store.list().await.unwrap(), vec!["lisbon".to_string()]);

        store.delete("lisbon").await.unwrap();
        assert!(!store.exists("lisbon").await.unwrap());
        assert!(matches!(
            store.load("lisbon").await,
            Err(StorageError::TourNotFound(_))
        ));
        assert!(matches!(
            store.delete("lisbon").await,
            Err(StorageError::TourNotFound(_))
        ));
    }
}

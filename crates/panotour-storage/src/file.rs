//! File-backed document store: one pretty-printed JSON file per tour

use crate::error::{check_name, StorageError, StorageResult};
use crate::traits::DocumentStore;
use async_trait::async_trait;
use panotour_core::{TourDocument, DOCUMENT_VERSION};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

const EXTENSION: &str = "json";

/// Stores each tour as `<data dir>/<name>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of a tour's file
    pub fn path(&self, name: &str) -> StorageResult<PathBuf> {
        check_name(name)?;
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }
}

fn not_found(name: &str) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |e| match e.kind() {
        ErrorKind::NotFound => StorageError::TourNotFound(name.to_string()),
        _ => StorageError::Io(e),
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn initialize(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.dir).await?;
        debug!(dir = %self.dir.display(), "initialized file store");
        Ok(())
    }

    async fn load(&self, name: &str) -> StorageResult<TourDocument> {
        let path = self.path(name)?;
        let json = fs::read_to_string(&path).await.map_err(not_found(name))?;
        let document: TourDocument = serde_json::from_str(&json)?;
        if document.version != DOCUMENT_VERSION {
            return Err(panotour_core::Error::UnsupportedVersion(document.version).into());
        }
        debug!(tour = name, path = %path.display(), "loaded tour");
        Ok(document)
    }

    async fn save(&self, name: &str, document: &TourDocument) -> StorageResult<()> {
        let path = self.path(name)?;
        let json = serde_json::to_string_pretty(document)?;
        fs::create_dir_all(&self.dir).await?;

        // Write next to the target, then swap it in
        let staging = path.with_extension(format!("{EXTENSION}.tmp"));
        fs::write(&staging, json).await?;
        fs::rename(&staging, &path).await?;
        info!(tour = name, path = %path.display(), "saved tour");
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.path(name)?;
        fs::remove_file(&path).await.map_err(not_found(name))?;
        info!(tour = name, "deleted tour");
        Ok(())
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.path(name)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panotour_core::{Graph, NewEdge, NewSpatialGroup, NewVertex, SerializeOptions};
    use tempfile::TempDir;

    fn document() -> TourDocument {
        let mut graph = Graph::new();
        graph
            .create_spatial_group(NewSpatialGroup::new("Day1"))
            .unwrap();
        for (id, lat) in [("A", 1.0), ("B", 2.0)] {
            graph
                .create_vertex(NewVertex::new([lat, 0.0]).with_id(id).in_group("day1"))
                .unwrap();
        }
        graph
            .create_edge(NewEdge::new("A", "B").bidirectional())
            .unwrap();
        graph.to_json(&SerializeOptions::default())
    }

    #[tokio::test]
    async fn test_save_load_list_delete() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("tours"));
        assert!(store.list().await.unwrap().is_empty());
        store.initialize().await.unwrap();

        let document = document();
        store.save("lisbon", &document).await.unwrap();
        store.save("porto", &document).await.unwrap();
        assert!(tmp.path().join("tours/lisbon.json").exists());
        assert!(!tmp.path().join("tours/lisbon.json.tmp").exists());

        assert_eq!(store.load("lisbon").await.unwrap(), document);
        assert_eq!(store.list().await.unwrap(), vec!["lisbon", "porto"]);

        store.delete("porto").await.unwrap();
        assert!(!store.exists("porto").await.unwrap());
        assert!(matches!(
            store.load("porto").await,
            Err(StorageError::TourNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_unsafe_names_and_versions() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        assert!(matches!(
            store.save("../escape", &document()).await,
            Err(StorageError::InvalidName(_))
        ));

        std::fs::write(tmp.path().join("future.json"), r#"{"version": 99}"#).unwrap();
        assert!(matches!(
            store.load("future").await,
            Err(StorageError::Core(panotour_core::Error::UnsupportedVersion(99)))
        ));

        std::fs::write(tmp.path().join("broken.json"), "{").unwrap();
        assert!(matches!(
            store.load("broken").await,
            Err(StorageError::Serialization(_))
        ));
    }
}

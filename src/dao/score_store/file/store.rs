use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::dao::{score_store::ScoreStore, storage::StorageResult};

use super::{
    config::FileStoreConfig,
    error::{FileResult, FileStoreError},
};

/// Score store keeping a small JSON document on disk.
///
/// Other keys found in the document are preserved on save. Saves through clones of one store
/// are serialized, so each read-modify-rename sees the result of the previous one.
#[derive(Clone)]
pub struct FileScoreStore {
    path: Arc<PathBuf>,
    key: Arc<str>,
    write_lock: Arc<Mutex<()>>,
}

impl FileScoreStore {
    /// Store for the document described by `config`. Nothing touches the disk until used.
    pub fn new(config: FileStoreConfig) -> Self {
        Self {
            path: Arc::new(config.path),
            key: Arc::from(config.key),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the score document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> FileResult<Map<String, Value>> {
        let raw = match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(FileStoreError::Read {
                    path: self.path.to_path_buf(),
                    source,
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&raw).map_err(|source| FileStoreError::Decode {
            path: self.path.to_path_buf(),
            source,
        })
    }

    async fn write_document(&self, document: &Map<String, Value>) -> FileResult<()> {
        let payload = serde_json::to_vec_pretty(document)
            .map_err(|source| FileStoreError::Encode { source })?;

        if let Some(parent) = self.parent_dir() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| FileStoreError::Directory {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|source| FileStoreError::Write {
                path: tmp.clone(),
                source,
            })?;
        if let Err(source) = tokio::fs::rename(&tmp, self.path.as_path()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(FileStoreError::Write {
                path: self.path.to_path_buf(),
                source,
            });
        }
        Ok(())
    }

    /// Sibling of the document, unique per write.
    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "score".to_string());
        self.path
            .with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

impl ScoreStore for FileScoreStore {
    fn load(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move {
            let document = store.read_document().await?;
            let score = match document.get(store.key.as_ref()) {
                None => 0,
                Some(value) => value.as_u64().unwrap_or_else(|| {
                    warn!(key = %store.key, %value, "ignoring unreadable saved score");
                    0
                }),
            };
            Ok(score)
        })
    }

    fn save(&self, score: u64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let _writing = store.write_lock.lock().await;
            let mut document = match store.read_document().await {
                Ok(document) => document,
                Err(FileStoreError::Decode { .. }) => Map::new(),
                Err(err) => return Err(err.into()),
            };
            document.insert(store.key.to_string(), Value::from(score));
            store.write_document(&document).await.map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let Some(parent) = store.parent_dir() else {
                return Ok(());
            };
            match tokio::fs::metadata(parent).await {
                Ok(meta) if meta.is_dir() => Ok(()),
                Ok(_) => Err(FileStoreError::Directory {
                    path: parent.to_path_buf(),
                    source: std::io::Error::new(ErrorKind::NotADirectory, "not a directory"),
                }
                .into()),
                // Created on first save.
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(source) => Err(FileStoreError::Directory {
                    path: parent.to_path_buf(),
                    source,
                }
                .into()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileScoreStore {
        FileScoreStore::new(FileStoreConfig::new(dir.path().join("data").join("score.json")))
    }

    #[tokio::test]
    async fn missing_file_loads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.load().await.unwrap(), 0);
        store.health_check().await.unwrap();
    }

    #[tokio::test]
    async fn saved_score_survives_a_new_store() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).save(1500).await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.load().await.unwrap(), 1500);

        let raw = std::fs::read_to_string(reopened.path()).unwrap();
        let document: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(document["pixel-cover.xp"], 1500);

        let leftovers: Vec<_> = std::fs::read_dir(reopened.path().parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("score.json")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"theme": "dark"}"#).unwrap();

        let handles: Vec<_> = (1..=40u64)
            .map(|score| {
                let store = store.clone();
                tokio::spawn(async move { store.save(score).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let saved = store.load().await.unwrap();
        assert!((1..=40).contains(&saved));
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let document: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(document["theme"], "dark");
        assert_eq!(std::fs::read_dir(dir.path().join("data")).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn unrelated_keys_are_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"theme": "dark", "pixel-cover.xp": 10}"#).unwrap();

        assert_eq!(store.load().await.unwrap(), 10);
        store.save(40).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let document: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(document["theme"], "dark");
        assert_eq!(document["pixel-cover.xp"], 40);
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_then_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        assert!(store.load().await.is_err());
        store.save(5).await.unwrap();
        assert_eq!(store.load().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn non_numeric_score_reads_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"pixel-cover.xp": "lots"}"#).unwrap();
        assert_eq!(store.load().await.unwrap(), 0);
    }
}

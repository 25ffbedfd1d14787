//! File-backed record store: one pretty-printed JSON array per collection.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use serde_json::Value;
use tracing::debug;

use super::{Collection, RecordStore, StoreError};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<dir>/<collection>.json`
    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.name()))
    }

    fn lock_path_for(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!(".{}.json.lock", collection.name()))
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn read(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let path = self.path_for(collection);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { collection, source }),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed { collection, source })
    }

    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(&records)
            .map_err(|source| StoreError::Encode { collection, source })?;

        let dir = self.dir.clone();
        let path = self.path_for(collection);
        let lock_path = self.lock_path_for(collection);
        let count = records.len();

        tokio::task::spawn_blocking(move || replace_file(&dir, &path, &lock_path, &encoded))
            .await
            .map_err(|e| StoreError::Io {
                collection,
                source: io::Error::other(e),
            })?
            .map_err(|source| StoreError::Io { collection, source })?;

        debug!(collection = %collection, records = count, "collection written");
        Ok(())
    }
}

/// Swap `contents` into `path` via a sibling temp file, holding an exclusive
/// advisory lock on `lock_path` so other processes never interleave writes.
fn replace_file(dir: &Path, path: &Path, lock_path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)?;
    FileExt::lock_exclusive(&lock_file)?;

    let tmp_path = path.with_extension("json.tmp");
    let result = (|| {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(contents)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, path)
    })();

    FileExt::unlock(&lock_file)?;
    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn absent_collection_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        let users = store.read(Collection::Users).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn write_creates_directory_and_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("data"));
        let records = vec![json!({"id": "b1", "title": "Dune"})];

        store.write(Collection::Books, records.clone()).await.unwrap();

        let on_disk = std::fs::read_to_string(store.path_for(Collection::Books)).unwrap();
        assert!(on_disk.starts_with("[\n  {"));
        assert_eq!(store.read(Collection::Books).await.unwrap(), records);
    }

    #[tokio::test]
    async fn write_replaces_whole_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store
            .write(Collection::Users, vec![json!({"id": "1"}), json!({"id": "2"})])
            .await
            .unwrap();
        store
            .write(Collection::Users, vec![json!({"id": "3"})])
            .await
            .unwrap();

        let users = store.read(Collection::Users).await.unwrap();
        assert_eq!(users, vec![json!({"id": "3"})]);
        assert!(!store.path_for(Collection::Users).with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn collections_are_stored_separately() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store
            .write(Collection::Books, vec![json!({"id": "b"})])
            .await
            .unwrap();

        assert!(store.read(Collection::Users).await.unwrap().is_empty());
        assert!(dir.path().join("books.json").exists());
        assert!(!dir.path().join("users.json").exists());
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path_for(Collection::Books), b"{not json").unwrap();

        let err = store.read(Collection::Books).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Malformed {
                collection: Collection::Books,
                ..
            }
        ));
    }
}

//! In-process record store used by tests and ephemeral runs.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{Collection, RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Value>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every read and write fails with an I/O error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self, collection: Collection) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                collection,
                source: io::Error::other("memory store marked unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn read(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        self.check_available(collection)?;
        Ok(self
            .collections
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError> {
        self.check_available(collection)?;
        self.collections.lock().insert(collection, records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn unavailable_store_fails_both_directions() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(store.read(Collection::Users).await.is_err());
        assert!(store
            .write(Collection::Users, vec![json!({})])
            .await
            .is_err());

        store.set_unavailable(false);
        assert!(store.read(Collection::Users).await.unwrap().is_empty());
    }
}

//! Record store: whole-collection JSON persistence behind an async trait.
//!
//! A collection is an ordered sequence of JSON objects. `read` of an absent
//! collection yields an empty sequence; `write` replaces the collection.
//! Callers that read-modify-write must hold the collection's lock from
//! [`CollectionLocks`] for the whole sequence.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::errors::domain::{DomainError, InfraErrorKind};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Logical collections persisted by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Books,
}

impl Collection {
    pub const fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Books => "books",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} store I/O failed: {source}")]
    Io {
        collection: Collection,
        #[source]
        source: std::io::Error,
    },
    #[error("{collection} store holds malformed JSON: {source}")]
    Malformed {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
    #[error("{collection} record could not be encoded: {source}")]
    Encode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        let kind = match err {
            StoreError::Io { .. } => InfraErrorKind::StoreIo,
            StoreError::Malformed { .. } | StoreError::Encode { .. } => {
                InfraErrorKind::DataCorruption
            }
        };
        DomainError::infra(kind, err.to_string())
    }
}

/// Durable mapping from collection to an ordered sequence of JSON records.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// Load every record in `collection`; empty if it was never written.
    async fn read(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;

    /// Replace the whole of `collection` with `records`.
    async fn write(&self, collection: Collection, records: Vec<Value>) -> Result<(), StoreError>;
}

/// Read a collection and decode each record as `T`.
pub async fn read_all<T: DeserializeOwned>(
    store: &dyn RecordStore,
    collection: Collection,
) -> Result<Vec<T>, StoreError> {
    store
        .read(collection)
        .await?
        .into_iter()
        .map(|value| {
            serde_json::from_value(value)
                .map_err(|source| StoreError::Malformed { collection, source })
        })
        .collect()
}

/// Encode `records` and overwrite `collection` with them.
pub async fn write_all<T: Serialize>(
    store: &dyn RecordStore,
    collection: Collection,
    records: &[T],
) -> Result<(), StoreError> {
    let values = records
        .iter()
        .map(|record| {
            serde_json::to_value(record).map_err(|source| StoreError::Encode { collection, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    store.write(collection, values).await
}

/// One async mutex per collection, serializing read-modify-write cycles
/// within this process.
#[derive(Debug, Default)]
pub struct CollectionLocks {
    users: Mutex<()>,
    books: Mutex<()>,
}

impl CollectionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, collection: Collection) -> MutexGuard<'_, ()> {
        match collection {
            Collection::Users => self.users.lock().await,
            Collection::Books => self.books.lock().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: String,
        n: u32,
    }

    #[tokio::test]
    async fn typed_helpers_roundtrip_through_store() {
        let store = MemoryStore::new();
        let rows = vec![
            Row {
                id: "a".into(),
                n: 1,
            },
            Row {
                id: "b".into(),
                n: 2,
            },
        ];

        write_all(&store, Collection::Books, &rows).await.unwrap();
        let back: Vec<Row> = read_all(&store, Collection::Books).await.unwrap();

        assert_eq!(back, rows);
        assert!(read_all::<Row>(&store, Collection::Users)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn malformed_record_surfaces_as_data_corruption() {
        let store = MemoryStore::new();
        store
            .write(Collection::Users, vec![json!({"id": 5})])
            .await
            .unwrap();

        let err = read_all::<Row>(&store, Collection::Users)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));

        let domain: DomainError = err.into();
        assert!(matches!(
            domain,
            DomainError::Infra(InfraErrorKind::DataCorruption, _)
        ));
    }

    #[tokio::test]
    async fn collection_lock_serializes_holders() {
        let locks = Arc::new(CollectionLocks::new());
        let guard = locks.acquire(Collection::Books).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _g = locks.acquire(Collection::Books).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        // A different collection is independent.
        drop(locks.acquire(Collection::Users).await);

        drop(guard);
        contender.await.unwrap();
    }
}

use std::sync::Arc;

use super::security_config::SecurityConfig;
use crate::store::{CollectionLocks, MemoryStore, RecordStore};

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    /// Users/books persistence
    pub store: Arc<dyn RecordStore>,
    /// Per-collection locks held across read-modify-write
    pub locks: Arc<CollectionLocks>,
    /// Security configuration including JWT settings
    pub security: SecurityConfig,
}

impl AppState {
    /// Create a new AppState over the given store and security config
    pub fn new(store: Arc<dyn RecordStore>, security: SecurityConfig) -> Self {
        Self {
            store,
            locks: Arc::new(CollectionLocks::new()),
            security,
        }
    }

    /// AppState backed by a fresh in-memory store
    pub fn in_memory(security: SecurityConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), security)
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }
}

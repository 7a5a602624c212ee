use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use super::r#trait::{ChangeSet, Collection, RecordStore, StoreError};

/// In-memory record store.
///
/// Intended for tests/dev, and used when no data path is configured.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<Collection, Vec<JsonValue>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get(&self, collection: Collection) -> Result<Vec<JsonValue>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        if changes.is_empty() {
            return Ok(());
        }

        // One write lock for the whole change set: readers see all or nothing.
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        for (collection, records) in changes.into_writes() {
            collections.insert(collection, records);
        }
        Ok(())
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Named, ordered collections of JSON records.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Customers,
    Vehicles,
    SpareParts,
    Vendors,
    VendorPayments,
    Visits,
    Counters,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Customers,
        Collection::Vehicles,
        Collection::SpareParts,
        Collection::Vendors,
        Collection::VendorPayments,
        Collection::Visits,
        Collection::Counters,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Customers => "customers",
            Collection::Vehicles => "vehicles",
            Collection::SpareParts => "spare_parts",
            Collection::Vendors => "vendors",
            Collection::VendorPayments => "vendor_payments",
            Collection::Visits => "visits",
            Collection::Counters => "counters",
        }
    }
}

impl core::fmt::Display for Collection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record store operation error.
///
/// These are infrastructure failures. They are surfaced to the caller as-is
/// and never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("corrupt record in {collection}: {message}")]
    Corrupt {
        collection: Collection,
        message: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Whole-collection writes staged for one atomic commit.
///
/// Staging the same collection twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    writes: BTreeMap<Collection, Vec<JsonValue>>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage raw records for `collection`.
    pub fn put(&mut self, collection: Collection, records: Vec<JsonValue>) -> &mut Self {
        self.writes.insert(collection, records);
        self
    }

    /// Serialize typed records and stage them for `collection`.
    pub fn stage<T: Serialize>(
        &mut self,
        collection: Collection,
        records: &[T],
    ) -> Result<&mut Self, StoreError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Serialization(format!("{collection}: {e}")))?;
        Ok(self.put(collection, values))
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn collections(&self) -> impl Iterator<Item = Collection> + '_ {
        self.writes.keys().copied()
    }

    pub fn into_writes(self) -> BTreeMap<Collection, Vec<JsonValue>> {
        self.writes
    }
}

/// Persistence contract consumed by the shop services.
///
/// ## Semantics
///
/// - `get` returns a collection's records in stored order, or an empty vector
///   if the collection was never written.
/// - `commit` replaces every staged collection atomically: after it returns
///   `Ok`, all writes are visible; after it returns `Err`, none are.
/// - `put` is a single-collection commit.
///
/// Implementations do not serialize read-modify-write sequences; callers
/// hold a [`WriteGate`](super::WriteGate) for that.
pub trait RecordStore: Send + Sync {
    fn get(&self, collection: Collection) -> Result<Vec<JsonValue>, StoreError>;

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;

    fn put(&self, collection: Collection, records: Vec<JsonValue>) -> Result<(), StoreError> {
        let mut changes = ChangeSet::new();
        changes.put(collection, records);
        self.commit(changes)
    }
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn get(&self, collection: Collection) -> Result<Vec<JsonValue>, StoreError> {
        (**self).get(collection)
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        (**self).commit(changes)
    }

    fn put(&self, collection: Collection, records: Vec<JsonValue>) -> Result<(), StoreError> {
        (**self).put(collection, records)
    }
}

/// Shared, type-erased store handle.
pub type DynStore = Arc<dyn RecordStore>;

/// Read and decode a whole collection.
pub fn load<T, S>(store: &S, collection: Collection) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    S: RecordStore + ?Sized,
{
    store
        .get(collection)?
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
                collection,
                message: format!("record {idx}: {e}"),
            })
        })
        .collect()
}

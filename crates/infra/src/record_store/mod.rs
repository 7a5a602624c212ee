//! Record store boundary.
//!
//! The shop persists whole collections of JSON records. This module defines
//! the storage contract, a transactional [`ChangeSet`] for writes spanning
//! several collections, and two adapters.

pub mod gate;
pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use gate::WriteGate;
pub use in_memory::InMemoryRecordStore;
pub use json_file::JsonFileRecordStore;
pub use r#trait::{ChangeSet, Collection, DynStore, RecordStore, StoreError, load};

//! Infrastructure layer: record storage, shop services, read-side views and
//! configuration.

pub mod config;
pub mod directory;
pub mod error;
pub mod ledger;
pub mod projections;
pub mod record_store;
pub mod shop;
pub mod workflow;


pub use config::{ConfigError, ShopConfig};
pub use directory::{Directory, DirectoryMatch};
pub use error::{ShopError, ShopResult};
pub use ledger::{InventoryLedger, PartsCache};
pub use record_store::{
    ChangeSet, Collection, DynStore, InMemoryRecordStore, JsonFileRecordStore, RecordStore,
    StoreError, WriteGate,
};
pub use shop::{Shop, open_store};
pub use workflow::{Counter, VisitWorkflow};

/// Default cap on search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

//! Inventory domain module (spare parts, vendors and vendor payments).
//!
//! This crate contains business rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Persisting stock
//! and credit changes is the ledger's job in `pitstop-infra`.

pub mod part;
pub mod payment;
pub mod stock;
pub mod vendor;

pub use part::{PartDraft, PartForm, SparePart, ensure_unique_part_number};
pub use payment::VendorPayment;
pub use stock::{StockAdjustment, StockDemand, StockReason, audit_adjustments, check_availability};
pub use vendor::{Vendor, VendorForm};

//! Parties domain module (customers and their vehicles).
//!
//! This crate contains business rules for the shop's customer directory,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod customer;
pub mod vehicle;

pub use customer::{Customer, CustomerForm};
pub use vehicle::{Vehicle, VehicleForm};

/// Trim a free-text field, mapping blank input to `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

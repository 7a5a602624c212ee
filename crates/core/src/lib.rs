//! `pitstop-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot, DomainEvent};
pub use entity::{Entity, Labelled, Ref};
pub use error::{DomainError, DomainResult, EntityKind, Rejection};
pub use id::{CustomerId, PartId, PaymentId, VehicleId, VendorId, VisitNumber};
pub use money::Decimal;
pub use value_object::ValueObject;

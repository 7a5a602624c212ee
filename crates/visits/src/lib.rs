//! Visits domain module (service jobs and their invoices).
//!
//! A visit bundles labor and parts for one vehicle. It is a plain
//! decide/apply aggregate: commands are validated without side effects,
//! events mutate state and recompute totals. Stock is not touched here; the
//! workflow in `pitstop-infra` debits it when a visit completes.

pub mod lines;
pub mod totals;
pub mod visit;

pub use lines::{
    NextVisit, PartLine, PartSnapshot, PaymentMethod, ServiceLine, VisitDetails, VisitStatus,
};
pub use totals::{VisitTotals, compute_totals};
pub use visit::{Visit, VisitCommand, VisitEvent};

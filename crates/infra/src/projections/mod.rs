//! Read-side views derived from stored records.
//!
//! Projections here are pure functions over loaded collections: they never
//! write, and a dangling reference resolves to a placeholder instead of an
//! error.

pub mod active_visits;
pub mod invoice;
pub mod reminders;
pub mod upcoming;

pub use active_visits::{ActiveVisit, active_visits};
pub use invoice::{InvoiceCustomer, InvoicePartLine, InvoiceVehicle, InvoiceView, invoice_view};
pub use reminders::{MaintenanceReminder, REMINDER_THRESHOLD_DAYS, maintenance_reminders};
pub use upcoming::{UpcomingQuery, UpcomingVisit, UpcomingWindow, Urgency, upcoming_visits};

use pitstop_core::Ref;
use pitstop_parties::Customer;

/// Mobile number of a resolved customer, or `""` when dangling.
pub(crate) fn mobile_of(customer: &Ref<Customer>) -> String {
    customer
        .get()
        .map(|c| c.mobile.clone())
        .unwrap_or_default()
}

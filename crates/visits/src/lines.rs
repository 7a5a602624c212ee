//! Value types carried by a visit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pitstop_core::{Decimal, PartId, ValueObject};

/// Lifecycle state. `Completed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitStatus {
    #[default]
    Draft,
    Completed,
}

impl core::fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            VisitStatus::Draft => f.write_str("Draft"),
            VisitStatus::Completed => f.write_str("Completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
    Credit,
}

/// One labor line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLine {
    pub name: String,
    pub cost: Decimal,
}

impl ValueObject for ServiceLine {}

/// One parts line. Name and price are copied from the part when it is first
/// added, so later price edits do not change the visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartLine {
    pub part_id: PartId,
    pub name: String,
    pub price: Decimal,
    pub qty: i64,
}

impl PartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

impl ValueObject for PartLine {}

/// What the editor knows about a part at the moment it is picked.
///
/// `stock` is the cached figure, not a fresh read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartSnapshot {
    pub part_id: PartId,
    pub name: String,
    pub price: Decimal,
    pub stock: i64,
}

impl PartSnapshot {
    pub fn of(part: &pitstop_inventory::SparePart) -> Self {
        Self {
            part_id: part.id,
            name: part.name.clone(),
            price: part.price,
            stock: part.stock(),
        }
    }
}

/// A follow-up appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextVisit {
    pub date: NaiveDate,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub notes: String,
}

impl ValueObject for NextVisit {}

/// The editable, non-line fields of a visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitDetails {
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub technician: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub mileage: Option<u64>,
    #[serde(default)]
    pub tax_enabled: bool,
    #[serde(default)]
    pub next_visit: Option<NextVisit>,
}

impl ValueObject for VisitDetails {}

//! Visit totals.

use serde::{Deserialize, Serialize};

use pitstop_core::{Decimal, ValueObject};

use crate::lines::{PartLine, ServiceLine};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitTotals {
    pub labor: Decimal,
    pub parts: Decimal,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub final_total: Decimal,
}

impl ValueObject for VisitTotals {}

/// `final_total = subtotal + tax - discount`, where tax is `subtotal * rate`
/// when enabled. The result is not clamped: a discount larger than the bill
/// gives a negative total.
pub fn compute_totals(
    services: &[ServiceLine],
    parts: &[PartLine],
    discount: Decimal,
    tax_enabled: bool,
    tax_rate: Decimal,
) -> VisitTotals {
    let labor: Decimal = services.iter().map(|s| s.cost).sum();
    let parts: Decimal = parts.iter().map(PartLine::line_total).sum();
    let subtotal = labor + parts;
    let tax = if tax_enabled {
        subtotal * tax_rate
    } else {
        Decimal::ZERO
    };
    VisitTotals {
        labor,
        parts,
        subtotal,
        tax,
        final_total: subtotal + tax - discount,
    }
}

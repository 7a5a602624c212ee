use chrono::{DateTime, Utc};
use serde::Serialize;

use pitstop_core::{CustomerId, Decimal, DomainError, Rejection, Ref, VehicleId, VisitNumber};
use pitstop_parties::{Customer, Vehicle};
use pitstop_visits::{NextVisit, PaymentMethod, ServiceLine, Visit, VisitTotals};

use super::mobile_of;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCustomer {
    pub id: CustomerId,
    pub name: String,
    pub mobile: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceVehicle {
    pub id: VehicleId,
    pub label: String,
    pub plate_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePartLine {
    pub name: String,
    pub price: Decimal,
    pub qty: i64,
    pub line_total: Decimal,
}

/// Structured invoice for a completed visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    pub number: Option<VisitNumber>,
    pub issued_at: Option<DateTime<Utc>>,
    pub customer: InvoiceCustomer,
    pub vehicle: InvoiceVehicle,
    pub technician: String,
    pub payment_method: PaymentMethod,
    pub mileage: Option<u64>,
    pub services: Vec<ServiceLine>,
    pub parts: Vec<InvoicePartLine>,
    pub discount: Decimal,
    pub tax_enabled: bool,
    /// Tax rate as a percentage, from the rate stored on the visit.
    pub tax_percent: Decimal,
    pub tax_label: String,
    pub totals: VisitTotals,
    pub notes: String,
    pub next_visit: Option<NextVisit>,
}

pub fn invoice_view(
    visit: &Visit,
    customers: &[Customer],
    vehicles: &[Vehicle],
) -> Result<InvoiceView, DomainError> {
    if !visit.is_completed() {
        return Err(Rejection::VisitNotCompleted {
            visit: visit
                .number()
                .map(|n| n.to_string())
                .unwrap_or_default(),
        }
        .into());
    }

    let customer = Ref::resolve(visit.customer_id(), customers);
    let vehicle = Ref::resolve(visit.vehicle_id(), vehicles);
    let details = visit.details();
    let tax_percent = (visit.tax_rate() * Decimal::ONE_HUNDRED).normalize();

    Ok(InvoiceView {
        number: visit.number(),
        issued_at: visit.completed_at(),
        customer: InvoiceCustomer {
            id: visit.customer_id(),
            name: customer.label(),
            mobile: mobile_of(&customer),
        },
        vehicle: InvoiceVehicle {
            id: visit.vehicle_id(),
            label: vehicle.label(),
            plate_number: vehicle
                .get()
                .map(|v| v.plate_number.clone())
                .unwrap_or_default(),
        },
        technician: details.technician,
        payment_method: details.payment_method,
        mileage: details.mileage,
        services: visit.services().to_vec(),
        parts: visit
            .parts()
            .iter()
            .map(|line| InvoicePartLine {
                name: line.name.clone(),
                price: line.price,
                qty: line.qty,
                line_total: line.line_total(),
            })
            .collect(),
        discount: details.discount,
        tax_enabled: details.tax_enabled,
        tax_percent,
        tax_label: format!("Tax ({tax_percent}%)"),
        totals: visit.totals(),
        notes: details.notes,
        next_visit: details.next_visit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitstop_core::Aggregate;
    use pitstop_visits::VisitCommand;

    fn visit_with_rate(rate: Decimal) -> Visit {
        let mut visit = Visit::begin(
            Some(CustomerId::new()),
            Some(VehicleId::new()),
            rate,
            Utc::now(),
        )
        .unwrap();
        visit
            .execute(&VisitCommand::AddService {
                name: "Labor".to_string(),
                cost: Decimal::new(100, 0),
            })
            .unwrap();
        visit
    }

    #[test]
    fn drafts_have_no_invoice() {
        let visit = visit_with_rate(Decimal::new(15, 2));
        let err = invoice_view(&visit, &[], &[]).unwrap_err();
        assert_eq!(
            err.rejection().map(Rejection::code),
            Some("visit_not_completed")
        );
    }

    #[test]
    fn tax_label_follows_the_stored_rate() {
        let mut visit = visit_with_rate(Decimal::new(14, 2));
        visit
            .execute(&VisitCommand::Complete { at: Utc::now() })
            .unwrap();

        let invoice = invoice_view(&visit, &[], &[]).unwrap();
        assert_eq!(invoice.tax_percent, Decimal::new(14, 0));
        assert_eq!(invoice.tax_label, "Tax (14%)");
        assert_eq!(invoice.customer.name, "Unknown");
        assert_eq!(invoice.vehicle.plate_number, "");
        assert_eq!(invoice.services.len(), 1);
        assert_eq!(invoice.issued_at, visit.completed_at());
    }
}

use serde::Deserialize;

use pitstop_core::money::parse_amount;
use pitstop_core::{CustomerId, Decimal, DomainResult, PartId, VehicleId, VendorId};
use pitstop_infra::projections::{UpcomingQuery, UpcomingWindow};
use pitstop_inventory::{PartForm, StockReason};

// -------------------------
// Request DTOs
// -------------------------

/// A money or quantity field as typed by a client: `12.5` or `"12.5"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    pub fn raw(&self) -> String {
        match self {
            Amount::Number(n) => n.to_string(),
            Amount::Text(s) => s.clone(),
        }
    }

    pub fn decimal(&self, field: &'static str) -> DomainResult<Decimal> {
        parse_amount(field, &self.raw())
    }
}

fn raw_or_blank(amount: &Option<Amount>) -> String {
    amount.as_ref().map(Amount::raw).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePartRequest {
    #[serde(default)]
    pub id: Option<PartId>,
    #[serde(default)]
    pub part_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub price: Option<Amount>,
    #[serde(default)]
    pub cost: Option<Amount>,
    #[serde(default)]
    pub stock: Option<Amount>,
}

impl SavePartRequest {
    pub fn into_form(self) -> PartForm {
        PartForm {
            price: raw_or_blank(&self.price),
            cost: raw_or_blank(&self.cost),
            stock: raw_or_blank(&self.stock),
            id: self.id,
            part_number: self.part_number,
            name: self.name,
            category: self.category,
            vendor_id: self.vendor_id,
            barcode: self.barcode,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
    #[serde(default)]
    pub reason: Option<StockReason>,
}

impl AdjustStockRequest {
    pub fn reason(&self) -> StockReason {
        self.reason.unwrap_or(StockReason::Manual)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditCount {
    pub part_id: PartId,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct AuditRequest {
    pub counts: Vec<AuditCount>,
}

#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Amount,
}

#[derive(Debug, Deserialize)]
pub struct VendorPaymentRequest {
    pub amount: Amount,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginVisitRequest {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub vehicle_id: Option<VehicleId>,
}

#[derive(Debug, Deserialize)]
pub struct AddServiceRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub cost: Option<Amount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPartRequest {
    pub part_id: PartId,
}

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilter {
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VisitFilter {
    /// Only drafts, as work-board rows.
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingParams {
    #[serde(default)]
    pub from: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub to: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub window: Option<UpcomingWindow>,
}

impl From<UpcomingParams> for UpcomingQuery {
    fn from(value: UpcomingParams) -> Self {
        UpcomingQuery {
            from: value.from,
            to: value.to,
            window: value.window.unwrap_or_default(),
        }
    }
}

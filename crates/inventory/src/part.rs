use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pitstop_core::money::{
    ensure_not_negative, parse_amount, parse_amount_or_zero, parse_quantity_or_zero,
};
use pitstop_core::{
    Decimal, DomainError, DomainResult, Entity, Labelled, PartId, Rejection, VendorId,
};

/// A spare part held in stock.
///
/// `stock` is the on-hand quantity and only changes through
/// [`SparePart::apply_stock_delta`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparePart {
    pub id: PartId,
    pub part_number: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub vendor_id: Option<VendorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    stock: i64,
    #[serde(default)]
    pub initial_stock: i64,
    #[serde(default)]
    pub last_restock_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Operator input for a part, with numbers still as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartForm {
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
    pub price: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub stock: String,
}

/// A validated [`PartForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDraft {
    pub id: Option<PartId>,
    pub part_number: String,
    pub name: String,
    pub category: Option<String>,
    pub vendor_id: Option<VendorId>,
    pub barcode: Option<String>,
    pub price: Decimal,
    pub cost: Decimal,
    pub stock: i64,
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl PartForm {
    /// Part number and name are required, price must be a number, cost and
    /// stock default to zero when left blank.
    pub fn validate(&self) -> DomainResult<PartDraft> {
        let part_number = self.part_number.trim();
        if part_number.is_empty() {
            return Err(DomainError::missing("partNumber"));
        }
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::missing("name"));
        }
        let price = ensure_not_negative("price", parse_amount("price", &self.price)?)?;
        let cost = ensure_not_negative("cost", parse_amount_or_zero("cost", &self.cost)?)?;
        let stock = parse_quantity_or_zero("stock", &self.stock)?;
        if stock < 0 {
            return Err(Rejection::NegativeAmount { field: "stock" }.into());
        }

        Ok(PartDraft {
            id: self.id,
            part_number: part_number.to_string(),
            name: name.to_string(),
            category: trimmed(self.category.as_deref()),
            vendor_id: self.vendor_id,
            barcode: trimmed(self.barcode.as_deref()),
            price,
            cost,
            stock,
        })
    }
}

/// Reject a draft whose part number is already used by another part.
pub fn ensure_unique_part_number(parts: &[SparePart], draft: &PartDraft) -> DomainResult<()> {
    let taken = parts
        .iter()
        .any(|p| p.part_number == draft.part_number && Some(p.id) != draft.id);
    if taken {
        return Err(Rejection::DuplicatePartNumber {
            part_number: draft.part_number.clone(),
        }
        .into());
    }
    Ok(())
}

impl SparePart {
    pub fn create(draft: &PartDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: draft.id.unwrap_or_default(),
            part_number: draft.part_number.clone(),
            name: draft.name.clone(),
            category: draft.category.clone(),
            vendor_id: draft.vendor_id,
            barcode: draft.barcode.clone(),
            price: draft.price,
            cost: draft.cost,
            stock: draft.stock,
            initial_stock: draft.stock,
            last_restock_date: (draft.stock > 0).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stock(&self) -> i64 {
        self.stock
    }

    /// Copy descriptive fields from `draft` and return the stock delta the
    /// edit implies. Stock itself is left for the caller to adjust.
    pub fn apply_details(&mut self, draft: &PartDraft, now: DateTime<Utc>) -> i64 {
        self.part_number = draft.part_number.clone();
        self.name = draft.name.clone();
        self.category = draft.category.clone();
        self.vendor_id = draft.vendor_id;
        self.barcode = draft.barcode.clone();
        self.price = draft.price;
        self.cost = draft.cost;
        self.updated_at = now;
        draft.stock - self.stock
    }

    /// Add `delta` (possibly negative) to the on-hand quantity.
    pub fn apply_stock_delta(&mut self, delta: i64, now: DateTime<Utc>) -> i64 {
        self.stock += delta;
        if delta > 0 {
            self.last_restock_date = Some(now);
        }
        self.updated_at = now;
        self.stock
    }

    /// Debt owed to the vendor for the stock a new part arrives with.
    pub fn restock_credit(&self) -> Option<(VendorId, Decimal)> {
        let vendor_id = self.vendor_id?;
        if self.stock <= 0 {
            return None;
        }
        Some((vendor_id, self.cost * Decimal::from(self.stock)))
    }

    /// Case-insensitive match on name or part number.
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.part_number.to_lowercase().contains(needle_lower)
    }
}

impl Entity for SparePart {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Labelled for SparePart {
    const PLACEHOLDER: &'static str = "?";

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.part_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PartForm {
        PartForm {
            part_number: "OF-100".to_string(),
            name: "Oil filter".to_string(),
            price: "12.50".to_string(),
            cost: "8".to_string(),
            stock: "4".to_string(),
            ..PartForm::default()
        }
    }

    #[test]
    fn blank_cost_and_stock_default_to_zero() {
        let draft = PartForm {
            cost: String::new(),
            stock: "  ".to_string(),
            ..form()
        }
        .validate()
        .unwrap();
        assert_eq!(draft.cost, Decimal::ZERO);
        assert_eq!(draft.stock, 0);
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let err = PartForm {
            price: "twelve".to_string(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.rejection().map(Rejection::code), Some("invalid_number"));
    }

    #[test]
    fn fractional_stock_is_rejected() {
        let err = PartForm {
            stock: "1.5".to_string(),
            ..form()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.rejection().map(Rejection::code), Some("invalid_number"));
    }

    #[test]
    fn new_part_snapshots_initial_stock() {
        let now = Utc::now();
        let part = SparePart::create(&form().validate().unwrap(), now);
        assert_eq!(part.stock(), 4);
        assert_eq!(part.initial_stock, 4);
        assert_eq!(part.last_restock_date, Some(now));
    }

    #[test]
    fn duplicate_part_number_is_rejected_for_other_parts_only() {
        let part = SparePart::create(&form().validate().unwrap(), Utc::now());
        let parts = vec![part.clone()];

        let mut other = form().validate().unwrap();
        let err = ensure_unique_part_number(&parts, &other).unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::DuplicatePartNumber {
                part_number: "OF-100".to_string()
            })
        );

        other.id = Some(part.id);
        assert!(ensure_unique_part_number(&parts, &other).is_ok());
    }

    #[test]
    fn editing_stock_yields_a_delta_instead_of_overwriting() {
        let now = Utc::now();
        let mut part = SparePart::create(&form().validate().unwrap(), now);
        let draft = PartForm {
            stock: "10".to_string(),
            ..form()
        }
        .validate()
        .unwrap();
        let delta = part.apply_details(&draft, now);
        assert_eq!(delta, 6);
        assert_eq!(part.stock(), 4);
        assert_eq!(part.apply_stock_delta(delta, now), 10);
    }

    #[test]
    fn restock_credit_is_cost_times_stock() {
        let vendor = VendorId::new();
        let part = SparePart::create(
            &PartForm {
                vendor_id: Some(vendor),
                ..form()
            }
            .validate()
            .unwrap(),
            Utc::now(),
        );
        assert_eq!(part.restock_credit(), Some((vendor, Decimal::from(32))));

        let no_vendor = SparePart::create(&form().validate().unwrap(), Utc::now());
        assert_eq!(no_vendor.restock_credit(), None);
    }

    #[test]
    fn persisted_shape_uses_camel_case() {
        let part = SparePart::create(&form().validate().unwrap(), Utc::now());
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["partNumber"], "OF-100");
        assert_eq!(json["initialStock"], 4);
        assert_eq!(json["stock"], 4);
    }
}

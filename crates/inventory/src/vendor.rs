use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pitstop_core::{Decimal, DomainError, DomainResult, Entity, Labelled, VendorId};

/// A parts supplier and the running debt the shop owes it.
///
/// `credit` goes up when stock is bought on account and down when the shop
/// pays; it may turn negative after an overpayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    credit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Operator input for a vendor. There is no credit field: credit only moves
/// through ledger deltas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorForm {
    #[serde(default)]
    pub id: Option<VendorId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl VendorForm {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::missing("name"));
        }
        Ok(())
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Vendor {
    /// New vendors always start with zero credit.
    pub fn create(form: &VendorForm, now: DateTime<Utc>) -> DomainResult<Self> {
        form.validate()?;
        Ok(Self {
            id: form.id.unwrap_or_default(),
            name: form.name.trim().to_string(),
            phone: trimmed(form.phone.as_deref()),
            notes: trimmed(form.notes.as_deref()),
            credit: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn merge(&mut self, form: &VendorForm, now: DateTime<Utc>) -> DomainResult<()> {
        form.validate()?;
        self.name = form.name.trim().to_string();
        if form.phone.is_some() {
            self.phone = trimmed(form.phone.as_deref());
        }
        if form.notes.is_some() {
            self.notes = trimmed(form.notes.as_deref());
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn credit(&self) -> Decimal {
        self.credit
    }

    /// Add `amount` (negative to reduce debt) and return the new credit.
    pub fn adjust_credit(&mut self, amount: Decimal, now: DateTime<Utc>) -> Decimal {
        self.credit += amount;
        self.updated_at = now;
        self.credit
    }
}

impl Entity for Vendor {
    type Id = VendorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Labelled for Vendor {
    const PLACEHOLDER: &'static str = "-";

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitstop_core::Ref;

    fn form(name: &str) -> VendorForm {
        VendorForm {
            name: name.to_string(),
            ..VendorForm::default()
        }
    }

    #[test]
    fn new_vendor_starts_at_zero_credit() {
        let vendor = Vendor::create(&form("Parts Co"), Utc::now()).unwrap();
        assert_eq!(vendor.credit(), Decimal::ZERO);
    }

    #[test]
    fn incoming_credit_is_ignored_on_deserialize_of_form() {
        let form: VendorForm =
            serde_json::from_value(serde_json::json!({"name": "Parts Co", "credit": "999"}))
                .unwrap();
        let vendor = Vendor::create(&form, Utc::now()).unwrap();
        assert_eq!(vendor.credit(), Decimal::ZERO);
    }

    #[test]
    fn credit_moves_by_delta_and_may_go_negative() {
        let now = Utc::now();
        let mut vendor = Vendor::create(&form("Parts Co"), now).unwrap();
        assert_eq!(vendor.adjust_credit(Decimal::from(100), now), Decimal::from(100));
        assert_eq!(vendor.adjust_credit(Decimal::from(-130), now), Decimal::from(-30));
    }

    #[test]
    fn merge_keeps_credit() {
        let now = Utc::now();
        let mut vendor = Vendor::create(&form("Parts Co"), now).unwrap();
        vendor.adjust_credit(Decimal::from(50), now);
        vendor.merge(&form("Parts Company"), now).unwrap();
        assert_eq!(vendor.name, "Parts Company");
        assert_eq!(vendor.credit(), Decimal::from(50));
    }

    #[test]
    fn dangling_vendor_reads_as_dash() {
        let vendors: Vec<Vendor> = Vec::new();
        assert_eq!(Ref::resolve(VendorId::new(), &vendors).label(), "-");
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pitstop_core::money::ensure_positive;
use pitstop_core::{Decimal, DomainResult, PaymentId, VendorId};

/// A payment made to a vendor. Append-only; never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPayment {
    pub id: PaymentId,
    pub vendor_id: VendorId,
    pub amount: Decimal,
    #[serde(default)]
    pub notes: String,
    pub date: DateTime<Utc>,
}

impl VendorPayment {
    pub fn new(
        vendor_id: VendorId,
        amount: Decimal,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let amount = ensure_positive("amount", amount)?;
        Ok(Self {
            id: PaymentId::new(),
            vendor_id,
            amount,
            notes: notes.map(str::trim).unwrap_or_default().to_string(),
            date: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitstop_core::Rejection;

    #[test]
    fn payment_amount_must_be_positive() {
        let err = VendorPayment::new(VendorId::new(), Decimal::ZERO, None, Utc::now()).unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::NonPositiveAmount { field: "amount" })
        );
    }

    #[test]
    fn payment_notes_default_to_empty() {
        let p = VendorPayment::new(VendorId::new(), Decimal::from(40), None, Utc::now()).unwrap();
        assert_eq!(p.notes, "");
        assert_eq!(p.amount, Decimal::from(40));
    }
}

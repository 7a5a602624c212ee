use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pitstop_core::{CustomerId, DomainError, DomainResult, Entity, Labelled};

use crate::non_blank;

/// A customer of the shop.
///
/// Unknown fields written by other tools are kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Operator input for creating or updating a customer.
///
/// Absent optional fields leave the stored value alone on update; a blank
/// string clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForm {
    #[serde(default)]
    pub id: Option<CustomerId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CustomerForm {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::missing("name"));
        }
        Ok(())
    }
}

impl Customer {
    /// Build a new customer from a validated form.
    pub fn create(form: &CustomerForm, now: DateTime<Utc>) -> DomainResult<Self> {
        form.validate()?;
        Ok(Self {
            id: form.id.unwrap_or_default(),
            name: form.name.trim().to_string(),
            mobile: form
                .mobile
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            email: non_blank(form.email.as_deref()),
            address: non_blank(form.address.as_deref()),
            notes: non_blank(form.notes.as_deref()),
            extra: form.extra.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge a form over this record, keeping id and creation time.
    pub fn merge(&mut self, form: &CustomerForm, now: DateTime<Utc>) -> DomainResult<()> {
        form.validate()?;
        self.name = form.name.trim().to_string();
        if let Some(mobile) = &form.mobile {
            self.mobile = mobile.trim().to_string();
        }
        if form.email.is_some() {
            self.email = non_blank(form.email.as_deref());
        }
        if form.address.is_some() {
            self.address = non_blank(form.address.as_deref());
        }
        if form.notes.is_some() {
            self.notes = non_blank(form.notes.as_deref());
        }
        for (key, value) in &form.extra {
            self.extra.insert(key.clone(), value.clone());
        }
        self.updated_at = now;
        Ok(())
    }

    /// Case-insensitive match against the customer name.
    pub fn name_contains(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Labelled for Customer {
    const PLACEHOLDER: &'static str = "Unknown";

    fn label(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitstop_core::{Ref, Rejection};
    use serde_json::json;

    fn form(name: &str) -> CustomerForm {
        CustomerForm {
            name: name.to_string(),
            mobile: Some("0550 123 456".to_string()),
            ..CustomerForm::default()
        }
    }

    #[test]
    fn create_requires_a_name() {
        let err = Customer::create(&form("  "), Utc::now()).unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::MissingField { field: "name" })
        );
    }

    #[test]
    fn merge_keeps_id_and_untouched_fields() {
        let created = Utc::now();
        let mut customer = Customer::create(
            &CustomerForm {
                email: Some("sam@example.com".to_string()),
                ..form("Sam")
            },
            created,
        )
        .unwrap();
        let id = customer.id;

        let later = created + chrono::Duration::minutes(5);
        customer
            .merge(
                &CustomerForm {
                    id: Some(id),
                    name: "Sam Hadid".to_string(),
                    notes: Some("prefers mornings".to_string()),
                    ..CustomerForm::default()
                },
                later,
            )
            .unwrap();

        assert_eq!(customer.id, id);
        assert_eq!(customer.name, "Sam Hadid");
        assert_eq!(customer.mobile, "0550 123 456");
        assert_eq!(customer.email.as_deref(), Some("sam@example.com"));
        assert_eq!(customer.notes.as_deref(), Some("prefers mornings"));
        assert_eq!(customer.created_at, created);
        assert_eq!(customer.updated_at, later);
    }

    #[test]
    fn extra_fields_survive_a_round_trip() {
        let raw = json!({
            "id": CustomerId::new(),
            "name": "Lina",
            "mobile": "",
            "loyaltyTier": "gold",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let customer: Customer = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(customer.extra.get("loyaltyTier"), Some(&json!("gold")));
        let back = serde_json::to_value(&customer).unwrap();
        assert_eq!(back["loyaltyTier"], json!("gold"));
        assert_eq!(back["name"], json!("Lina"));
    }

    #[test]
    fn dangling_customer_reference_reads_unknown() {
        let customers: Vec<Customer> = Vec::new();
        let r = Ref::resolve(CustomerId::new(), &customers);
        assert_eq!(r.label(), "Unknown");
    }
}

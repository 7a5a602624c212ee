use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pitstop_core::{CustomerId, DomainError, DomainResult, Entity, Labelled, VehicleId};

/// A vehicle owned by a customer.
///
/// `customer_id` is a weak reference: deleting the customer leaves it dangling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: VehicleId,
    pub customer_id: CustomerId,
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub plate_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleForm {
    #[serde(default)]
    pub id: Option<VehicleId>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<u16>,
    #[serde(default)]
    pub plate_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VehicleForm {
    /// Validate required fields, returning the owning customer.
    pub fn validate(&self) -> DomainResult<CustomerId> {
        let customer_id = self
            .customer_id
            .ok_or_else(|| DomainError::missing("customerId"))?;
        if self.brand.trim().is_empty() {
            return Err(DomainError::missing("brand"));
        }
        if self.plate_number.trim().is_empty() {
            return Err(DomainError::missing("plateNumber"));
        }
        Ok(customer_id)
    }
}

impl Vehicle {
    pub fn create(form: &VehicleForm, now: DateTime<Utc>) -> DomainResult<Self> {
        let customer_id = form.validate()?;
        Ok(Self {
            id: form.id.unwrap_or_default(),
            customer_id,
            brand: form.brand.trim().to_string(),
            model: form.model.trim().to_string(),
            year: form.year,
            plate_number: form.plate_number.trim().to_string(),
            extra: form.extra.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn merge(&mut self, form: &VehicleForm, now: DateTime<Utc>) -> DomainResult<()> {
        self.customer_id = form.validate()?;
        self.brand = form.brand.trim().to_string();
        self.model = form.model.trim().to_string();
        if form.year.is_some() {
            self.year = form.year;
        }
        self.plate_number = form.plate_number.trim().to_string();
        for (key, value) in &form.extra {
            self.extra.insert(key.clone(), value.clone());
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn plate_contains(&self, needle_lower: &str) -> bool {
        self.plate_number.to_lowercase().contains(needle_lower)
    }
}

impl Entity for Vehicle {
    type Id = VehicleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Labelled for Vehicle {
    const PLACEHOLDER: &'static str = "? (?)";

    /// `"brand model (plate)"`.
    fn label(&self) -> String {
        if self.model.is_empty() {
            format!("{} ({})", self.brand, self.plate_number)
        } else {
            format!("{} {} ({})", self.brand, self.model, self.plate_number)
        }
    }
}

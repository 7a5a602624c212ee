//! Customer and vehicle directory.

use chrono::Utc;
use serde::Serialize;

use pitstop_core::{CustomerId, DomainError, EntityKind, VehicleId};
use pitstop_parties::{Customer, CustomerForm, Vehicle, VehicleForm};

use crate::error::ShopResult;
use crate::record_store::{ChangeSet, Collection, RecordStore, WriteGate, load};

/// A customer/vehicle pair offered when starting a visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMatch {
    pub customer: Customer,
    pub vehicle: Vehicle,
}

#[derive(Debug)]
pub struct Directory<S> {
    store: S,
    gate: WriteGate,
}

impl<S> Directory<S> {
    pub fn new(store: S, gate: WriteGate) -> Self {
        Self { store, gate }
    }
}

impl<S> Directory<S>
where
    S: RecordStore,
{
    pub fn customers(&self) -> ShopResult<Vec<Customer>> {
        Ok(load(&self.store, Collection::Customers)?)
    }

    pub fn customer(&self, id: CustomerId) -> ShopResult<Option<Customer>> {
        Ok(self.customers()?.into_iter().find(|c| c.id == id))
    }

    /// Insert, or merge over the stored customer with the same id.
    pub fn save_customer(&self, form: &CustomerForm) -> ShopResult<Customer> {
        form.validate()?;
        let now = Utc::now();

        let _guard = self.gate.acquire()?;
        let mut customers = self.customers()?;
        let saved = match form
            .id
            .and_then(|id| customers.iter().position(|c| c.id == id))
        {
            Some(idx) => {
                customers[idx].merge(form, now)?;
                customers[idx].clone()
            }
            None => {
                let customer = Customer::create(form, now)?;
                customers.push(customer.clone());
                customer
            }
        };

        let mut changes = ChangeSet::new();
        changes.stage(Collection::Customers, &customers)?;
        self.store.commit(changes)?;
        tracing::info!(customer_id = %saved.id, "customer saved");
        Ok(saved)
    }

    /// Remove a customer. Their vehicles and visits are left in place.
    pub fn delete_customer(&self, id: CustomerId) -> ShopResult<bool> {
        let _guard = self.gate.acquire()?;
        let mut customers = self.customers()?;
        let before = customers.len();
        customers.retain(|c| c.id != id);
        if customers.len() == before {
            return Ok(false);
        }
        let mut changes = ChangeSet::new();
        changes.stage(Collection::Customers, &customers)?;
        self.store.commit(changes)?;
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(true)
    }

    /// Vehicles in stored order, optionally for one customer.
    pub fn vehicles(&self, customer_id: Option<CustomerId>) -> ShopResult<Vec<Vehicle>> {
        let vehicles: Vec<Vehicle> = load(&self.store, Collection::Vehicles)?;
        Ok(match customer_id {
            Some(id) => vehicles.into_iter().filter(|v| v.customer_id == id).collect(),
            None => vehicles,
        })
    }

    pub fn vehicle(&self, id: VehicleId) -> ShopResult<Option<Vehicle>> {
        Ok(self.vehicles(None)?.into_iter().find(|v| v.id == id))
    }

    /// Insert or update a vehicle. The owning customer must exist.
    pub fn save_vehicle(&self, form: &VehicleForm) -> ShopResult<Vehicle> {
        let customer_id = form.validate()?;
        let now = Utc::now();

        let _guard = self.gate.acquire()?;
        if self.customer(customer_id)?.is_none() {
            return Err(DomainError::not_found(EntityKind::Customer, customer_id).into());
        }

        let mut vehicles = self.vehicles(None)?;
        let saved = match form
            .id
            .and_then(|id| vehicles.iter().position(|v| v.id == id))
        {
            Some(idx) => {
                vehicles[idx].merge(form, now)?;
                vehicles[idx].clone()
            }
            None => {
                let vehicle = Vehicle::create(form, now)?;
                vehicles.push(vehicle.clone());
                vehicle
            }
        };

        let mut changes = ChangeSet::new();
        changes.stage(Collection::Vehicles, &vehicles)?;
        self.store.commit(changes)?;
        tracing::info!(vehicle_id = %saved.id, customer_id = %customer_id, "vehicle saved");
        Ok(saved)
    }

    pub fn delete_vehicle(&self, id: VehicleId) -> ShopResult<bool> {
        let _guard = self.gate.acquire()?;
        let mut vehicles = self.vehicles(None)?;
        let before = vehicles.len();
        vehicles.retain(|v| v.id != id);
        if vehicles.len() == before {
            return Ok(false);
        }
        let mut changes = ChangeSet::new();
        changes.stage(Collection::Vehicles, &vehicles)?;
        self.store.commit(changes)?;
        tracing::info!(vehicle_id = %id, "vehicle deleted");
        Ok(true)
    }

    /// Customer/vehicle pairs where the customer name or the plate contains
    /// `term`, in customer order. A blank term matches every pair.
    pub fn search(&self, term: &str, limit: usize) -> ShopResult<Vec<DirectoryMatch>> {
        let needle = term.trim().to_lowercase();
        let customers = self.customers()?;
        let vehicles = self.vehicles(None)?;

        let mut matches = Vec::new();
        for customer in &customers {
            let customer_matches = needle.is_empty() || customer.name_contains(&needle);
            for vehicle in vehicles.iter().filter(|v| v.customer_id == customer.id) {
                if matches.len() >= limit {
                    return Ok(matches);
                }
                if customer_matches || vehicle.plate_contains(&needle) {
                    matches.push(DirectoryMatch {
                        customer: customer.clone(),
                        vehicle: vehicle.clone(),
                    });
                }
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::InMemoryRecordStore;
    use pitstop_core::Rejection;
    use std::sync::Arc;

    fn directory() -> Directory<Arc<InMemoryRecordStore>> {
        Directory::new(Arc::new(InMemoryRecordStore::new()), WriteGate::new())
    }

    fn customer(dir: &Directory<Arc<InMemoryRecordStore>>, name: &str) -> Customer {
        dir.save_customer(&CustomerForm {
            name: name.to_string(),
            ..CustomerForm::default()
        })
        .unwrap()
    }

    fn vehicle(dir: &Directory<Arc<InMemoryRecordStore>>, owner: CustomerId, plate: &str) -> Vehicle {
        dir.save_vehicle(&VehicleForm {
            customer_id: Some(owner),
            brand: "Kia".to_string(),
            model: "Rio".to_string(),
            plate_number: plate.to_string(),
            ..VehicleForm::default()
        })
        .unwrap()
    }

    #[test]
    fn customer_upsert_merges_by_id() {
        let dir = directory();
        let c = customer(&dir, "Sam");
        dir.save_customer(&CustomerForm {
            id: Some(c.id),
            name: "Samir".to_string(),
            ..CustomerForm::default()
        })
        .unwrap();
        let all = dir.customers().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Samir");
        assert_eq!(all[0].created_at, c.created_at);
    }

    #[test]
    fn vehicle_needs_an_existing_customer() {
        let dir = directory();
        let err = dir
            .save_vehicle(&VehicleForm {
                customer_id: Some(CustomerId::new()),
                brand: "Kia".to_string(),
                plate_number: "X-1".to_string(),
                ..VehicleForm::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::ShopError::Domain(DomainError::NotFound {
                kind: EntityKind::Customer,
                ..
            })
        ));

        let err = dir
            .save_vehicle(&VehicleForm {
                brand: "Kia".to_string(),
                ..VehicleForm::default()
            })
            .unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::MissingField { field: "customerId" })
        );
    }

    #[test]
    fn deleting_a_customer_keeps_their_vehicles() {
        let dir = directory();
        let c = customer(&dir, "Sam");
        let v = vehicle(&dir, c.id, "AB-12");
        assert!(dir.delete_customer(c.id).unwrap());
        assert!(!dir.delete_customer(c.id).unwrap());
        assert_eq!(dir.vehicle(v.id).unwrap().unwrap().customer_id, c.id);
    }

    #[test]
    fn search_matches_customer_name_or_plate() {
        let dir = directory();
        let sam = customer(&dir, "Sam Hadid");
        let lina = customer(&dir, "Lina");
        vehicle(&dir, sam.id, "AB-12");
        vehicle(&dir, sam.id, "CD-34");
        vehicle(&dir, lina.id, "SAM-99");

        let by_name = dir.search("hadid", 50).unwrap();
        assert_eq!(by_name.len(), 2);

        let by_plate = dir.search("cd-3", 50).unwrap();
        assert_eq!(by_plate.len(), 1);
        assert_eq!(by_plate[0].vehicle.plate_number, "CD-34");

        let both = dir.search("sam", 50).unwrap();
        assert_eq!(both.len(), 3);

        assert_eq!(dir.search("", 2).unwrap().len(), 2);
        assert_eq!(dir.vehicles(Some(lina.id)).unwrap().len(), 1);
    }
}

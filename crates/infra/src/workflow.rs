//! Visit workflow: drafts, numbering, completion.
//!
//! ```text
//! begin ──> Draft ──(edit lines/details, save)──> Draft
//!              │
//!              └──complete──> Completed (stock debited, terminal)
//! ```
//!
//! Edits run against an in-memory [`Visit`] and are validated by the
//! aggregate. Persisting happens in [`VisitWorkflow::save`] and
//! [`VisitWorkflow::complete`], each under the write gate and as one commit.
//! [`VisitWorkflow::edit`] and [`VisitWorkflow::complete_stored`] also hold
//! the gate while they load the stored copy.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use pitstop_core::{
    Aggregate, CustomerId, Decimal, DomainError, DomainEvent, EntityKind, PartId, Rejection,
    VehicleId, VisitNumber,
};
use pitstop_parties::{Customer, Vehicle};
use pitstop_visits::{PartSnapshot, Visit, VisitCommand, VisitDetails};

use crate::error::{ShopError, ShopResult};
use crate::ledger::InventoryLedger;
use crate::record_store::{ChangeSet, Collection, RecordStore, WriteGate, load};

const VISIT_COUNTER: &str = "visits";

/// Highest number ever issued for a sequence, kept in the `counters`
/// collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub id: String,
    pub value: u32,
}

/// Pick the next visit number and record it in `counters`.
///
/// The stored counter wins; when it is missing (or behind the data) the
/// highest existing visit number is used, so numbers are never reissued.
fn issue_visit_number(visits: &[Visit], counters: &mut Vec<Counter>) -> VisitNumber {
    let scanned = visits
        .iter()
        .filter_map(Visit::number)
        .map(VisitNumber::value)
        .max()
        .unwrap_or(0);
    let stored = counters
        .iter()
        .find(|c| c.id == VISIT_COUNTER)
        .map(|c| c.value)
        .unwrap_or(0);

    let next = match VisitNumber::new(stored.max(scanned)) {
        Ok(last) => last.next(),
        Err(_) => VisitNumber::first(),
    };
    record_counter(counters, next.value());
    next
}

/// Make sure the counter exists before a deletion can lower the scanned max.
fn seed_counter(visits: &[Visit], counters: &mut Vec<Counter>) -> bool {
    if counters.iter().any(|c| c.id == VISIT_COUNTER) {
        return false;
    }
    let scanned = visits
        .iter()
        .filter_map(Visit::number)
        .map(VisitNumber::value)
        .max()
        .unwrap_or(0);
    record_counter(counters, scanned);
    true
}

fn record_counter(counters: &mut Vec<Counter>, value: u32) {
    match counters.iter_mut().find(|c| c.id == VISIT_COUNTER) {
        Some(counter) => counter.value = value,
        None => counters.push(Counter {
            id: VISIT_COUNTER.to_string(),
            value,
        }),
    }
}

#[derive(Debug)]
pub struct VisitWorkflow<S> {
    store: S,
    gate: WriteGate,
    ledger: Arc<InventoryLedger<S>>,
    tax_rate: Decimal,
}

impl<S> VisitWorkflow<S> {
    pub fn new(store: S, gate: WriteGate, ledger: Arc<InventoryLedger<S>>, tax_rate: Decimal) -> Self {
        Self {
            store,
            gate,
            ledger,
            tax_rate,
        }
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

impl<S> VisitWorkflow<S>
where
    S: RecordStore,
{
    /// Start an unsaved draft for a picked customer and vehicle.
    pub fn begin(
        &self,
        customer_id: Option<CustomerId>,
        vehicle_id: Option<VehicleId>,
    ) -> ShopResult<Visit> {
        let visit = Visit::begin(customer_id, vehicle_id, self.tax_rate, Utc::now())?;

        let customers: Vec<Customer> = load(&self.store, Collection::Customers)?;
        if !customers.iter().any(|c| c.id == visit.customer_id()) {
            return Err(DomainError::not_found(EntityKind::Customer, visit.customer_id()).into());
        }
        let vehicles: Vec<Vehicle> = load(&self.store, Collection::Vehicles)?;
        if !vehicles.iter().any(|v| v.id == visit.vehicle_id()) {
            return Err(DomainError::not_found(EntityKind::Vehicle, visit.vehicle_id()).into());
        }
        Ok(visit)
    }

    pub fn add_service(&self, visit: &mut Visit, name: &str, cost: Decimal) -> ShopResult<()> {
        self.execute(
            visit,
            VisitCommand::AddService {
                name: name.to_string(),
                cost,
            },
        )
    }

    pub fn remove_service(&self, visit: &mut Visit, index: usize) -> ShopResult<()> {
        self.execute(visit, VisitCommand::RemoveService { index })
    }

    /// Add one unit of a part, checked against the ledger's cached stock.
    pub fn add_part(&self, visit: &mut Visit, part_id: PartId) -> ShopResult<()> {
        let part = self
            .ledger
            .part(part_id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::SparePart, part_id))?;
        self.execute(visit, VisitCommand::AddPart(PartSnapshot::of(&part)))
    }

    pub fn remove_part(&self, visit: &mut Visit, index: usize) -> ShopResult<()> {
        self.execute(visit, VisitCommand::RemovePart { index })
    }

    pub fn update_details(&self, visit: &mut Visit, details: VisitDetails) -> ShopResult<()> {
        self.execute(visit, VisitCommand::UpdateDetails(details))
    }

    fn execute(&self, visit: &mut Visit, command: VisitCommand) -> ShopResult<()> {
        let events = visit.execute(&command)?;
        for event in &events {
            tracing::debug!(visit = ?visit.number(), event = event.event_type(), "visit event applied");
        }
        Ok(())
    }

    /// Persist a visit without inventory effects, numbering it on first save.
    ///
    /// A stored visit is only overwritten by a copy loaded from its latest
    /// saved state; anything older is a consistency error.
    pub fn save(&self, visit: &mut Visit) -> ShopResult<VisitNumber> {
        let _guard = self.gate.acquire()?;
        self.save_locked(visit)
    }

    /// [`Self::save`] for callers already holding the gate.
    fn save_locked(&self, visit: &mut Visit) -> ShopResult<VisitNumber> {
        let now = Utc::now();
        let mut visits: Vec<Visit> = load(&self.store, Collection::Visits)?;

        let mut working = visit.clone();
        working.touch(now);

        let mut changes = ChangeSet::new();
        let number = match working.number() {
            None => {
                if working.is_completed() {
                    return Err(ShopError::consistency(
                        "an unsaved visit cannot be stored as completed without completing it",
                    ));
                }
                let mut counters: Vec<Counter> = load(&self.store, Collection::Counters)?;
                let number = issue_visit_number(&visits, &mut counters);
                working.assign_number(number)?;
                visits.push(working.clone());
                changes.stage(Collection::Counters, &counters)?;
                number
            }
            Some(number) => {
                let idx = position(&visits, number)?;
                match (visits[idx].is_completed(), working.is_completed()) {
                    (true, false) => {
                        return Err(ShopError::consistency(format!(
                            "visit {number} is completed in the store; saving a draft over it would undo its stock debit"
                        )));
                    }
                    (false, true) => {
                        return Err(ShopError::consistency(format!(
                            "visit {number} is a draft in the store; complete it instead of saving it as completed"
                        )));
                    }
                    _ => {}
                }
                ensure_current(&visits[idx], &working)?;
                visits[idx] = working.clone();
                number
            }
        };

        changes.stage(Collection::Visits, &visits)?;
        self.store.commit(changes)?;
        *visit = working;
        tracing::info!(visit = %number, status = %visit.status(), "visit saved");
        Ok(number)
    }

    /// Complete a visit and debit its parts from live stock in one commit.
    ///
    /// Nothing changes when any part is short or gone. A visit already
    /// completed in the store is refused, so stock is never debited twice,
    /// and so is a copy older than the stored draft.
    pub fn complete(&self, visit: &mut Visit) -> ShopResult<VisitNumber> {
        let _guard = self.gate.acquire()?;
        self.complete_locked(visit)
    }

    /// Complete the stored draft `number` as it is at the time of the call.
    pub fn complete_stored(&self, number: VisitNumber) -> ShopResult<Visit> {
        let _guard = self.gate.acquire()?;
        let mut visit = self.require(number)?;
        self.complete_locked(&mut visit)?;
        Ok(visit)
    }

    fn complete_locked(&self, visit: &mut Visit) -> ShopResult<VisitNumber> {
        let now = Utc::now();
        let mut visits: Vec<Visit> = load(&self.store, Collection::Visits)?;

        let stored_idx = match visit.number() {
            Some(number) => {
                let idx = position(&visits, number)?;
                if visits[idx].is_completed() {
                    return Err(ShopError::consistency(format!(
                        "visit {number} is already completed"
                    )));
                }
                ensure_current(&visits[idx], visit)?;
                Some(idx)
            }
            None => None,
        };

        let mut working = visit.clone();
        working.execute(&VisitCommand::Complete { at: now })?;

        let mut changes = ChangeSet::new();
        let parts = match self
            .ledger
            .stage_debits(&mut changes, &working.stock_demands(), now)
        {
            Ok(parts) => parts,
            Err(err) => {
                tracing::warn!(visit = ?visit.number(), error = %err, "visit completion rejected");
                return Err(err);
            }
        };

        let number = match stored_idx {
            Some(idx) => {
                visits[idx] = working.clone();
                visits[idx].number().ok_or_else(|| {
                    DomainError::invariant("stored visit lost its number")
                })?
            }
            None => {
                let mut counters: Vec<Counter> = load(&self.store, Collection::Counters)?;
                let number = issue_visit_number(&visits, &mut counters);
                working.assign_number(number)?;
                visits.push(working.clone());
                changes.stage(Collection::Counters, &counters)?;
                number
            }
        };

        changes.stage(Collection::Visits, &visits)?;
        self.store.commit(changes)?;
        self.ledger.parts_committed(parts);
        *visit = working;
        tracing::info!(visit = %number, final_total = %visit.final_total(), "visit completed");
        Ok(number)
    }

    /// Delete a draft. Completed visits cannot be deleted.
    pub fn delete(&self, number: VisitNumber) -> ShopResult<()> {
        let _guard = self.gate.acquire()?;
        let mut visits: Vec<Visit> = load(&self.store, Collection::Visits)?;
        let idx = position(&visits, number)?;
        if visits[idx].is_completed() {
            return Err(Rejection::VisitCompleted {
                visit: number.to_string(),
            }
            .into());
        }

        let mut changes = ChangeSet::new();
        let mut counters: Vec<Counter> = load(&self.store, Collection::Counters)?;
        if seed_counter(&visits, &mut counters) {
            changes.stage(Collection::Counters, &counters)?;
        }

        visits.remove(idx);
        changes.stage(Collection::Visits, &visits)?;
        self.store.commit(changes)?;
        tracing::info!(visit = %number, "draft visit deleted");
        Ok(())
    }

    pub fn visits(&self) -> ShopResult<Vec<Visit>> {
        Ok(load(&self.store, Collection::Visits)?)
    }

    pub fn visit(&self, number: VisitNumber) -> ShopResult<Option<Visit>> {
        Ok(self
            .visits()?
            .into_iter()
            .find(|v| v.number() == Some(number)))
    }

    /// Like [`Self::visit`], but a missing visit is an error.
    pub fn require(&self, number: VisitNumber) -> ShopResult<Visit> {
        self.visit(number)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Visit, number).into())
    }

    /// Load, edit and save a stored visit under one hold of the gate.
    ///
    /// `change` must not call other mutating operations; the gate is not
    /// reentrant.
    pub fn edit<F>(&self, number: VisitNumber, change: F) -> ShopResult<Visit>
    where
        F: FnOnce(&Self, &mut Visit) -> ShopResult<()>,
    {
        let _guard = self.gate.acquire()?;
        let mut visit = self.require(number)?;
        change(self, &mut visit)?;
        self.save_locked(&mut visit)?;
        Ok(visit)
    }
}

/// Refuse a copy loaded before the stored visit's latest save.
fn ensure_current(stored: &Visit, copy: &Visit) -> ShopResult<()> {
    if stored.updated_at() == copy.updated_at() {
        return Ok(());
    }
    Err(ShopError::consistency(format!(
        "visit {} changed since it was loaded; reload it and retry",
        stored
            .number()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "draft".to_string())
    )))
}

fn position(visits: &[Visit], number: VisitNumber) -> ShopResult<usize> {
    visits
        .iter()
        .position(|v| v.number() == Some(number))
        .ok_or_else(|| DomainError::not_found(EntityKind::Visit, number).into())
}

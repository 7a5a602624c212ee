//! Shop facade: one store, one write gate, every service wired to both.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use pitstop_core::{Decimal, VisitNumber};

use crate::config::ShopConfig;
use crate::directory::Directory;
use crate::error::ShopResult;
use crate::ledger::InventoryLedger;
use crate::projections::{
    ActiveVisit, InvoiceView, MaintenanceReminder, UpcomingQuery, UpcomingVisit, active_visits,
    invoice_view, maintenance_reminders, upcoming_visits,
};
use crate::record_store::{
    DynStore, InMemoryRecordStore, JsonFileRecordStore, RecordStore, StoreError, WriteGate,
};
use crate::workflow::VisitWorkflow;

/// Open the store selected by configuration.
///
/// A configured data path gets a JSON file store; otherwise the shop runs
/// on an in-memory store.
pub fn open_store(config: &ShopConfig) -> Result<DynStore, StoreError> {
    match &config.data_path {
        Some(path) => {
            let store = JsonFileRecordStore::open(path)?;
            tracing::info!(path = %store.path().display(), "using json file record store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("no data path configured; records are kept in memory only");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}

#[derive(Debug)]
pub struct Shop<S> {
    directory: Directory<S>,
    ledger: Arc<InventoryLedger<S>>,
    workflow: VisitWorkflow<S>,
}

impl<S> Shop<S>
where
    S: RecordStore + Clone,
{
    pub fn new(store: S, tax_rate: Decimal) -> Self {
        let gate = WriteGate::new();
        let ledger = Arc::new(InventoryLedger::new(store.clone(), gate.clone()));
        Self {
            directory: Directory::new(store.clone(), gate.clone()),
            workflow: VisitWorkflow::new(store, gate, Arc::clone(&ledger), tax_rate),
            ledger,
        }
    }

    pub fn directory(&self) -> &Directory<S> {
        &self.directory
    }

    pub fn ledger(&self) -> &InventoryLedger<S> {
        &self.ledger
    }

    pub fn workflow(&self) -> &VisitWorkflow<S> {
        &self.workflow
    }

    pub fn reminders(&self, now: DateTime<Utc>) -> ShopResult<Vec<MaintenanceReminder>> {
        let visits = self.workflow.visits()?;
        let vehicles = self.directory.vehicles(None)?;
        let customers = self.directory.customers()?;
        let reminders = maintenance_reminders(&visits, &vehicles, &customers, now);
        tracing::debug!(count = reminders.len(), "maintenance reminders derived");
        Ok(reminders)
    }

    pub fn upcoming(&self, today: NaiveDate, query: &UpcomingQuery) -> ShopResult<Vec<UpcomingVisit>> {
        let visits = self.workflow.visits()?;
        let customers = self.directory.customers()?;
        let vehicles = self.directory.vehicles(None)?;
        Ok(upcoming_visits(&visits, &customers, &vehicles, today, query))
    }

    pub fn invoice(&self, number: VisitNumber) -> ShopResult<InvoiceView> {
        let visit = self.workflow.require(number)?;
        let customers = self.directory.customers()?;
        let vehicles = self.directory.vehicles(None)?;
        Ok(invoice_view(&visit, &customers, &vehicles)?)
    }

    pub fn active_visits(&self) -> ShopResult<Vec<ActiveVisit>> {
        let visits = self.workflow.visits()?;
        let customers = self.directory.customers()?;
        let vehicles = self.directory.vehicles(None)?;
        Ok(active_visits(&visits, &customers, &vehicles))
    }
}

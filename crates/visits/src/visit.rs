use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pitstop_core::money::{ensure_not_negative, DEFAULT_TAX_RATE};
use pitstop_core::{
    Aggregate, AggregateRoot, CustomerId, Decimal, DomainError, DomainEvent, Rejection, VehicleId,
    VisitNumber,
};
use pitstop_inventory::StockDemand;

use crate::lines::{
    NextVisit, PartLine, PartSnapshot, PaymentMethod, ServiceLine, VisitDetails, VisitStatus,
};
use crate::totals::{VisitTotals, compute_totals};

fn default_tax_rate() -> Decimal {
    DEFAULT_TAX_RATE
}

/// Aggregate root: Visit.
///
/// Persisted as one record in the `visits` collection. The computed totals
/// are stored alongside the lines so readers (invoice, reports) never need to
/// recompute them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(rename = "id", default)]
    number: Option<VisitNumber>,
    customer_id: CustomerId,
    vehicle_id: VehicleId,
    #[serde(default)]
    status: VisitStatus,
    #[serde(default)]
    services: Vec<ServiceLine>,
    #[serde(default)]
    parts: Vec<PartLine>,
    #[serde(default)]
    discount: Decimal,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    technician: String,
    #[serde(default)]
    payment_method: PaymentMethod,
    #[serde(default)]
    mileage: Option<u64>,
    #[serde(default = "default_tax_rate")]
    tax_rate: Decimal,
    #[serde(default)]
    tax_enabled: bool,
    #[serde(default)]
    total_cost: Decimal,
    #[serde(default)]
    tax: Decimal,
    #[serde(default)]
    final_total: Decimal,
    #[serde(default)]
    next_visit: Option<NextVisit>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    version: u64,
}

impl Visit {
    /// Start a draft for a picked customer and vehicle.
    pub fn begin(
        customer_id: Option<CustomerId>,
        vehicle_id: Option<VehicleId>,
        tax_rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let customer_id =
            customer_id.ok_or(Rejection::SelectionIncomplete { missing: "customer" })?;
        let vehicle_id = vehicle_id.ok_or(Rejection::SelectionIncomplete { missing: "vehicle" })?;

        Ok(Self {
            number: None,
            customer_id,
            vehicle_id,
            status: VisitStatus::Draft,
            services: Vec::new(),
            parts: Vec::new(),
            discount: Decimal::ZERO,
            notes: String::new(),
            technician: String::new(),
            payment_method: PaymentMethod::Cash,
            mileage: None,
            tax_rate,
            tax_enabled: false,
            total_cost: Decimal::ZERO,
            tax: Decimal::ZERO,
            final_total: Decimal::ZERO,
            next_visit: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            version: 0,
        })
    }

    pub fn number(&self) -> Option<VisitNumber> {
        self.number
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn status(&self) -> VisitStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == VisitStatus::Completed
    }

    pub fn services(&self) -> &[ServiceLine] {
        &self.services
    }

    pub fn parts(&self) -> &[PartLine] {
        &self.parts
    }

    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    pub fn next_visit(&self) -> Option<&NextVisit> {
        self.next_visit.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// When the vehicle was last serviced by this visit.
    pub fn service_date(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.created_at)
    }

    pub fn details(&self) -> VisitDetails {
        VisitDetails {
            discount: self.discount,
            notes: self.notes.clone(),
            technician: self.technician.clone(),
            payment_method: self.payment_method,
            mileage: self.mileage,
            tax_enabled: self.tax_enabled,
            next_visit: self.next_visit.clone(),
        }
    }

    pub fn totals(&self) -> VisitTotals {
        compute_totals(
            &self.services,
            &self.parts,
            self.discount,
            self.tax_enabled,
            self.tax_rate,
        )
    }

    /// Stored `finalTotal`.
    pub fn final_total(&self) -> Decimal {
        self.final_total
    }

    /// Part quantities this visit takes out of stock when completed.
    pub fn stock_demands(&self) -> Vec<StockDemand> {
        self.parts
            .iter()
            .map(|line| StockDemand {
                part_id: line.part_id,
                quantity: line.qty,
            })
            .collect()
    }

    /// Give a never-saved visit its number.
    pub fn assign_number(&mut self, number: VisitNumber) -> Result<(), DomainError> {
        if let Some(existing) = self.number {
            return Err(DomainError::invariant(format!(
                "visit already numbered {existing}"
            )));
        }
        self.number = Some(number);
        Ok(())
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    fn label(&self) -> String {
        self.number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "(unsaved)".to_string())
    }

    fn recompute_totals(&mut self) {
        let totals = self.totals();
        self.total_cost = totals.subtotal;
        self.tax = totals.tax;
        self.final_total = totals.final_total;
    }
}

impl AggregateRoot for Visit {
    type Id = Option<VisitNumber>;

    fn id(&self) -> &Self::Id {
        &self.number
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitCommand {
    AddService { name: String, cost: Decimal },
    RemoveService { index: usize },
    AddPart(PartSnapshot),
    RemovePart { index: usize },
    UpdateDetails(VisitDetails),
    Complete { at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitEvent {
    ServiceAdded(ServiceLine),
    ServiceRemoved { index: usize },
    PartAdded(PartLine),
    PartQuantityIncremented { index: usize },
    PartRemoved { index: usize },
    DetailsUpdated(VisitDetails),
    VisitCompleted { at: DateTime<Utc> },
}

impl DomainEvent for VisitEvent {
    fn event_type(&self) -> &'static str {
        match self {
            VisitEvent::ServiceAdded(_) => "visit.service_added",
            VisitEvent::ServiceRemoved { .. } => "visit.service_removed",
            VisitEvent::PartAdded(_) => "visit.part_added",
            VisitEvent::PartQuantityIncremented { .. } => "visit.part_quantity_incremented",
            VisitEvent::PartRemoved { .. } => "visit.part_removed",
            VisitEvent::DetailsUpdated(_) => "visit.details_updated",
            VisitEvent::VisitCompleted { .. } => "visit.completed",
        }
    }
}

impl Aggregate for Visit {
    type Command = VisitCommand;
    type Event = VisitEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            VisitEvent::ServiceAdded(line) => self.services.push(line.clone()),
            VisitEvent::ServiceRemoved { index } => {
                if *index < self.services.len() {
                    self.services.remove(*index);
                }
            }
            VisitEvent::PartAdded(line) => self.parts.push(line.clone()),
            VisitEvent::PartQuantityIncremented { index } => {
                if let Some(line) = self.parts.get_mut(*index) {
                    line.qty += 1;
                }
            }
            VisitEvent::PartRemoved { index } => {
                if *index < self.parts.len() {
                    self.parts.remove(*index);
                }
            }
            VisitEvent::DetailsUpdated(d) => {
                self.discount = d.discount;
                self.notes = d.notes.clone();
                self.technician = d.technician.clone();
                self.payment_method = d.payment_method;
                self.mileage = d.mileage;
                self.tax_enabled = d.tax_enabled;
                self.next_visit = d.next_visit.clone();
            }
            VisitEvent::VisitCompleted { at } => {
                self.status = VisitStatus::Completed;
                self.completed_at = Some(*at);
                self.updated_at = *at;
            }
        }

        self.recompute_totals();
        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            VisitCommand::AddService { name, cost } => self.handle_add_service(name, *cost),
            VisitCommand::RemoveService { index } => {
                self.ensure_lines_editable()?;
                ensure_index("service", *index, self.services.len())?;
                Ok(vec![VisitEvent::ServiceRemoved { index: *index }])
            }
            VisitCommand::AddPart(snapshot) => self.handle_add_part(snapshot),
            VisitCommand::RemovePart { index } => {
                self.ensure_lines_editable()?;
                ensure_index("part", *index, self.parts.len())?;
                Ok(vec![VisitEvent::PartRemoved { index: *index }])
            }
            VisitCommand::UpdateDetails(details) => self.handle_update_details(details),
            VisitCommand::Complete { at } => {
                self.ensure_lines_editable()?;
                Ok(vec![VisitEvent::VisitCompleted { at: *at }])
            }
        }
    }
}

fn ensure_index(line: &'static str, index: usize, len: usize) -> Result<(), DomainError> {
    if index >= len {
        return Err(Rejection::LineOutOfRange { line, index, len }.into());
    }
    Ok(())
}

impl Visit {
    fn ensure_lines_editable(&self) -> Result<(), DomainError> {
        if self.is_completed() {
            return Err(Rejection::VisitCompleted {
                visit: self.label(),
            }
            .into());
        }
        Ok(())
    }

    fn handle_add_service(&self, name: &str, cost: Decimal) -> Result<Vec<VisitEvent>, DomainError> {
        self.ensure_lines_editable()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::missing("name"));
        }
        let cost = ensure_not_negative("cost", cost)?;
        Ok(vec![VisitEvent::ServiceAdded(ServiceLine {
            name: name.to_string(),
            cost,
        })])
    }

    fn handle_add_part(&self, snapshot: &PartSnapshot) -> Result<Vec<VisitEvent>, DomainError> {
        self.ensure_lines_editable()?;
        if snapshot.stock <= 0 {
            return Err(Rejection::OutOfStock {
                part_id: snapshot.part_id.to_string(),
                name: snapshot.name.clone(),
            }
            .into());
        }

        if let Some(index) = self.parts.iter().position(|l| l.part_id == snapshot.part_id) {
            if self.parts[index].qty + 1 > snapshot.stock {
                return Err(Rejection::StockLimit {
                    part_id: snapshot.part_id.to_string(),
                    name: snapshot.name.clone(),
                    available: snapshot.stock,
                }
                .into());
            }
            return Ok(vec![VisitEvent::PartQuantityIncremented { index }]);
        }

        Ok(vec![VisitEvent::PartAdded(PartLine {
            part_id: snapshot.part_id,
            name: snapshot.name.clone(),
            price: snapshot.price,
            qty: 1,
        })])
    }

    fn handle_update_details(&self, details: &VisitDetails) -> Result<Vec<VisitEvent>, DomainError> {
        ensure_not_negative("discount", details.discount)?;
        if self.is_completed()
            && (details.discount != self.discount || details.tax_enabled != self.tax_enabled)
        {
            return Err(Rejection::VisitCompleted {
                visit: self.label(),
            }
            .into());
        }
        Ok(vec![VisitEvent::DetailsUpdated(details.clone())])
    }
}

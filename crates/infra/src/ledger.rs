//! Inventory ledger: the single owner of part stock and vendor credit.
//!
//! Every stock change (edit, restock, audit, visit completion) funnels through
//! one delta function, and every credit change through one credit delta, so
//! each is logged at a single point. Operations that touch more than one
//! collection stage all writes into one [`ChangeSet`].

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use pitstop_core::{Decimal, DomainError, EntityKind, PartId, VendorId};
use pitstop_inventory::{
    PartForm, SparePart, StockAdjustment, StockDemand, StockReason, Vendor, VendorForm,
    VendorPayment, audit_adjustments, check_availability, ensure_unique_part_number,
};

use crate::error::ShopResult;
use crate::record_store::{ChangeSet, Collection, RecordStore, WriteGate, load};

/// Last committed parts collection, shared with readers.
///
/// Filled on first read and replaced after every successful parts commit.
#[derive(Debug, Default)]
pub struct PartsCache {
    parts: RwLock<Option<Arc<Vec<SparePart>>>>,
}

impl PartsCache {
    pub fn get(&self) -> Option<Arc<Vec<SparePart>>> {
        self.parts.read().ok().and_then(|guard| guard.clone())
    }

    pub fn replace(&self, parts: Vec<SparePart>) -> Arc<Vec<SparePart>> {
        let parts = Arc::new(parts);
        if let Ok(mut guard) = self.parts.write() {
            *guard = Some(parts.clone());
        }
        parts
    }
}

/// Apply a stock delta to one part in a loaded collection.
///
/// Returns `None` when the part is not in the collection.
pub(crate) fn apply_stock_delta(
    parts: &mut [SparePart],
    part_id: PartId,
    delta: i64,
    reason: StockReason,
    now: DateTime<Utc>,
) -> Option<StockAdjustment> {
    let part = parts.iter_mut().find(|p| p.id == part_id)?;
    let new_stock = part.apply_stock_delta(delta, now);
    tracing::info!(part_id = %part_id, delta, new_stock, reason = %reason, "stock adjusted");
    Some(StockAdjustment {
        part_id,
        delta,
        new_stock,
        reason,
    })
}

/// Apply a credit delta to one vendor in a loaded collection.
fn apply_credit_delta(
    vendors: &mut [Vendor],
    vendor_id: VendorId,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Option<Decimal> {
    let vendor = vendors.iter_mut().find(|v| v.id == vendor_id)?;
    let credit = vendor.adjust_credit(amount, now);
    tracing::info!(vendor_id = %vendor_id, amount = %amount, credit = %credit, "vendor credit adjusted");
    Some(credit)
}

#[derive(Debug)]
pub struct InventoryLedger<S> {
    store: S,
    gate: WriteGate,
    cache: PartsCache,
}

impl<S> InventoryLedger<S> {
    pub fn new(store: S, gate: WriteGate) -> Self {
        Self {
            store,
            gate,
            cache: PartsCache::default(),
        }
    }
}

impl<S> InventoryLedger<S>
where
    S: RecordStore,
{
    /// All parts, served from the cache when warm.
    pub fn parts(&self) -> ShopResult<Arc<Vec<SparePart>>> {
        if let Some(parts) = self.cache.get() {
            return Ok(parts);
        }
        let parts = load::<SparePart, _>(&self.store, Collection::SpareParts)?;
        tracing::debug!(count = parts.len(), "parts cache filled");
        Ok(self.cache.replace(parts))
    }

    /// One part from the cached snapshot.
    pub fn part(&self, part_id: PartId) -> ShopResult<Option<SparePart>> {
        Ok(self.parts()?.iter().find(|p| p.id == part_id).cloned())
    }

    /// Parts whose name or part number contains `term` (case-insensitive).
    pub fn search_parts(&self, term: &str, limit: usize) -> ShopResult<Vec<SparePart>> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .parts()?
            .iter()
            .filter(|p| needle.is_empty() || p.matches(&needle))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Insert or update a part.
    ///
    /// A new part arriving with stock from a vendor adds `cost * stock` to
    /// that vendor's credit in the same commit. For an existing part a changed
    /// stock figure is applied as an edit delta.
    pub fn save_part(&self, form: &PartForm) -> ShopResult<SparePart> {
        let draft = form.validate()?;
        let now = Utc::now();

        let _guard = self.gate.acquire()?;
        let mut parts = self.live_parts()?;
        ensure_unique_part_number(&parts, &draft)?;

        let mut changes = ChangeSet::new();
        let saved = match draft
            .id
            .and_then(|id| parts.iter().position(|p| p.id == id))
        {
            Some(idx) => {
                let part_id = parts[idx].id;
                let delta = parts[idx].apply_details(&draft, now);
                if delta != 0 {
                    apply_stock_delta(&mut parts, part_id, delta, StockReason::Edit, now);
                }
                parts[idx].clone()
            }
            None => {
                let part = SparePart::create(&draft, now);
                if let Some((vendor_id, amount)) = part.restock_credit() {
                    let mut vendors = load::<Vendor, _>(&self.store, Collection::Vendors)?;
                    apply_credit_delta(&mut vendors, vendor_id, amount, now)
                        .ok_or_else(|| DomainError::not_found(EntityKind::Vendor, vendor_id))?;
                    changes.stage(Collection::Vendors, &vendors)?;
                }
                parts.push(part.clone());
                part
            }
        };

        changes.stage(Collection::SpareParts, &parts)?;
        self.store.commit(changes)?;
        self.cache.replace(parts);
        tracing::info!(part_id = %saved.id, part_number = %saved.part_number, "part saved");
        Ok(saved)
    }

    /// Remove a part. Visits keep their snapshotted lines.
    pub fn delete_part(&self, part_id: PartId) -> ShopResult<bool> {
        let _guard = self.gate.acquire()?;
        let mut parts = self.live_parts()?;
        let before = parts.len();
        parts.retain(|p| p.id != part_id);
        if parts.len() == before {
            return Ok(false);
        }
        self.commit_parts(parts)?;
        tracing::info!(part_id = %part_id, "part deleted");
        Ok(true)
    }

    /// Add `delta` to a part's stock. `Ok(None)` when the part does not exist.
    ///
    /// No floor is enforced here; callers that must not oversell check first.
    pub fn adjust_stock(
        &self,
        part_id: PartId,
        delta: i64,
        reason: StockReason,
    ) -> ShopResult<Option<i64>> {
        let _guard = self.gate.acquire()?;
        let mut parts = self.live_parts()?;
        let Some(adjustment) = apply_stock_delta(&mut parts, part_id, delta, reason, Utc::now())
        else {
            tracing::debug!(part_id = %part_id, "stock adjustment skipped: unknown part");
            return Ok(None);
        };
        self.commit_parts(parts)?;
        Ok(Some(adjustment.new_stock))
    }

    /// Bring counted parts to their physical count in one commit.
    pub fn audit_stock(&self, counts: &[(PartId, i64)]) -> ShopResult<Vec<StockAdjustment>> {
        let _guard = self.gate.acquire()?;
        let mut parts = self.live_parts()?;
        let planned = audit_adjustments(&parts, counts);
        if planned.is_empty() {
            return Ok(planned);
        }

        let now = Utc::now();
        let applied: Vec<StockAdjustment> = planned
            .iter()
            .filter_map(|a| apply_stock_delta(&mut parts, a.part_id, a.delta, StockReason::Audit, now))
            .collect();
        self.commit_parts(parts)?;
        Ok(applied)
    }

    pub fn vendors(&self) -> ShopResult<Vec<Vendor>> {
        Ok(load(&self.store, Collection::Vendors)?)
    }

    pub fn vendor(&self, vendor_id: VendorId) -> ShopResult<Option<Vendor>> {
        Ok(self.vendors()?.into_iter().find(|v| v.id == vendor_id))
    }

    /// Insert or update a vendor. Credit is never taken from the form.
    pub fn save_vendor(&self, form: &VendorForm) -> ShopResult<Vendor> {
        form.validate()?;
        let now = Utc::now();

        let _guard = self.gate.acquire()?;
        let mut vendors = self.vendors()?;
        let saved = match form
            .id
            .and_then(|id| vendors.iter().position(|v| v.id == id))
        {
            Some(idx) => {
                vendors[idx].merge(form, now)?;
                vendors[idx].clone()
            }
            None => {
                let vendor = Vendor::create(form, now)?;
                vendors.push(vendor.clone());
                vendor
            }
        };

        let mut changes = ChangeSet::new();
        changes.stage(Collection::Vendors, &vendors)?;
        self.store.commit(changes)?;
        tracing::info!(vendor_id = %saved.id, "vendor saved");
        Ok(saved)
    }

    /// Remove a vendor. Parts referencing it keep a dangling `vendorId`.
    pub fn delete_vendor(&self, vendor_id: VendorId) -> ShopResult<bool> {
        let _guard = self.gate.acquire()?;
        let mut vendors = self.vendors()?;
        let before = vendors.len();
        vendors.retain(|v| v.id != vendor_id);
        if vendors.len() == before {
            return Ok(false);
        }
        let mut changes = ChangeSet::new();
        changes.stage(Collection::Vendors, &vendors)?;
        self.store.commit(changes)?;
        tracing::info!(vendor_id = %vendor_id, "vendor deleted");
        Ok(true)
    }

    /// Add `amount` to a vendor's credit. `Ok(None)` when the vendor is unknown.
    pub fn adjust_vendor_credit(
        &self,
        vendor_id: VendorId,
        amount: Decimal,
    ) -> ShopResult<Option<Decimal>> {
        let _guard = self.gate.acquire()?;
        let mut vendors = self.vendors()?;
        let Some(credit) = apply_credit_delta(&mut vendors, vendor_id, amount, Utc::now()) else {
            return Ok(None);
        };
        let mut changes = ChangeSet::new();
        changes.stage(Collection::Vendors, &vendors)?;
        self.store.commit(changes)?;
        Ok(Some(credit))
    }

    /// Record a payment to a vendor and reduce its credit by the same amount,
    /// both in one commit.
    pub fn record_vendor_payment(
        &self,
        vendor_id: VendorId,
        amount: Decimal,
        notes: Option<&str>,
    ) -> ShopResult<VendorPayment> {
        let now = Utc::now();
        let payment = VendorPayment::new(vendor_id, amount, notes, now)?;

        let _guard = self.gate.acquire()?;
        let mut vendors = self.vendors()?;
        apply_credit_delta(&mut vendors, vendor_id, -payment.amount, now)
            .ok_or_else(|| DomainError::not_found(EntityKind::Vendor, vendor_id))?;

        let mut payments = load::<VendorPayment, _>(&self.store, Collection::VendorPayments)?;
        payments.push(payment.clone());

        let mut changes = ChangeSet::new();
        changes
            .stage(Collection::Vendors, &vendors)?
            .stage(Collection::VendorPayments, &payments)?;
        self.store.commit(changes)?;
        tracing::info!(payment_id = %payment.id, vendor_id = %vendor_id, amount = %payment.amount, "vendor payment recorded");
        Ok(payment)
    }

    /// Payments in recorded order, optionally for one vendor.
    pub fn vendor_payments(&self, vendor_id: Option<VendorId>) -> ShopResult<Vec<VendorPayment>> {
        let payments = load::<VendorPayment, _>(&self.store, Collection::VendorPayments)?;
        Ok(match vendor_id {
            Some(id) => payments.into_iter().filter(|p| p.vendor_id == id).collect(),
            None => payments,
        })
    }

    /// Check live stock for `demands` and stage the debits into `changes`.
    ///
    /// The caller must hold the write gate, commit `changes`, and then hand
    /// the returned parts to [`Self::parts_committed`]. Nothing is staged when
    /// the check fails.
    pub(crate) fn stage_debits(
        &self,
        changes: &mut ChangeSet,
        demands: &[StockDemand],
        now: DateTime<Utc>,
    ) -> ShopResult<Vec<SparePart>> {
        let mut parts = self.live_parts()?;
        let summed = check_availability(&parts, demands)?;
        for demand in &summed {
            apply_stock_delta(
                &mut parts,
                demand.part_id,
                -demand.quantity,
                StockReason::VisitCompletion,
                now,
            );
        }
        changes.stage(Collection::SpareParts, &parts)?;
        Ok(parts)
    }

    /// Refresh the cache after a commit that included the parts collection.
    pub(crate) fn parts_committed(&self, parts: Vec<SparePart>) {
        self.cache.replace(parts);
    }

    /// Fresh read of the parts collection, bypassing the cache.
    fn live_parts(&self) -> ShopResult<Vec<SparePart>> {
        Ok(load(&self.store, Collection::SpareParts)?)
    }

    fn commit_parts(&self, parts: Vec<SparePart>) -> ShopResult<()> {
        let mut changes = ChangeSet::new();
        changes.stage(Collection::SpareParts, &parts)?;
        self.store.commit(changes)?;
        self.cache.replace(parts);
        Ok(())
    }
}

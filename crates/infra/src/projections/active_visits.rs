use chrono::{DateTime, Utc};
use serde::Serialize;

use pitstop_core::{CustomerId, Decimal, Ref, VehicleId, VisitNumber};
use pitstop_parties::{Customer, Vehicle};
use pitstop_visits::Visit;

/// Draft visit as listed on the work board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveVisit {
    pub number: Option<VisitNumber>,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub vehicle_id: VehicleId,
    pub vehicle: String,
    pub created_at: DateTime<Utc>,
    pub final_total: Decimal,
}

/// Visits not yet completed, newest first.
pub fn active_visits(
    visits: &[Visit],
    customers: &[Customer],
    vehicles: &[Vehicle],
) -> Vec<ActiveVisit> {
    let mut active: Vec<ActiveVisit> = visits
        .iter()
        .filter(|v| !v.is_completed())
        .map(|v| ActiveVisit {
            number: v.number(),
            customer_id: v.customer_id(),
            customer_name: Ref::resolve(v.customer_id(), customers).label(),
            vehicle_id: v.vehicle_id(),
            vehicle: Ref::resolve(v.vehicle_id(), vehicles).label(),
            created_at: v.created_at(),
            final_total: v.final_total(),
        })
        .collect();
    active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pitstop_core::Aggregate;
    use pitstop_core::money::DEFAULT_TAX_RATE;
    use pitstop_visits::VisitCommand;

    fn draft(at: DateTime<Utc>) -> Visit {
        Visit::begin(
            Some(CustomerId::new()),
            Some(VehicleId::new()),
            DEFAULT_TAX_RATE,
            at,
        )
        .unwrap()
    }

    #[test]
    fn lists_drafts_newest_first() {
        let now = Utc::now();
        let older = draft(now - Duration::hours(2));
        let newer = draft(now);
        let mut done = draft(now - Duration::hours(1));
        done.execute(&VisitCommand::Complete { at: now }).unwrap();

        let list = active_visits(&[older.clone(), done, newer.clone()], &[], &[]);
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].created_at, newer.created_at());
        assert_eq!(list[1].created_at, older.created_at());
    }
}

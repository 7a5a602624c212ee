use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use pitstop_core::{CustomerId, Labelled, Ref, VehicleId};
use pitstop_parties::{Customer, Vehicle};
use pitstop_visits::Visit;

use super::mobile_of;

/// A vehicle is due once its last completed service is more than this many
/// whole days old.
pub const REMINDER_THRESHOLD_DAYS: i64 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReminder {
    pub vehicle_id: VehicleId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub mobile: String,
    pub vehicle: String,
    pub last_service_date: NaiveDate,
    pub days_since: i64,
    pub message: String,
}

/// Vehicles overdue for service, in vehicle collection order.
///
/// Only completed visits count. A vehicle's last service is its latest
/// completion time (creation time for records without one).
pub fn maintenance_reminders(
    visits: &[Visit],
    vehicles: &[Vehicle],
    customers: &[Customer],
    now: DateTime<Utc>,
) -> Vec<MaintenanceReminder> {
    let mut last_service: HashMap<VehicleId, DateTime<Utc>> = HashMap::new();
    for visit in visits.iter().filter(|v| v.is_completed()) {
        let date = visit.service_date();
        last_service
            .entry(visit.vehicle_id())
            .and_modify(|d| *d = (*d).max(date))
            .or_insert(date);
    }

    vehicles
        .iter()
        .filter_map(|vehicle| {
            let last = *last_service.get(&vehicle.id)?;
            let days_since = (now - last).num_days();
            if days_since <= REMINDER_THRESHOLD_DAYS {
                return None;
            }
            let customer = Ref::resolve(vehicle.customer_id, customers);
            Some(MaintenanceReminder {
                vehicle_id: vehicle.id,
                customer_id: vehicle.customer_id,
                customer_name: customer.label(),
                mobile: mobile_of(&customer),
                vehicle: vehicle.label(),
                last_service_date: last.date_naive(),
                days_since,
                message: format!("{days_since} days since last service"),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pitstop_core::money::DEFAULT_TAX_RATE;
    use pitstop_core::Aggregate;
    use pitstop_parties::{CustomerForm, VehicleForm};
    use pitstop_visits::VisitCommand;

    fn customer() -> Customer {
        Customer::create(
            &CustomerForm {
                name: "Sam".to_string(),
                mobile: Some("0550".to_string()),
                ..CustomerForm::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn vehicle(owner: CustomerId, plate: &str) -> Vehicle {
        Vehicle::create(
            &VehicleForm {
                customer_id: Some(owner),
                brand: "Toyota".to_string(),
                model: "Yaris".to_string(),
                plate_number: plate.to_string(),
                ..VehicleForm::default()
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn completed(vehicle: &Vehicle, at: DateTime<Utc>) -> Visit {
        let mut visit = Visit::begin(
            Some(vehicle.customer_id),
            Some(vehicle.id),
            DEFAULT_TAX_RATE,
            at,
        )
        .unwrap();
        visit.execute(&VisitCommand::Complete { at }).unwrap();
        visit
    }

    #[test]
    fn ninety_days_is_not_yet_due_but_ninety_one_is() {
        let now = Utc::now();
        let c = customer();
        let v = vehicle(c.id, "A-1");

        let at_90 = [completed(&v, now - Duration::days(90))];
        assert!(maintenance_reminders(&at_90, &[v.clone()], &[c.clone()], now).is_empty());

        let at_91 = [completed(&v, now - Duration::days(91))];
        let reminders = maintenance_reminders(&at_91, &[v.clone()], &[c.clone()], now);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].days_since, 91);
        assert_eq!(reminders[0].customer_name, "Sam");
        assert_eq!(reminders[0].mobile, "0550");
        assert_eq!(reminders[0].vehicle, "Toyota Yaris (A-1)");
        assert_eq!(reminders[0].message, "91 days since last service");
    }

    #[test]
    fn latest_completed_visit_wins_and_drafts_are_ignored() {
        let now = Utc::now();
        let c = customer();
        let v = vehicle(c.id, "A-1");
        let draft = Visit::begin(Some(c.id), Some(v.id), DEFAULT_TAX_RATE, now).unwrap();
        let visits = [
            completed(&v, now - Duration::days(200)),
            completed(&v, now - Duration::days(10)),
            draft,
        ];
        assert!(maintenance_reminders(&visits, &[v], &[c], now).is_empty());
    }

    #[test]
    fn dangling_customer_and_vehicle_order() {
        let now = Utc::now();
        let gone = CustomerId::new();
        let first = vehicle(gone, "B-2");
        let second = vehicle(gone, "A-1");
        let visits = [
            completed(&second, now - Duration::days(120)),
            completed(&first, now - Duration::days(100)),
        ];
        let reminders = maintenance_reminders(&visits, &[first.clone(), second.clone()], &[], now);
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].vehicle_id, first.id);
        assert_eq!(reminders[1].vehicle_id, second.id);
        assert_eq!(reminders[0].customer_name, "Unknown");
        assert_eq!(reminders[0].mobile, "");
    }
}

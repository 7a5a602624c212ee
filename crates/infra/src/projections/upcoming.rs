use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pitstop_core::{CustomerId, DomainError, Ref, VehicleId, VisitNumber};
use pitstop_parties::{Customer, Vehicle};
use pitstop_visits::Visit;

use super::mobile_of;

/// Relative-date filter for scheduled follow-ups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpcomingWindow {
    #[default]
    All,
    Overdue,
    Today,
    Tomorrow,
    /// Today through seven days ahead.
    Week,
}

impl UpcomingWindow {
    fn admits(self, days_until: i64) -> bool {
        match self {
            UpcomingWindow::All => true,
            UpcomingWindow::Overdue => days_until < 0,
            UpcomingWindow::Today => days_until == 0,
            UpcomingWindow::Tomorrow => days_until == 1,
            UpcomingWindow::Week => (0..=7).contains(&days_until),
        }
    }
}

impl FromStr for UpcomingWindow {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(UpcomingWindow::All),
            "overdue" => Ok(UpcomingWindow::Overdue),
            "today" => Ok(UpcomingWindow::Today),
            "tomorrow" => Ok(UpcomingWindow::Tomorrow),
            "week" => Ok(UpcomingWindow::Week),
            other => Err(DomainError::invariant(format!(
                "unknown upcoming window {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Urgency {
    Overdue { days: i64 },
    Today,
    Tomorrow,
    ThisWeek,
    Later,
}

impl Urgency {
    pub fn classify(days_until: i64) -> Self {
        match days_until {
            d if d < 0 => Urgency::Overdue { days: -d },
            0 => Urgency::Today,
            1 => Urgency::Tomorrow,
            2..=7 => Urgency::ThisWeek,
            _ => Urgency::Later,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpcomingQuery {
    /// Inclusive lower bound on the scheduled date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the scheduled date.
    pub to: Option<NaiveDate>,
    pub window: UpcomingWindow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingVisit {
    pub visit: Option<VisitNumber>,
    pub date: NaiveDate,
    pub service: String,
    pub notes: String,
    pub days_until: i64,
    pub urgency: Urgency,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub mobile: String,
    pub vehicle_id: VehicleId,
    pub vehicle: String,
}

/// Scheduled follow-ups matching `query`, soonest first.
pub fn upcoming_visits(
    visits: &[Visit],
    customers: &[Customer],
    vehicles: &[Vehicle],
    today: NaiveDate,
    query: &UpcomingQuery,
) -> Vec<UpcomingVisit> {
    let mut upcoming: Vec<UpcomingVisit> = visits
        .iter()
        .filter_map(|visit| {
            let next = visit.next_visit()?;
            if query.from.is_some_and(|from| next.date < from)
                || query.to.is_some_and(|to| next.date > to)
            {
                return None;
            }
            let days_until = (next.date - today).num_days();
            if !query.window.admits(days_until) {
                return None;
            }

            let customer = Ref::resolve(visit.customer_id(), customers);
            let vehicle = Ref::resolve(visit.vehicle_id(), vehicles);
            Some(UpcomingVisit {
                visit: visit.number(),
                date: next.date,
                service: next.service.clone(),
                notes: next.notes.clone(),
                days_until,
                urgency: Urgency::classify(days_until),
                customer_id: visit.customer_id(),
                customer_name: customer.label(),
                mobile: mobile_of(&customer),
                vehicle_id: visit.vehicle_id(),
                vehicle: vehicle.label(),
            })
        })
        .collect();

    upcoming.sort_by_key(|u| u.date);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pitstop_core::money::DEFAULT_TAX_RATE;
    use pitstop_core::Aggregate;
    use pitstop_visits::{NextVisit, VisitCommand};

    fn scheduled(date: NaiveDate) -> Visit {
        let mut visit = Visit::begin(
            Some(CustomerId::new()),
            Some(VehicleId::new()),
            DEFAULT_TAX_RATE,
            Utc::now(),
        )
        .unwrap();
        let details = pitstop_visits::VisitDetails {
            next_visit: Some(NextVisit {
                date,
                service: "Oil change".to_string(),
                notes: String::new(),
            }),
            ..visit.details()
        };
        visit
            .execute(&VisitCommand::UpdateDetails(details))
            .unwrap();
        visit
    }

    fn day(offset: i64, today: NaiveDate) -> NaiveDate {
        today + chrono::Duration::days(offset)
    }

    #[test]
    fn urgency_buckets() {
        assert_eq!(Urgency::classify(-3), Urgency::Overdue { days: 3 });
        assert_eq!(Urgency::classify(0), Urgency::Today);
        assert_eq!(Urgency::classify(1), Urgency::Tomorrow);
        assert_eq!(Urgency::classify(7), Urgency::ThisWeek);
        assert_eq!(Urgency::classify(8), Urgency::Later);
    }

    #[test]
    fn sorted_by_date_with_placeholders_for_dangling_refs() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let visits = [
            scheduled(day(5, today)),
            scheduled(day(-2, today)),
            scheduled(day(0, today)),
        ];
        let list = upcoming_visits(&visits, &[], &[], today, &UpcomingQuery::default());
        let offsets: Vec<i64> = list.iter().map(|u| u.days_until).collect();
        assert_eq!(offsets, vec![-2, 0, 5]);
        assert_eq!(list[0].urgency, Urgency::Overdue { days: 2 });
        assert_eq!(list[0].customer_name, "Unknown");
        assert_eq!(list[0].vehicle, "? (?)");
    }

    #[test]
    fn window_and_range_filters() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let visits = [
            scheduled(day(-1, today)),
            scheduled(day(0, today)),
            scheduled(day(1, today)),
            scheduled(day(7, today)),
            scheduled(day(8, today)),
        ];

        let query = |window| UpcomingQuery {
            window,
            ..UpcomingQuery::default()
        };
        let count = |q: &UpcomingQuery| upcoming_visits(&visits, &[], &[], today, q).len();

        assert_eq!(count(&query(UpcomingWindow::All)), 5);
        assert_eq!(count(&query(UpcomingWindow::Overdue)), 1);
        assert_eq!(count(&query(UpcomingWindow::Today)), 1);
        assert_eq!(count(&query(UpcomingWindow::Tomorrow)), 1);
        assert_eq!(count(&query(UpcomingWindow::Week)), 3);

        let ranged = UpcomingQuery {
            from: Some(today),
            to: Some(day(7, today)),
            window: UpcomingWindow::All,
        };
        assert_eq!(count(&ranged), 3);
    }

    #[test]
    fn window_parses_from_query_text() {
        assert_eq!("week".parse::<UpcomingWindow>().unwrap(), UpcomingWindow::Week);
        assert_eq!("".parse::<UpcomingWindow>().unwrap(), UpcomingWindow::All);
        assert!("someday".parse::<UpcomingWindow>().is_err());
    }
}

//! Stock rules shared by the ledger and the visit workflow.

use serde::{Deserialize, Serialize};

use pitstop_core::{DomainError, DomainResult, EntityKind, PartId, Rejection};

use crate::part::SparePart;

/// Why a part's stock changed. Logged with every adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockReason {
    Manual,
    Restock,
    Audit,
    Edit,
    VisitCompletion,
}

impl StockReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StockReason::Manual => "manual",
            StockReason::Restock => "restock",
            StockReason::Audit => "audit",
            StockReason::Edit => "edit",
            StockReason::VisitCompletion => "visit_completion",
        }
    }
}

impl core::fmt::Display for StockReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantity of one part a caller wants to take out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDemand {
    pub part_id: PartId,
    pub quantity: i64,
}

/// A stock change that was (or is about to be) applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub part_id: PartId,
    pub delta: i64,
    pub new_stock: i64,
    pub reason: StockReason,
}

/// Sum demands per part (first-seen order) and check each total against the
/// given stock levels.
///
/// A part missing from `parts` is reported as not found; a part with too
/// little stock as [`Rejection::InsufficientStock`]. Returns the summed
/// demands on success.
pub fn check_availability(
    parts: &[SparePart],
    demands: &[StockDemand],
) -> DomainResult<Vec<StockDemand>> {
    let mut summed: Vec<StockDemand> = Vec::new();
    for demand in demands {
        match summed.iter_mut().find(|d| d.part_id == demand.part_id) {
            Some(existing) => existing.quantity += demand.quantity,
            None => summed.push(*demand),
        }
    }

    for demand in &summed {
        let part = parts
            .iter()
            .find(|p| p.id == demand.part_id)
            .ok_or_else(|| DomainError::not_found(EntityKind::SparePart, demand.part_id))?;
        if part.stock() < demand.quantity {
            return Err(Rejection::InsufficientStock {
                part_id: part.id.to_string(),
                name: part.name.clone(),
                requested: demand.quantity,
                available: part.stock(),
            }
            .into());
        }
    }

    Ok(summed)
}

/// Deltas that bring counted parts to their physically counted quantity.
///
/// Unknown part ids and parts whose count already matches are skipped.
pub fn audit_adjustments(parts: &[SparePart], counts: &[(PartId, i64)]) -> Vec<StockAdjustment> {
    counts
        .iter()
        .filter_map(|(part_id, actual)| {
            let part = parts.iter().find(|p| p.id == *part_id)?;
            let delta = actual - part.stock();
            (delta != 0).then_some(StockAdjustment {
                part_id: *part_id,
                delta,
                new_stock: *actual,
                reason: StockReason::Audit,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::PartForm;
    use chrono::Utc;
    use proptest::prelude::*;

    fn part(name: &str, stock: i64) -> SparePart {
        let draft = PartForm {
            part_number: format!("PN-{name}"),
            name: name.to_string(),
            price: "10".to_string(),
            stock: stock.to_string(),
            ..PartForm::default()
        }
        .validate()
        .unwrap();
        SparePart::create(&draft, Utc::now())
    }

    #[test]
    fn quantities_are_summed_per_part_before_checking() {
        let filter = part("filter", 3);
        let demands = vec![
            StockDemand {
                part_id: filter.id,
                quantity: 2,
            },
            StockDemand {
                part_id: filter.id,
                quantity: 2,
            },
        ];
        let err = check_availability(&[filter.clone()], &demands).unwrap_err();
        assert_eq!(
            err.rejection(),
            Some(&Rejection::InsufficientStock {
                part_id: filter.id.to_string(),
                name: "filter".to_string(),
                requested: 4,
                available: 3,
            })
        );
    }

    #[test]
    fn missing_part_is_not_found() {
        let demands = vec![StockDemand {
            part_id: PartId::new(),
            quantity: 1,
        }];
        match check_availability(&[], &demands).unwrap_err() {
            DomainError::NotFound { kind, .. } => assert_eq!(kind, EntityKind::SparePart),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn audit_skips_unknown_and_unchanged_parts() {
        let a = part("a", 5);
        let b = part("b", 2);
        let adjustments = audit_adjustments(
            &[a.clone(), b.clone()],
            &[(a.id, 3), (b.id, 2), (PartId::new(), 9)],
        );
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].part_id, a.id);
        assert_eq!(adjustments[0].delta, -2);
        assert_eq!(adjustments[0].new_stock, 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: availability holds exactly when every part's summed
        /// demand fits its stock.
        #[test]
        fn availability_matches_summed_demand(
            stocks in prop::collection::vec(0i64..20, 1..5),
            picks in prop::collection::vec((0usize..5, 1i64..8), 0..10)
        ) {
            let parts: Vec<SparePart> = stocks
                .iter()
                .enumerate()
                .map(|(i, s)| part(&format!("p{i}"), *s))
                .collect();
            let demands: Vec<StockDemand> = picks
                .iter()
                .map(|(i, q)| StockDemand { part_id: parts[i % parts.len()].id, quantity: *q })
                .collect();

            let fits = parts.iter().all(|p| {
                let wanted: i64 = demands.iter().filter(|d| d.part_id == p.id).map(|d| d.quantity).sum();
                wanted <= p.stock()
            });

            prop_assert_eq!(check_availability(&parts, &demands).is_ok(), fits);
        }
    }
}

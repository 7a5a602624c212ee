//! Domain error model.

use serde::Serialize;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Kind of record a reference points at (used in not-found reporting).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Customer,
    Vehicle,
    SparePart,
    Vendor,
    Visit,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Vehicle => "vehicle",
            EntityKind::SparePart => "spare part",
            EntityKind::Vendor => "vendor",
            EntityKind::Visit => "visit",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a user-initiated operation was refused.
///
/// Rejections are local and recoverable: the operation aborts, state is left
/// unchanged and the caller gets a reason it can show to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} must be a number (got {value:?})")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} cannot be negative")]
    NegativeAmount { field: &'static str },

    #[error("{field} must be greater than zero")]
    NonPositiveAmount { field: &'static str },

    #[error("part number {part_number} already exists")]
    DuplicatePartNumber { part_number: String },

    #[error("{name} is out of stock")]
    OutOfStock { part_id: String, name: String },

    #[error("only {available} of {name} in stock")]
    StockLimit {
        part_id: String,
        name: String,
        available: i64,
    },

    #[error("not enough stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        part_id: String,
        name: String,
        requested: i64,
        available: i64,
    },

    #[error("select a {missing} first")]
    SelectionIncomplete { missing: &'static str },

    #[error("visit {visit} is already completed")]
    VisitCompleted { visit: String },

    #[error("visit {visit} is not completed yet")]
    VisitNotCompleted { visit: String },

    #[error("no {line} line at index {index} (visit has {len})")]
    LineOutOfRange {
        line: &'static str,
        index: usize,
        len: usize,
    },
}

impl Rejection {
    /// Stable machine-readable reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::MissingField { .. } => "missing_field",
            Rejection::InvalidNumber { .. } => "invalid_number",
            Rejection::NegativeAmount { .. } => "negative_amount",
            Rejection::NonPositiveAmount { .. } => "non_positive_amount",
            Rejection::DuplicatePartNumber { .. } => "duplicate_part_number",
            Rejection::OutOfStock { .. } => "out_of_stock",
            Rejection::StockLimit { .. } => "stock_limit",
            Rejection::InsufficientStock { .. } => "insufficient_stock",
            Rejection::SelectionIncomplete { .. } => "selection_incomplete",
            Rejection::VisitCompleted { .. } => "visit_completed",
            Rejection::VisitNotCompleted { .. } => "visit_not_completed",
            Rejection::LineOutOfRange { .. } => "line_out_of_range",
        }
    }

    /// Whether the rejection concerns stock levels or visit state rather than
    /// malformed input.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            Rejection::OutOfStock { .. }
                | Rejection::StockLimit { .. }
                | Rejection::InsufficientStock { .. }
                | Rejection::VisitCompleted { .. }
                | Rejection::VisitNotCompleted { .. }
        )
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic business failures. Storage concerns
/// belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// User input or a state precondition was refused.
    #[error("rejected: {0}")]
    Rejected(Rejection),

    /// A referenced record no longer exists.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn missing(field: &'static str) -> Self {
        Self::Rejected(Rejection::MissingField { field })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            DomainError::Rejected(r) => Some(r),
            _ => None,
        }
    }
}

impl From<Rejection> for DomainError {
    fn from(value: Rejection) -> Self {
        DomainError::Rejected(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_names_the_offending_part() {
        let err = DomainError::from(Rejection::InsufficientStock {
            part_id: "p-1".to_string(),
            name: "Oil filter".to_string(),
            requested: 3,
            available: 1,
        });
        let msg = err.to_string();
        assert!(msg.contains("Oil filter"));
        assert!(msg.contains("requested 3"));
        assert_eq!(err.rejection().map(Rejection::code), Some("insufficient_stock"));
    }

    #[test]
    fn not_found_mentions_kind_and_id() {
        let err = DomainError::not_found(EntityKind::Vendor, "v-9");
        assert_eq!(err.to_string(), "vendor not found: v-9");
        assert!(err.rejection().is_none());
    }

    #[test]
    fn stock_rejections_are_state_conflicts() {
        assert!(
            Rejection::OutOfStock {
                part_id: "p".into(),
                name: "Brake pad".into()
            }
            .is_state_conflict()
        );
        assert!(!Rejection::MissingField { field: "name" }.is_state_conflict());
    }
}

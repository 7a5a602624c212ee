//! Value object trait: equality by value, not identity.
//!
//! Visit lines, schedules and computed totals are value objects: two service
//! lines with the same name and cost are interchangeable, while two spare
//! parts with the same name are still different records.

/// Marker trait for value objects.
///
/// Value objects are immutable once built and compared by their attribute
/// values. To "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

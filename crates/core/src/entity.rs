//! Entity trait and weak references between entities.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// An entity that can be shown to the operator by a short label, with a
/// placeholder used when a reference dangles.
pub trait Labelled: Entity {
    /// Label rendered for a reference whose target no longer exists.
    const PLACEHOLDER: &'static str;

    fn label(&self) -> String;
}

/// A reference by id plus the record it resolved to, if any.
///
/// Records point at each other by id only (a vehicle at its customer, a part
/// at its vendor, a visit at its customer/vehicle/parts) and nothing enforces
/// that the target still exists. Resolution never fails: a dangling
/// reference is a normal state with a defined placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Ref<T: Entity> {
    id: T::Id,
    record: Option<T>,
}

impl<T: Entity + Clone> Ref<T> {
    /// Resolve `id` against a collection (first match wins).
    pub fn resolve<'a, I>(id: T::Id, records: I) -> Self
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        let record = records.into_iter().find(|r| *r.id() == id).cloned();
        Self { id, record }
    }
}

impl<T: Entity> Ref<T> {
    pub fn dangling(id: T::Id) -> Self {
        Self { id, record: None }
    }

    pub fn id(&self) -> T::Id {
        self.id
    }

    pub fn get(&self) -> Option<&T> {
        self.record.as_ref()
    }

    pub fn is_dangling(&self) -> bool {
        self.record.is_none()
    }
}

impl<T: Labelled> Ref<T> {
    /// Label of the target, or the type's placeholder when dangling.
    pub fn label(&self) -> String {
        self.record
            .as_ref()
            .map(Labelled::label)
            .unwrap_or_else(|| T::PLACEHOLDER.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Shelf {
        id: u32,
        name: &'static str,
    }

    impl Entity for Shelf {
        type Id = u32;
        fn id(&self) -> &u32 {
            &self.id
        }
    }

    impl Labelled for Shelf {
        const PLACEHOLDER: &'static str = "Unknown";
        fn label(&self) -> String {
            self.name.to_string()
        }
    }

    #[test]
    fn resolved_reference_uses_record_label() {
        let shelves = vec![Shelf { id: 1, name: "A" }, Shelf { id: 2, name: "B" }];
        let r = Ref::resolve(2, &shelves);
        assert!(!r.is_dangling());
        assert_eq!(r.label(), "B");
    }

    #[test]
    fn dangling_reference_falls_back_to_placeholder() {
        let shelves = vec![Shelf { id: 1, name: "A" }];
        let r = Ref::resolve(9, &shelves);
        assert!(r.is_dangling());
        assert_eq!(r.id(), 9);
        assert_eq!(r.label(), "Unknown");
    }
}

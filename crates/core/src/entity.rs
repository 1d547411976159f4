//! Things with identity.

/// A record that is the same thing across changes to its fields.
///
/// Identity may be assigned late: an order line has none until the host
/// persists it. Products always carry theirs. Cart lines are keyed by product
/// and are values, not entities.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// `None` until the record has been persisted.
    fn entity_id(&self) -> Option<&Self::Id>;

    fn is_persisted(&self) -> bool {
        self.entity_id().is_some()
    }

    /// Both records are persisted under the same id.
    fn same_entity(&self, other: &Self) -> bool {
        matches!((self.entity_id(), other.entity_id()), (Some(a), Some(b)) if a == b)
    }
}

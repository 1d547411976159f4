//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**. They are defined entirely by their
//! attribute values, and two value objects with the same values are equal.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one with the new values. Carts follow the same rule: adding a
/// line produces a new cart instead of editing the old one in place, so a
/// reader holding the previous snapshot never sees it change.
///
/// ## Usage Pattern
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Money(u64);
///
/// impl ValueObject for Money {}
///
/// assert_eq!(Money(999), Money(999));
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

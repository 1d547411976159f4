//! Domain error model.

use thiserror::Error;

use crate::id::ProductId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (quantities,
/// stock, record validation). Callers decide how to present them; nothing in
/// the domain crates turns these into panics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested quantity was zero or negative.
    #[error("invalid quantity: {requested} (must be positive)")]
    InvalidQuantity { requested: i64 },

    /// A requested quantity exceeds the stock on hand.
    #[error("insufficient stock: requested {requested}, only {available} available")]
    InsufficientStock { requested: i64, available: i64 },

    /// The referenced product is not part of the current product set.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// A record failed field-level validation.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Fetching from the data source failed; the message is passed through.
    #[error("upstream query failed: {0}")]
    UpstreamQuery(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamQuery(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn product_not_found(id: &ProductId) -> Self {
        Self::ProductNotFound(id.clone())
    }

    /// Available quantity carried by an `InsufficientStock` error.
    pub fn available_stock(&self) -> Option<i64> {
        match self {
            Self::InsufficientStock { available, .. } => Some(*available),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_message_names_available_quantity() {
        let err = DomainError::InsufficientStock {
            requested: 6,
            available: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock: requested 6, only 5 available"
        );
        assert_eq!(err.available_stock(), Some(5));
    }

    #[test]
    fn available_stock_is_none_for_other_errors() {
        assert_eq!(DomainError::validation("x").available_stock(), None);
        assert_eq!(
            DomainError::InvalidQuantity { requested: 0 }.available_stock(),
            None
        );
    }
}

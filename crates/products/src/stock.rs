//! Stock guard: the one rule every quantity request passes through.

use orderdesk_core::{DomainError, DomainResult};

/// Check a requested quantity against the stock on hand.
///
/// Pure: no IO, no state. `InsufficientStock` carries `available` so the
/// caller can tell the user how many are left.
pub fn validate(requested: i64, available: i64) -> DomainResult<()> {
    if requested <= 0 {
        return Err(DomainError::InvalidQuantity { requested });
    }
    if requested > available {
        return Err(DomainError::InsufficientStock {
            requested,
            available,
        });
    }
    Ok(())
}

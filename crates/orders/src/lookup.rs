//! Aggregate lookups the pipeline makes against the host's store.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use orderdesk_core::{DomainResult, Money, OrderId, ProductId};
use orderdesk_products::Product;

/// Batched reads against the host's store.
///
/// Each method takes the full id set for a batch so one phase costs one
/// round-trip per method no matter how many records it carries. Missing ids
/// are simply absent from the returned map. Implementations should report
/// store failures as `DomainError::UpstreamQuery`.
pub trait OrderLookup: Send + Sync {
    /// Current product snapshots (price and stock) for the given ids.
    fn products(&self, ids: &BTreeSet<ProductId>) -> DomainResult<HashMap<ProductId, Product>>;

    /// Stored aggregate totals of the given orders. Orders not in the map
    /// are treated as having a zero total.
    fn order_totals(&self, ids: &BTreeSet<OrderId>) -> DomainResult<HashMap<OrderId, Money>>;
}

impl<L> OrderLookup for Arc<L>
where
    L: OrderLookup + ?Sized,
{
    fn products(&self, ids: &BTreeSet<ProductId>) -> DomainResult<HashMap<ProductId, Product>> {
        (**self).products(ids)
    }

    fn order_totals(&self, ids: &BTreeSet<OrderId>) -> DomainResult<HashMap<OrderId, Money>> {
        (**self).order_totals(ids)
    }
}

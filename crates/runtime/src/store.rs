//! In-memory store behind the pipeline lookups and the product query.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use thiserror::Error;

use orderdesk_core::{DomainError, DomainResult, Money, OrderId, OrderLineId, ProductId};
use orderdesk_orders::{OrderLineRecord, OrderLookup, OrderTotalChange};
use orderdesk_products::{CatalogError, InMemoryCatalog, Product, ProductQuery, ProductSource};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl From<StoreError> for DomainError {
    fn from(value: StoreError) -> Self {
        DomainError::upstream(value.to_string())
    }
}

/// Products, persisted order lines and per-order totals.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    catalog: InMemoryCatalog,
    lines: RwLock<HashMap<OrderLineId, OrderLineRecord>>,
    order_totals: RwLock<HashMap<OrderId, Money>>,
}

impl InMemoryOrderStore {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self {
            catalog,
            lines: RwLock::new(HashMap::new()),
            order_totals: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    pub fn line(&self, id: &OrderLineId) -> Option<OrderLineRecord> {
        let map = self.lines.read().ok()?;
        map.get(id).cloned()
    }

    pub fn lines_for_order(&self, order_id: OrderId) -> Vec<OrderLineRecord> {
        let map = match self.lines.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        let mut lines: Vec<_> = map
            .values()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| l.id);
        lines
    }

    pub fn order_total(&self, order_id: OrderId) -> Money {
        self.order_totals
            .read()
            .ok()
            .and_then(|m| m.get(&order_id).copied())
            .unwrap_or(Money::ZERO)
    }

    /// Fetch stored lines by id under one read lock, keeping request order.
    /// Unknown ids come back as `None`.
    pub fn lines_by_id(&self, ids: &[OrderLineId]) -> Result<Vec<Option<OrderLineRecord>>, StoreError> {
        let map = self.lines.read().map_err(|_| StoreError::Poisoned)?;
        Ok(ids.iter().map(|id| map.get(id).cloned()).collect())
    }

    /// Upsert persisted lines. Lines without an id are ignored.
    pub fn save_lines<'a>(
        &self,
        lines: impl IntoIterator<Item = &'a OrderLineRecord>,
    ) -> Result<(), StoreError> {
        let mut map = self.lines.write().map_err(|_| StoreError::Poisoned)?;
        for line in lines {
            if let Some(id) = line.id {
                map.insert(id, line.clone());
            }
        }
        Ok(())
    }

    pub fn remove_lines(&self, ids: &[OrderLineId]) -> Result<(), StoreError> {
        let mut map = self.lines.write().map_err(|_| StoreError::Poisoned)?;
        for id in ids {
            map.remove(id);
        }
        Ok(())
    }

    pub fn apply_order_totals(&self, changes: &[OrderTotalChange]) -> Result<(), StoreError> {
        let mut map = self.order_totals.write().map_err(|_| StoreError::Poisoned)?;
        for change in changes {
            map.insert(change.order_id, change.total);
        }
        Ok(())
    }
}

impl OrderLookup for InMemoryOrderStore {
    fn products(&self, ids: &BTreeSet<ProductId>) -> DomainResult<HashMap<ProductId, Product>> {
        let found = self.catalog.get_many(ids.iter()).map_err(StoreError::from)?;
        Ok(found.into_iter().map(|p| (p.id.clone(), p)).collect())
    }

    fn order_totals(&self, ids: &BTreeSet<OrderId>) -> DomainResult<HashMap<OrderId, Money>> {
        let map = self.order_totals.read().map_err(|_| StoreError::Poisoned)?;
        Ok(ids
            .iter()
            .filter_map(|id| map.get(id).map(|total| (*id, *total)))
            .collect())
    }
}

impl ProductSource for InMemoryOrderStore {
    type Error = CatalogError;

    fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, Self::Error> {
        self.catalog.search(query)
    }
}

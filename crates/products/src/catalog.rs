//! In-memory product catalog for tests/dev.

use std::collections::BTreeMap;
use std::sync::RwLock;

use thiserror::Error;

use orderdesk_core::ProductId;

use crate::product::Product;
use crate::query::{ProductQuery, ProductSource};

/// Default cap on the number of products one query returns.
pub const DEFAULT_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog lock poisoned")]
    Poisoned,
}

/// In-memory catalog keyed by product id.
///
/// Searches return matches ordered by name (then id), capped at `limit`.
#[derive(Debug)]
pub struct InMemoryCatalog {
    inner: RwLock<BTreeMap<ProductId, Product>>,
    limit: usize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
            limit,
        }
    }

    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let catalog = Self::new();
        for p in products {
            catalog.upsert(p);
        }
        catalog
    }

    pub fn upsert(&self, product: Product) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(product.id.clone(), product);
        }
    }

    pub fn get(&self, id: &ProductId) -> Option<Product> {
        let map = self.inner.read().ok()?;
        map.get(id).cloned()
    }

    pub fn remove(&self, id: &ProductId) -> Option<Product> {
        let mut map = self.inner.write().ok()?;
        map.remove(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up many products under a single read lock.
    pub fn get_many<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ProductId>,
    ) -> Result<Vec<Product>, CatalogError> {
        let map = self.inner.read().map_err(|_| CatalogError::Poisoned)?;
        Ok(ids.into_iter().filter_map(|id| map.get(id).cloned()).collect())
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductSource for InMemoryCatalog {
    type Error = CatalogError;

    fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, Self::Error> {
        let map = self.inner.read().map_err(|_| CatalogError::Poisoned)?;

        let mut found: Vec<Product> = map.values().filter(|p| query.matches(p)).cloned().collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        found.truncate(self.limit);

        tracing::debug!(
            term = %query.search_term,
            in_stock_only = query.in_stock_only,
            results = found.len(),
            "catalog search"
        );
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_core::Money;

    fn product(id: &str, name: &str, stock: u32) -> Product {
        Product::new(id, name, Money::from_minor(250), stock).unwrap()
    }

    #[test]
    fn search_sorts_by_name_and_filters_stock() {
        let catalog = InMemoryCatalog::from_products([
            product("P3", "Stapler", 4),
            product("P1", "Desk Lamp", 0),
            product("P2", "Desk Chair", 2),
        ]);

        let all = catalog.search(&ProductQuery::new("desk", false)).unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Desk Chair", "Desk Lamp"]);

        let in_stock = catalog.search(&ProductQuery::new("desk", true)).unwrap();
        assert_eq!(in_stock.len(), 1);
        assert_eq!(in_stock[0].id, ProductId::new("P2"));
    }

    #[test]
    fn search_is_capped_at_limit() {
        let catalog = InMemoryCatalog::with_limit(2);
        for i in 0..5 {
            catalog.upsert(product(&format!("P{i}"), &format!("Item {i}"), 1));
        }
        assert_eq!(catalog.search(&ProductQuery::default()).unwrap().len(), 2);
    }

    #[test]
    fn upsert_replaces_existing_snapshot() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(product("P1", "Lamp", 1));
        catalog.upsert(product("P1", "Lamp", 9));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&ProductId::new("P1")).unwrap().stock_quantity, 9);
    }

    #[test]
    fn get_many_skips_unknown_ids() {
        let catalog = InMemoryCatalog::from_products([product("P1", "Lamp", 1)]);
        let ids = [ProductId::new("P1"), ProductId::new("nope")];
        let found = catalog.get_many(ids.iter()).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn removed_products_drop_out_of_search() {
        let catalog = InMemoryCatalog::from_products([
            product("P1", "Lamp", 1),
            product("P2", "Lampshade", 1),
        ]);

        let removed = catalog.remove(&ProductId::new("P1")).unwrap();
        assert_eq!(removed.name, "Lamp");
        assert!(catalog.remove(&ProductId::new("P1")).is_none());

        let found = catalog.search(&ProductQuery::new("lamp", false)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ProductId::new("P2"));
    }
}

//! Product query contract.
//!
//! The UI re-invokes [`query_products`] whenever the search term or the
//! stock filter changes. There is no subscription: each call is a plain
//! request/response against a [`ProductSource`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult};

use crate::product::Product;

/// Query parameters coming from the search box and the stock filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    pub search_term: String,
    pub in_stock_only: bool,
}

impl ProductQuery {
    pub fn new(search_term: impl Into<String>, in_stock_only: bool) -> Self {
        Self {
            search_term: search_term.into(),
            in_stock_only,
        }
    }

    /// Case-insensitive name match; a blank term matches everything.
    pub fn matches(&self, product: &Product) -> bool {
        if self.in_stock_only && !product.has_stock() {
            return false;
        }
        let term = self.search_term.trim();
        term.is_empty() || product.name.to_lowercase().contains(&term.to_lowercase())
    }
}

/// A product annotated with the stock flags the UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListing {
    pub product: Product,
    pub has_stock: bool,
    pub is_out_of_stock: bool,
}

impl From<Product> for ProductListing {
    fn from(product: Product) -> Self {
        let has_stock = product.has_stock();
        Self {
            product,
            has_stock,
            is_out_of_stock: !has_stock,
        }
    }
}

/// Where product snapshots come from (the excluded persistence layer).
pub trait ProductSource: Send + Sync {
    type Error: core::fmt::Display;

    fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, Self::Error>;
}

impl<S> ProductSource for Arc<S>
where
    S: ProductSource + ?Sized,
{
    type Error = S::Error;

    fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, Self::Error> {
        (**self).search(query)
    }
}

/// Run a product query and annotate the results.
///
/// Source failures become `UpstreamQuery` with the source's message passed
/// through unchanged. No retry happens here.
pub fn query_products<S>(source: &S, query: &ProductQuery) -> DomainResult<Vec<ProductListing>>
where
    S: ProductSource + ?Sized,
{
    let products = source
        .search(query)
        .map_err(|e| DomainError::upstream(e.to_string()))?;
    Ok(products.into_iter().map(ProductListing::from).collect())
}

//! Product snapshots, the stock guard, and the product query contract.
//!
//! Products are owned by an external store; this crate only sees immutable
//! snapshots of them as they were at query time.

pub mod catalog;
pub mod product;
pub mod query;
pub mod stock;

pub use catalog::{CatalogError, InMemoryCatalog};
pub use product::Product;
pub use query::{ProductListing, ProductQuery, ProductSource, query_products};
pub use stock::validate as validate_stock;

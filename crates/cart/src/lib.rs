//! Storefront cart (pure domain logic, no rendering).
//!
//! - [`Cart`] merges additions into at most one line per product and derives
//!   item count and total on every read.
//! - [`Storefront`] is the session the UI drives: product search, per-product
//!   quantity selection, add-to-cart gated by the stock guard, and the
//!   outbound "view cart" / "checkout" notifications.

pub mod cart;
pub mod config;
pub mod notification;
pub mod storefront;

pub use cart::{Cart, CartLine, add_line};
pub use config::StorefrontConfig;
pub use notification::{CartNotification, CartSnapshot};
pub use storefront::Storefront;

//! Storefront session: the synchronous surface the UI layer calls into.
//!
//! Every UI action (search changed, filter toggled, quantity changed, add to
//! cart, view cart, checkout) maps onto one method here. Errors come back as
//! `DomainError`; turning them into toasts is the UI's business.

use std::collections::HashMap;

use chrono::Utc;

use orderdesk_core::{DomainError, DomainResult, ProductId};
use orderdesk_events::EventBus;
use orderdesk_products::{ProductListing, ProductQuery, ProductSource, query_products, stock};

use crate::cart::Cart;
use crate::config::StorefrontConfig;
use crate::notification::{CartNotification, CartSnapshot};

/// One shopper's session over a product source and a notification bus.
#[derive(Debug)]
pub struct Storefront<S, B> {
    source: S,
    bus: B,
    config: StorefrontConfig,
    query: ProductQuery,
    products: Vec<ProductListing>,
    selected: HashMap<ProductId, i64>,
    cart: Cart,
    last_error: Option<String>,
}

impl<S, B> Storefront<S, B>
where
    S: ProductSource,
    B: EventBus<CartNotification>,
{
    /// Start an empty session. Call [`Storefront::refresh`] to load products.
    pub fn new(source: S, bus: B, config: StorefrontConfig) -> Self {
        Self {
            source,
            bus,
            config,
            query: ProductQuery::default(),
            products: Vec::new(),
            selected: HashMap::new(),
            cart: Cart::new(),
            last_error: None,
        }
    }

    pub fn query(&self) -> &ProductQuery {
        &self.query
    }

    pub fn products(&self) -> &[ProductListing] {
        &self.products
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Message of the last failed product query, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Re-run the product query with the current parameters.
    ///
    /// On failure the product list is cleared and the message kept for
    /// display. There is no automatic retry.
    pub fn refresh(&mut self) -> DomainResult<&[ProductListing]> {
        match query_products(&self.source, &self.query) {
            Ok(listings) => {
                self.products = listings;
                self.last_error = None;
                Ok(&self.products)
            }
            Err(err) => {
                tracing::warn!(error = %err, "product query failed");
                self.products.clear();
                self.last_error = Some(match &err {
                    DomainError::UpstreamQuery(msg) => msg.clone(),
                    other => other.to_string(),
                });
                Err(err)
            }
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> DomainResult<&[ProductListing]> {
        self.query.search_term = term.into();
        self.refresh()
    }

    pub fn set_in_stock_only(&mut self, in_stock_only: bool) -> DomainResult<&[ProductListing]> {
        self.query.in_stock_only = in_stock_only;
        self.refresh()
    }

    /// Quantity currently selected for a product (the configured default
    /// until the user picks another).
    pub fn selected_quantity(&self, product_id: &ProductId) -> i64 {
        self.selected
            .get(product_id)
            .copied()
            .unwrap_or(self.config.default_quantity)
    }

    /// Remember the quantity picked for a listed product.
    ///
    /// The value is stored as entered; it is checked when the product is
    /// added to the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> DomainResult<()> {
        self.listing(product_id)?;
        self.selected.insert(product_id.clone(), quantity);
        Ok(())
    }

    /// Add the selected quantity of a listed product to the cart.
    ///
    /// Only the quantity being added is checked against the product's stock;
    /// units already in the cart are not counted. Two additions of 5 against
    /// a stock of 5 both pass and leave 10 in the cart.
    pub fn add_to_cart(&mut self, product_id: &ProductId) -> DomainResult<&Cart> {
        let product = self.listing(product_id)?.product.clone();
        let quantity = self.selected_quantity(product_id);

        if let Err(err) = stock::validate(quantity, product.available()) {
            tracing::warn!(product = %product_id, quantity, error = %err, "add to cart rejected");
            return Err(err);
        }

        self.cart = self.cart.add_line(&product, quantity)?;
        self.selected.remove(product_id);

        tracing::info!(
            product = %product_id,
            quantity,
            items = self.cart.item_count(),
            total = %self.cart.total(),
            "added to cart"
        );
        Ok(&self.cart)
    }

    /// Publish a "view cart" signal with the current cart state.
    pub fn view_cart(&self) -> DomainResult<CartSnapshot> {
        let snapshot = CartSnapshot::of(&self.cart, Utc::now());
        self.publish(CartNotification::ViewCart(snapshot.clone()))?;
        Ok(snapshot)
    }

    /// Publish a "checkout" signal. An empty cart cannot be checked out.
    pub fn checkout(&self) -> DomainResult<CartSnapshot> {
        if self.cart.is_empty() {
            return Err(DomainError::validation("cart is empty"));
        }
        let snapshot = CartSnapshot::of(&self.cart, Utc::now());
        self.publish(CartNotification::Checkout(snapshot.clone()))?;
        Ok(snapshot)
    }

    fn listing(&self, product_id: &ProductId) -> DomainResult<&ProductListing> {
        self.products
            .iter()
            .find(|l| &l.product.id == product_id)
            .ok_or_else(|| DomainError::product_not_found(product_id))
    }

    fn publish(&self, notification: CartNotification) -> DomainResult<()> {
        let kind = orderdesk_events::Event::event_type(&notification);
        let snapshot = notification.snapshot();
        tracing::info!(
            kind,
            items = snapshot.total_items,
            total = %snapshot.total_value,
            "publishing cart notification"
        );
        self.bus
            .publish(notification)
            .map_err(|e| DomainError::invariant(format!("notification bus unavailable: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use orderdesk_core::Money;
    use orderdesk_events::InMemoryEventBus;
    use orderdesk_products::{InMemoryCatalog, Product};

    type Bus = Arc<InMemoryEventBus<CartNotification>>;

    fn catalog() -> Arc<InMemoryCatalog> {
        Arc::new(InMemoryCatalog::from_products([
            Product::new("P1", "Notebook", Money::from_minor(999), 5).unwrap(),
            Product::new("P2", "Pencil", Money::from_minor(150), 0).unwrap(),
            Product::new("P3", "Eraser", Money::from_minor(75), 20).unwrap(),
        ]))
    }

    fn session() -> (Storefront<Arc<InMemoryCatalog>, Bus>, Bus) {
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let mut shop = Storefront::new(catalog(), bus.clone(), StorefrontConfig::default());
        shop.refresh().unwrap();
        (shop, bus)
    }

    fn p(id: &str) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn refresh_lists_catalog_with_stock_flags() {
        let (shop, _bus) = session();
        assert_eq!(shop.products().len(), 3);
        let pencil = shop.products().iter().find(|l| l.product.id == p("P2")).unwrap();
        assert!(pencil.is_out_of_stock);
    }

    #[test]
    fn changing_filters_requeries() {
        let (mut shop, _bus) = session();
        assert_eq!(shop.set_in_stock_only(true).unwrap().len(), 2);
        assert_eq!(shop.set_search_term("note").unwrap().len(), 1);
        assert_eq!(shop.query(), &ProductQuery::new("note", true));
    }

    #[test]
    fn add_to_cart_merges_and_resets_selection() {
        let (mut shop, _bus) = session();
        shop.set_quantity(&p("P1"), 2).unwrap();
        shop.add_to_cart(&p("P1")).unwrap();
        assert_eq!(shop.selected_quantity(&p("P1")), 1);

        let cart = shop.add_to_cart(&p("P1")).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.total(), Money::from_minor(2997));
    }

    #[test]
    fn add_to_cart_checks_stock() {
        let (mut shop, _bus) = session();
        shop.set_quantity(&p("P1"), 6).unwrap();
        let err = shop.add_to_cart(&p("P1")).unwrap_err();
        assert_eq!(
            err,
            DomainError::InsufficientStock {
                requested: 6,
                available: 5
            }
        );
        assert!(shop.cart().is_empty());

        shop.set_quantity(&p("P3"), 0).unwrap();
        assert_eq!(
            shop.add_to_cart(&p("P3")).unwrap_err(),
            DomainError::InvalidQuantity { requested: 0 }
        );
    }

    #[test]
    fn stock_check_ignores_quantity_already_in_cart() {
        let (mut shop, _bus) = session();
        for _ in 0..2 {
            shop.set_quantity(&p("P1"), 5).unwrap();
            shop.add_to_cart(&p("P1")).unwrap();
        }
        assert_eq!(shop.cart().line(&p("P1")).unwrap().quantity, 10);
    }

    #[test]
    fn unlisted_product_is_not_found() {
        let (mut shop, _bus) = session();
        shop.set_search_term("eraser").unwrap();
        assert_eq!(
            shop.add_to_cart(&p("P1")).unwrap_err(),
            DomainError::ProductNotFound(p("P1"))
        );
        assert!(shop.set_quantity(&p("nope"), 1).is_err());
    }

    #[test]
    fn view_cart_and_checkout_publish_snapshots() {
        let (mut shop, bus) = session();
        let sub = bus.subscribe();

        shop.add_to_cart(&p("P3")).unwrap();
        shop.view_cart().unwrap();
        let snapshot = shop.checkout().unwrap();
        assert_eq!(snapshot.total_items, 1);
        assert_eq!(snapshot.total_value, Money::from_minor(75));

        let received = sub.drain();
        assert_eq!(received.len(), 2);
        assert!(matches!(received[0], CartNotification::ViewCart(_)));
        assert!(matches!(&received[1], CartNotification::Checkout(s) if s.total_items == 1));
    }

    #[test]
    fn checkout_of_empty_cart_publishes_nothing() {
        let (shop, bus) = session();
        let sub = bus.subscribe();

        assert!(matches!(shop.checkout(), Err(DomainError::ValidationFailed(_))));
        assert!(sub.drain().is_empty());
    }

    struct FlakySource {
        fail: AtomicBool,
        inner: Arc<InMemoryCatalog>,
    }

    impl ProductSource for FlakySource {
        type Error = String;

        fn search(&self, query: &ProductQuery) -> Result<Vec<Product>, Self::Error> {
            if self.fail.load(Ordering::SeqCst) {
                return Err("store unavailable".to_string());
            }
            self.inner.search(query).map_err(|e| e.to_string())
        }
    }

    #[test]
    fn upstream_failure_clears_products_and_keeps_message() {
        let source = Arc::new(FlakySource {
            fail: AtomicBool::new(false),
            inner: catalog(),
        });
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let mut shop = Storefront::new(source.clone(), bus, StorefrontConfig::default());
        shop.refresh().unwrap();
        assert!(!shop.products().is_empty());

        source.fail.store(true, Ordering::SeqCst);
        let err = shop.refresh().unwrap_err();
        assert_eq!(err, DomainError::UpstreamQuery("store unavailable".to_string()));
        assert!(shop.products().is_empty());
        assert_eq!(shop.last_error(), Some("store unavailable"));

        source.fail.store(false, Ordering::SeqCst);
        shop.refresh().unwrap();
        assert_eq!(shop.last_error(), None);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::Money;
use orderdesk_events::Event;

use crate::cart::{Cart, CartLine};

/// Cart state handed to the enclosing UI context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub cart_items: Vec<CartLine>,
    pub total_items: u64,
    pub total_value: Money,
    pub occurred_at: DateTime<Utc>,
}

impl CartSnapshot {
    pub fn of(cart: &Cart, occurred_at: DateTime<Utc>) -> Self {
        Self {
            cart_items: cart.lines().to_vec(),
            total_items: cart.item_count(),
            total_value: cart.total(),
            occurred_at,
        }
    }
}

/// Outbound signals raised by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartNotification {
    ViewCart(CartSnapshot),
    Checkout(CartSnapshot),
}

impl CartNotification {
    pub fn snapshot(&self) -> &CartSnapshot {
        match self {
            CartNotification::ViewCart(s) | CartNotification::Checkout(s) => s,
        }
    }
}

impl Event for CartNotification {
    fn event_type(&self) -> &'static str {
        match self {
            CartNotification::ViewCart(_) => "cart.view_requested",
            CartNotification::Checkout(_) => "cart.checkout_requested",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.snapshot().occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_products::Product;

    #[test]
    fn snapshot_carries_derived_totals() {
        let product = Product::new("P1", "Notebook", Money::from_minor(999), 5).unwrap();
        let cart = Cart::new().add_line(&product, 2).unwrap();

        let snapshot = CartSnapshot::of(&cart, Utc::now());
        assert_eq!(snapshot.total_items, 2);
        assert_eq!(snapshot.total_value, Money::from_minor(1998));
        assert_eq!(snapshot.cart_items.len(), 1);
    }

    #[test]
    fn notification_serializes_with_kind_tag() {
        let n = CartNotification::Checkout(CartSnapshot::of(&Cart::new(), Utc::now()));
        let json = serde_json::to_value(&n).unwrap();

        assert_eq!(json["kind"], "checkout");
        assert_eq!(json["total_items"], 0);
        assert_eq!(n.event_type(), "cart.checkout_requested");
    }
}

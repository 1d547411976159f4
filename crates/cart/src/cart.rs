use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Money, ProductId, ValueObject};
use orderdesk_products::Product;

/// Cart line: product, quantity, unit price, derived line total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    /// Price in smallest currency unit, fixed when the line was first added.
    pub unit_price: Money,
    pub line_total: Money,
}

impl CartLine {
    fn priced(product_id: ProductId, product_name: String, quantity: u32, unit_price: Money) -> DomainResult<Self> {
        let line_total = unit_price.checked_times(i64::from(quantity))?;
        Ok(Self {
            product_id,
            product_name,
            quantity,
            unit_price,
            line_total,
        })
    }
}

/// Immutable cart value.
///
/// Invariant: at most one line per `product_id`. Every change returns a new
/// `Cart`, so a holder of an older snapshot keeps a consistent view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl ValueObject for Cart {}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Sum of line quantities. Recomputed on every call.
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of line totals. Recomputed on every call.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|l| l.line_total).sum()
    }

    /// Merge `quantity` of `product` into a copy of this cart.
    ///
    /// A repeat addition grows the existing line and re-totals it at the
    /// line's stored unit price; the product's current price only applies to
    /// new lines. The stock check is the caller's job (see
    /// [`orderdesk_products::stock::validate`]).
    pub fn add_line(&self, product: &Product, quantity: i64) -> DomainResult<Cart> {
        if quantity <= 0 {
            return Err(DomainError::InvalidQuantity { requested: quantity });
        }
        let added = u32::try_from(quantity)
            .map_err(|_| DomainError::invariant("quantity exceeds cart line capacity"))?;

        let mut lines = self.lines.clone();
        match lines.iter().position(|l| l.product_id == product.id) {
            Some(idx) => {
                let merged = {
                    let existing = &lines[idx];
                    let quantity = existing.quantity.checked_add(added).ok_or_else(|| {
                        DomainError::invariant("quantity exceeds cart line capacity")
                    })?;
                    CartLine::priced(
                        existing.product_id.clone(),
                        existing.product_name.clone(),
                        quantity,
                        existing.unit_price,
                    )?
                };
                lines[idx] = merged;
            }
            None => {
                lines.push(CartLine::priced(
                    product.id.clone(),
                    product.name.clone(),
                    added,
                    product.unit_price,
                )?);
            }
        }

        Ok(Cart { lines })
    }
}

/// Free-function form of [`Cart::add_line`].
pub fn add_line(cart: &Cart, product: &Product, quantity: i64) -> DomainResult<Cart> {
    cart.add_line(product, quantity)
}

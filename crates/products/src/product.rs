use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, Money, ProductId};

/// Product snapshot as seen at query time.
///
/// The source of truth lives in the external store; nothing in this
/// workspace mutates a product through a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: Money,
    pub stock_quantity: u32,
}

impl Product {
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        stock_quantity: u32,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id: id.into(),
            name,
            unit_price,
            stock_quantity,
        })
    }

    pub fn has_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Stock on hand in the signed domain the stock guard works in.
    pub fn available(&self) -> i64 {
        i64::from(self.stock_quantity)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn entity_id(&self) -> Option<&Self::Id> {
        Some(&self.id)
    }
}

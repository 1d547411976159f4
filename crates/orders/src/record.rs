use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, Money, OrderId, OrderLineId, ProductId};

/// Where a line is in its validate → calculate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Pending,
    Validated,
    Calculated,
}

/// Order line as delivered by the host runtime.
///
/// `line_total` and `status` are only ever changed by the pipeline; callers
/// read them through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRecord {
    /// Absent until the host has persisted the line once.
    pub id: Option<OrderLineId>,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Unit price at the time of order, in smallest currency unit. Stamped
    /// from the product during validation when the caller leaves it empty.
    pub unit_price: Option<Money>,
    line_total: Money,
    status: LineStatus,
}

impl OrderLineRecord {
    /// A new, not-yet-persisted line.
    pub fn new(order_id: OrderId, product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            id: None,
            order_id,
            product_id: product_id.into(),
            quantity,
            unit_price: None,
            line_total: Money::ZERO,
            status: LineStatus::Pending,
        }
    }

    /// Rehydrate a line the host already stored with its calculated total.
    pub fn persisted(
        id: OrderLineId,
        order_id: OrderId,
        product_id: impl Into<ProductId>,
        quantity: i64,
        unit_price: Money,
        line_total: Money,
    ) -> Self {
        Self {
            id: Some(id),
            order_id,
            product_id: product_id.into(),
            quantity,
            unit_price: Some(unit_price),
            line_total,
            status: LineStatus::Calculated,
        }
    }

    pub fn with_id(mut self, id: OrderLineId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn line_total(&self) -> Money {
        self.line_total
    }

    pub fn status(&self) -> LineStatus {
        self.status
    }

    /// Product, quantity or unit price differ from `old`.
    pub fn pricing_changed(&self, old: &OrderLineRecord) -> bool {
        self.product_id != old.product_id
            || self.quantity != old.quantity
            || self.unit_price != old.unit_price
    }

    /// Anything that moves money between order totals differs from `old`.
    pub fn rollup_changed(&self, old: &OrderLineRecord) -> bool {
        self.pricing_changed(old) || self.order_id != old.order_id
    }

    /// `quantity * unit_price`, without touching the record.
    pub fn computed_total(&self) -> DomainResult<Money> {
        let price = self
            .unit_price
            .ok_or_else(|| DomainError::validation("unit price is missing"))?;
        if self.quantity <= 0 {
            return Err(DomainError::InvalidQuantity {
                requested: self.quantity,
            });
        }
        price.checked_times(self.quantity)
    }

    pub(crate) fn mark(&mut self, status: LineStatus) {
        self.status = status;
    }

    pub(crate) fn set_line_total(&mut self, total: Money) {
        self.line_total = total;
        self.status = LineStatus::Calculated;
    }
}

impl Entity for OrderLineRecord {
    type Id = OrderLineId;

    fn entity_id(&self) -> Option<&Self::Id> {
        self.id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_line_is_pending_with_zero_total() {
        let line = OrderLineRecord::new(OrderId::new(), "P1", 2);
        assert_eq!(line.status(), LineStatus::Pending);
        assert_eq!(line.line_total(), Money::ZERO);
        assert!(line.id.is_none());
    }

    #[test]
    fn identity_comes_with_persistence() {
        let order = OrderId::new();
        let draft = OrderLineRecord::new(order, "P1", 1);
        assert!(!draft.is_persisted());
        assert!(!draft.same_entity(&draft.clone()));

        let id = OrderLineId::new();
        let stored = draft.clone().with_id(id);
        let mut edited = stored.clone();
        edited.quantity = 4;
        assert!(stored.same_entity(&edited));
        assert!(!stored.same_entity(&draft.with_id(OrderLineId::new())));
    }

    #[test]
    fn computed_total_needs_price_and_positive_quantity() {
        let order = OrderId::new();
        let line = OrderLineRecord::new(order, "P1", 3);
        assert!(matches!(line.computed_total(), Err(DomainError::ValidationFailed(_))));

        let priced = line.with_unit_price(Money::from_minor(999));
        assert_eq!(priced.computed_total().unwrap(), Money::from_minor(2997));

        let mut zero = priced.clone();
        zero.quantity = 0;
        assert_eq!(
            zero.computed_total().unwrap_err(),
            DomainError::InvalidQuantity { requested: 0 }
        );
    }

    #[test]
    fn moving_a_line_is_a_rollup_change_but_not_a_pricing_change() {
        let old = OrderLineRecord::persisted(
            OrderLineId::new(),
            OrderId::new(),
            "P1",
            1,
            Money::from_minor(100),
            Money::from_minor(100),
        );
        let mut moved = old.clone();
        moved.order_id = OrderId::new();

        assert!(!moved.pricing_changed(&old));
        assert!(moved.rollup_changed(&old));
    }
}

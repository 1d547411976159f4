use std::sync::Arc;

use proptest::prelude::*;

use orderdesk_cart::{CartNotification, Storefront, StorefrontConfig};
use orderdesk_core::{DomainError, Money, OrderId, OrderLineId, ProductId};
use orderdesk_events::{EventBus, InMemoryEventBus};
use orderdesk_orders::{LineStatus, OrderLineRecord, PipelineConfig};
use orderdesk_products::{InMemoryCatalog, Product};
use orderdesk_runtime::{InMemoryOrderStore, LineChange, TriggerDispatcher};

fn store() -> Arc<InMemoryOrderStore> {
    Arc::new(InMemoryOrderStore::new(InMemoryCatalog::from_products([
        Product::new("NB", "Notebook", Money::from_minor(999), 12).unwrap(),
        Product::new("PN", "Pen", Money::from_minor(180), 200).unwrap(),
        Product::new("ST", "Sticky notes", Money::from_minor(350), 0).unwrap(),
    ])))
}

fn dispatcher(store: &Arc<InMemoryOrderStore>) -> TriggerDispatcher {
    TriggerDispatcher::new(store.clone(), PipelineConfig::default())
}

fn stored_sum(store: &InMemoryOrderStore, order: OrderId) -> Money {
    store
        .lines_for_order(order)
        .iter()
        .map(OrderLineRecord::line_total)
        .sum()
}

#[test]
fn insert_update_delete_keep_order_total_in_step() {
    let store = store();
    let d = dispatcher(&store);
    let order = OrderId::new();

    let inserted = d
        .insert(vec![
            OrderLineRecord::new(order, "NB", 2),
            OrderLineRecord::new(order, "PN", 5),
        ])
        .unwrap();
    assert!(inserted.is_clean());
    assert_eq!(store.order_total(order), Money::from_minor(1998 + 900));

    let notebook = inserted.saved[0].id.unwrap();
    let pen = inserted.saved[1].id.unwrap();

    d.update(vec![LineChange::quantity(notebook, 3)]).unwrap();
    assert_eq!(store.order_total(order), Money::from_minor(2997 + 900));
    assert_eq!(store.line(&notebook).unwrap().line_total(), Money::from_minor(2997));

    d.delete(&[pen]).unwrap();
    assert_eq!(store.order_total(order), Money::from_minor(2997));
    assert!(store.line(&pen).is_none());
    assert_eq!(stored_sum(&store, order), store.order_total(order));
}

#[test]
fn rejected_lines_never_reach_the_store() {
    let store = store();
    let d = dispatcher(&store);
    let order = OrderId::new();

    let result = d
        .insert(vec![
            OrderLineRecord::new(order, "NB", 1),
            OrderLineRecord::new(order, "ST", 1),
            OrderLineRecord::new(order, "XX", 1),
            OrderLineRecord::new(order, "PN", -2),
        ])
        .unwrap();

    let positions: Vec<usize> = result.rejected.iter().map(|(i, _)| *i).collect();
    assert_eq!(positions, vec![1, 2, 3]);
    assert_eq!(
        result.rejected[0].1,
        DomainError::InsufficientStock {
            requested: 1,
            available: 0
        }
    );
    assert_eq!(result.rejected[1].1, DomainError::ProductNotFound(ProductId::new("XX")));
    assert_eq!(result.rejected[2].1, DomainError::InvalidQuantity { requested: -2 });

    assert_eq!(store.lines_for_order(order).len(), 1);
    assert_eq!(store.order_total(order), Money::from_minor(999));
}

#[test]
fn moving_a_line_between_orders_moves_its_total() {
    let store = store();
    let d = dispatcher(&store);
    let from = OrderId::new();
    let to = OrderId::new();

    let saved = d.insert(vec![OrderLineRecord::new(from, "PN", 4)]).unwrap().saved;
    d.insert(vec![OrderLineRecord::new(to, "NB", 1)]).unwrap();
    let line = saved[0].id.unwrap();

    let result = d
        .update(vec![LineChange {
            id: line,
            quantity: None,
            product_id: None,
            order_id: Some(to),
        }])
        .unwrap();

    assert_eq!(result.order_totals.len(), 2);
    assert_eq!(store.order_total(from), Money::ZERO);
    assert_eq!(store.order_total(to), Money::from_minor(999 + 720));
}

#[test]
fn over_stock_update_leaves_stored_line_alone() {
    let store = store();
    let d = dispatcher(&store);
    let order = OrderId::new();
    let id = d.insert(vec![OrderLineRecord::new(order, "NB", 2)]).unwrap().saved[0]
        .id
        .unwrap();

    let result = d.update(vec![LineChange::quantity(id, 20)]).unwrap();

    assert_eq!(result.rejected.len(), 1);
    assert!(result.saved.is_empty());
    assert_eq!(store.line(&id).unwrap().quantity, 2);
    assert_eq!(store.order_total(order), Money::from_minor(1998));
}

#[test]
fn deleting_unknown_lines_is_reported_per_id() {
    let store = store();
    let d = dispatcher(&store);
    let order = OrderId::new();
    let id = d.insert(vec![OrderLineRecord::new(order, "PN", 1)]).unwrap().saved[0]
        .id
        .unwrap();

    let result = d.delete(&[OrderLineId::new(), id]).unwrap();

    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].0, 0);
    assert_eq!(store.order_total(order), Money::ZERO);
}

#[test]
fn checked_out_cart_becomes_an_order() {
    let store = store();
    let bus: Arc<InMemoryEventBus<CartNotification>> = Arc::new(InMemoryEventBus::new());
    let inbox = bus.subscribe();
    let mut storefront = Storefront::new(store.clone(), bus.clone(), StorefrontConfig::default());

    storefront.refresh().unwrap();
    let notebook = ProductId::new("NB");
    storefront.set_quantity(&notebook, 2).unwrap();
    storefront.add_to_cart(&notebook).unwrap();
    storefront.add_to_cart(&ProductId::new("PN")).unwrap();
    storefront.checkout().unwrap();

    let Ok(CartNotification::Checkout(snapshot)) = inbox.try_recv() else {
        panic!("expected a checkout notification");
    };
    assert_eq!(snapshot.total_value, Money::from_minor(1998 + 180));

    let order = OrderId::new();
    let lines = snapshot
        .cart_items
        .iter()
        .map(|l| {
            OrderLineRecord::new(order, l.product_id.clone(), i64::from(l.quantity))
                .with_unit_price(l.unit_price)
        })
        .collect();
    let result = dispatcher(&store).insert(lines).unwrap();

    assert!(result.is_clean());
    assert!(result.saved.iter().all(|l| l.status() == LineStatus::Calculated));
    assert_eq!(store.order_total(order), snapshot.total_value);
}

#[derive(Debug, Clone)]
enum Op {
    Insert { order: usize, product: usize, qty: i64 },
    SetQuantity { line: prop::sample::Index, qty: i64 },
    SetQuantityTwice { line: prop::sample::Index, first: i64, second: i64 },
    Move { line: prop::sample::Index, order: usize },
    Delete { line: prop::sample::Index },
    DeleteTwice { line: prop::sample::Index },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..2, 0usize..2, 1i64..4)
            .prop_map(|(order, product, qty)| Op::Insert { order, product, qty }),
        (any::<prop::sample::Index>(), 1i64..6).prop_map(|(line, qty)| Op::SetQuantity { line, qty }),
        (any::<prop::sample::Index>(), 1i64..6, 1i64..6)
            .prop_map(|(line, first, second)| Op::SetQuantityTwice { line, first, second }),
        (any::<prop::sample::Index>(), 0usize..2).prop_map(|(line, order)| Op::Move { line, order }),
        any::<prop::sample::Index>().prop_map(|line| Op::Delete { line }),
        any::<prop::sample::Index>().prop_map(|line| Op::DeleteTwice { line }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    /// Property: whatever mix of inserts, quantity changes, moves between
    /// orders and deletes is applied (ids repeated within one call included),
    /// every stored order total equals the sum of its stored line totals.
    #[test]
    fn order_total_tracks_stored_lines(ops in prop::collection::vec(op(), 1..40)) {
        let store = store();
        let d = dispatcher(&store);
        let orders = [OrderId::new(), OrderId::new()];

        for op in ops {
            let live: Vec<OrderLineId> = orders
                .iter()
                .flat_map(|o| store.lines_for_order(*o))
                .filter_map(|l| l.id)
                .collect();

            match op {
                Op::Insert { order, product, qty } => {
                    d.insert(vec![OrderLineRecord::new(orders[order], ["NB", "PN"][product], qty)])
                        .unwrap();
                }
                _ if live.is_empty() => {}
                Op::SetQuantity { line, qty } => {
                    d.update(vec![LineChange::quantity(*line.get(&live), qty)]).unwrap();
                }
                Op::SetQuantityTwice { line, first, second } => {
                    let id = *line.get(&live);
                    let result = d
                        .update(vec![LineChange::quantity(id, first), LineChange::quantity(id, second)])
                        .unwrap();
                    prop_assert!(result.rejected.iter().any(|(i, _)| *i == 1));
                }
                Op::Move { line, order } => {
                    d.update(vec![LineChange {
                        id: *line.get(&live),
                        quantity: None,
                        product_id: None,
                        order_id: Some(orders[order]),
                    }])
                    .unwrap();
                }
                Op::Delete { line } => {
                    d.delete(&[*line.get(&live)]).unwrap();
                }
                Op::DeleteTwice { line } => {
                    let id = *line.get(&live);
                    let result = d.delete(&[id, id]).unwrap();
                    prop_assert_eq!(result.rejected.len(), 1);
                    prop_assert!(store.line(&id).is_none());
                }
            }

            for order in orders {
                prop_assert_eq!(store.order_total(order), stored_sum(&store, order));
            }
        }
    }
}

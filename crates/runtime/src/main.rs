use std::sync::Arc;

use anyhow::Context;

use orderdesk_cart::{CartNotification, Storefront};
use orderdesk_core::{Money, OrderId, ProductId};
use orderdesk_events::{EventBus, InMemoryEventBus};
use orderdesk_orders::OrderLineRecord;
use orderdesk_products::{InMemoryCatalog, Product};
use orderdesk_runtime::{InMemoryOrderStore, LineChange, RuntimeConfig, TriggerDispatcher};

fn seed(catalog: &InMemoryCatalog) -> anyhow::Result<()> {
    for (id, name, price, stock) in [
        ("NB-A5", "Notebook A5", 999, 12),
        ("PN-BLK", "Gel pen, black", 180, 200),
        ("ST-RED", "Sticky notes, red", 350, 0),
        ("BK-CLP", "Binder clips", 420, 40),
    ] {
        catalog.upsert(Product::new(id, name, Money::from_minor(price), stock)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    orderdesk_observability::init();

    let config = RuntimeConfig::from_env().context("reading ORDERDESK_* settings")?;
    tracing::info!(?config, "starting orderdesk demo");

    let catalog = InMemoryCatalog::with_limit(config.catalog_limit);
    seed(&catalog)?;
    let store = Arc::new(InMemoryOrderStore::new(catalog));

    // Storefront session.
    let bus: Arc<InMemoryEventBus<CartNotification>> = Arc::new(InMemoryEventBus::new());
    let notifications = bus.subscribe();
    let mut storefront = Storefront::new(store.clone(), bus.clone(), config.storefront.clone());

    storefront.set_in_stock_only(true)?;
    tracing::info!(listed = storefront.products().len(), "catalog loaded");

    let notebook = ProductId::new("NB-A5");
    storefront.set_quantity(&notebook, 2)?;
    storefront.add_to_cart(&notebook)?;
    storefront.add_to_cart(&ProductId::new("PN-BLK"))?;
    storefront.checkout()?;

    for notification in notifications.drain() {
        println!("{}", serde_json::to_string_pretty(&notification)?);
    }

    // Order lines through the trigger lifecycle.
    let dispatcher = TriggerDispatcher::new(store.clone(), config.pipeline);
    let order = OrderId::new();
    let inserted = dispatcher.insert(
        storefront
            .cart()
            .lines()
            .iter()
            .map(|line| OrderLineRecord::new(order, line.product_id.clone(), i64::from(line.quantity)))
            .collect(),
    )?;
    tracing::info!(
        saved = inserted.saved.len(),
        rejected = inserted.rejected.len(),
        total = %store.order_total(order),
        "order placed"
    );

    let Some(first) = inserted.saved.first().and_then(|l| l.id) else {
        anyhow::bail!("no order line was saved");
    };
    let updated = dispatcher.update(vec![LineChange::quantity(first, 3)])?;
    for (index, err) in &updated.rejected {
        tracing::warn!(index, error = %err, "update rejected");
    }
    tracing::info!(total = %store.order_total(order), "quantity changed");

    dispatcher.delete(&[first])?;
    tracing::info!(
        lines = store.lines_for_order(order).len(),
        total = %store.order_total(order),
        "line removed"
    );

    Ok(())
}

//! End-to-end cart scenarios through the composition root, including reloads
//! that go through real storage.

use std::path::Path;

use storefront_app::{AppConfig, Storefront};
use storefront_cart::{CartCommand, CartItem};
use storefront_core::{Amount, CategoryId, ProductId};
use storefront_persistence::{StorageConfig, StorageTier};

fn product(id: i64, price: f64) -> CartItem {
    let mut item = CartItem::new(
        ProductId::from_raw(id),
        format!("Product {id}"),
        Amount::new(price),
        10,
        CategoryId::from_raw(4),
    );
    item.sku = format!("SKU-{id}");
    item.color = Some("black".to_string());
    item
}

fn durable_config(dir: &Path) -> AppConfig {
    let mut storage = StorageConfig::new("lifecycle");
    storage.durable_dir = Some(dir.to_path_buf());
    AppConfig { storage }
}

fn pid(id: i64) -> ProductId {
    ProductId::from_raw(id)
}

#[test]
fn add_merge_set_and_remove_via_zero() {
    storefront_observability::tracing::init_pretty();
    let dir = tempfile::tempdir().unwrap();
    let app = Storefront::bootstrap(&durable_config(dir.path()));
    let cart = app.cart();

    // Scenario 1: first add.
    let snap = cart.dispatch(CartCommand::AddItem(product(1, 100.0)));
    assert_eq!(snap.items().len(), 1);
    assert_eq!(snap.items()[0].quantity, 1);
    assert_eq!(snap.subtotal(), Amount::new(100.0));
    assert_eq!(snap.unit_count(), 1);

    // Scenario 2: same product merges.
    let snap = cart.dispatch(CartCommand::AddItem(product(1, 100.0)));
    assert_eq!(snap.items().len(), 1);
    assert_eq!(snap.items()[0].quantity, 2);
    assert_eq!(snap.subtotal(), Amount::new(200.0));
    assert_eq!(snap.unit_count(), 2);

    // Scenario 3: explicit quantity.
    let snap = cart.dispatch(CartCommand::SetQuantity { id: pid(1), quantity: 5 });
    assert_eq!(snap.items()[0].quantity, 5);
    assert_eq!(snap.subtotal(), Amount::new(500.0));
    assert_eq!(snap.unit_count(), 5);

    // Scenario 4: zero removes.
    let snap = cart.dispatch(CartCommand::SetQuantity { id: pid(1), quantity: 0 });
    assert!(snap.items().is_empty());
    assert_eq!(snap.subtotal(), Amount::ZERO);
    assert_eq!(snap.unit_count(), 0);

    app.shutdown();
}

#[test]
fn cart_survives_reload_from_durable_storage() {
    let dir = tempfile::tempdir().unwrap();
    let config = durable_config(dir.path());

    // Scenario 5.
    let app = Storefront::bootstrap(&config);
    assert_eq!(app.storage_tier(), StorageTier::Durable);
    assert!(app.is_persistent());

    app.cart().dispatch(CartCommand::AddItem(product(1, 100.0)));
    app.cart().dispatch(CartCommand::AddItem(product(2, 50.0)));
    let before = app.cart().dispatch(CartCommand::RemoveItem { id: pid(1) });
    assert_eq!(before.items().len(), 1);
    assert_eq!(before.items()[0].id, pid(2));
    assert_eq!(before.items()[0].quantity, 1);
    assert_eq!(before.subtotal(), Amount::new(50.0));
    assert_eq!(before.unit_count(), 1);
    app.shutdown();

    // Scenario 6: a fresh instance reads the same storage.
    let reloaded = Storefront::bootstrap(&config);
    let after = reloaded.cart().snapshot();
    assert_eq!(after.items(), before.items());
    assert_eq!(after.subtotal(), before.subtotal());
    assert_eq!(after.unit_count(), before.unit_count());
    reloaded.shutdown();
}

#[test]
fn reload_preserves_order_and_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let config = durable_config(dir.path());

    let app = Storefront::bootstrap(&config);
    for id in [3, 1, 2] {
        app.cart().dispatch(CartCommand::AddItem(product(id, id as f64 * 1.25)));
    }
    app.cart().dispatch(CartCommand::AddItem(product(1, 999.0)));
    assert!(app.flush());
    let before = app.cart().snapshot();
    app.shutdown();

    let reloaded = Storefront::bootstrap(&config);
    let after = reloaded.cart().snapshot();
    let ids: Vec<i64> = after.items().iter().map(|i| i.id.get()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(*after, *before);
    assert_eq!(after.items()[1].quantity, 2);
    assert_eq!(after.items()[1].unit_price, Amount::new(1.25));
    assert_eq!(after.items()[0].color.as_deref(), Some("black"));
    reloaded.shutdown();
}

#[test]
fn cleared_cart_reloads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let config = durable_config(dir.path());

    let app = Storefront::bootstrap(&config);
    app.cart().dispatch(CartCommand::AddItem(product(1, 10.0)));
    app.cart().dispatch(CartCommand::ClearCart);
    app.shutdown();

    let reloaded = Storefront::bootstrap(&config);
    assert!(reloaded.cart().snapshot().is_empty());
    reloaded.shutdown();
}

#[test]
fn corrupt_record_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("storefront.cart.json"), "{{ nope").unwrap();
    let config = durable_config(dir.path());

    let app = Storefront::bootstrap(&config);
    assert!(app.cart().snapshot().is_empty());
    app.cart().dispatch(CartCommand::AddItem(product(8, 2.0)));
    app.shutdown();

    let reloaded = Storefront::bootstrap(&config);
    assert_eq!(reloaded.cart().unit_count(), 1);
    reloaded.shutdown();
}

#[test]
fn memory_tier_does_not_survive_reload() {
    let mut storage = StorageConfig::new("memory-only");
    storage.preferred = StorageTier::Memory;
    let config = AppConfig { storage };

    let app = Storefront::bootstrap(&config);
    assert!(!app.is_persistent());
    app.cart().dispatch(CartCommand::AddItem(product(1, 1.0)));
    assert_eq!(app.cart().unit_count(), 1);
    app.shutdown();

    let reloaded = Storefront::bootstrap(&config);
    assert!(reloaded.cart().snapshot().is_empty());
    reloaded.shutdown();
}

#[test]
fn session_tier_survives_reload_within_same_session() {
    let session_id = format!("lifecycle-session-{}", std::process::id());
    let mut storage = StorageConfig::new(session_id.clone());
    storage.preferred = StorageTier::Session;
    let config = AppConfig { storage };

    let app = Storefront::bootstrap(&config);
    assert_eq!(app.storage_tier(), StorageTier::Session);
    app.cart().dispatch(CartCommand::AddItem(product(5, 4.0)));
    app.shutdown();

    let reloaded = Storefront::bootstrap(&config);
    assert_eq!(reloaded.cart().unit_count(), 1);
    reloaded.cart().dispatch(CartCommand::ClearCart);
    reloaded.shutdown();

    let session_dir = std::env::temp_dir().join(format!("storefront-session-{session_id}"));
    let _ = std::fs::remove_dir_all(session_dir);
}

mod checkout {
    use super::*;
    use storefront_cart::{CheckoutDetails, OrderReceipt, OrderRequest, OrderService, PaymentMethod};

    #[derive(Debug)]
    struct AcceptAll;

    #[derive(Debug, thiserror::Error)]
    #[error("unreachable")]
    struct Never;

    impl OrderService for AcceptAll {
        type Error = Never;

        fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, Self::Error> {
            let units: f64 = request.items.iter().map(|l| f64::from(l.quantity)).sum();
            Ok(OrderReceipt {
                order_id: 77,
                total_amount: Amount::new(units),
            })
        }
    }

    #[test]
    fn placed_order_empties_persisted_cart() {
        let dir = tempfile::tempdir().unwrap();
        let config = durable_config(dir.path());

        let app = Storefront::bootstrap(&config);
        app.cart().dispatch(CartCommand::AddItem(product(1, 3.0)));
        app.cart().dispatch(CartCommand::AddItem(product(1, 3.0)));

        let receipt = app
            .place_order(
                &AcceptAll,
                CheckoutDetails {
                    shipping_address: "12 Harbour Rd".to_string(),
                    billing_address: "12 Harbour Rd".to_string(),
                    payment_method: PaymentMethod::Cash,
                    notes: Some("ring twice".to_string()),
                    coupon_code: None,
                    guest: None,
                },
            )
            .unwrap();

        assert_eq!(receipt.order_id, 77);
        assert_eq!(receipt.total_amount, Amount::new(2.0));
        assert!(app.cart().snapshot().is_empty());
        app.shutdown();

        let reloaded = Storefront::bootstrap(&config);
        assert!(reloaded.cart().snapshot().is_empty());
        reloaded.shutdown();
    }
}

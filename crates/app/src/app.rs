//! Composition root.
//!
//! One `Storefront` per session: it opens storage, rehydrates the cart,
//! attaches the persistence writer, and hands the cart store out by `Arc`.

use std::sync::Arc;

use storefront_cart::{
    CartStore, CheckoutDetails, CheckoutError, OrderReceipt, OrderService, submit_order,
};
use storefront_persistence::{
    PersistenceHandle, PersistenceWorker, StorageTier, open_store, rehydrate,
};

use crate::config::AppConfig;

#[derive(Debug)]
pub struct Storefront {
    cart: Arc<CartStore>,
    tier: StorageTier,
    persistence: Option<PersistenceHandle>,
}

impl Storefront {
    /// Wire up the cart. Never fails: storage problems degrade to a
    /// non-persistent cart.
    pub fn bootstrap(config: &AppConfig) -> Self {
        let storage = open_store(&config.storage);
        let tier = storage.tier();

        let state = rehydrate(storage.as_ref(), &config.storage.key);
        let cart = Arc::new(CartStore::with_state(state));

        let key = config.storage.key.clone();
        let persistence = match PersistenceWorker::attach(&cart, storage, key) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "could not start cart persistence; cart will not survive a reload"
                );
                None
            }
        };

        tracing::info!(
            tier = %tier,
            key = %config.storage.key,
            items = cart.snapshot().items().len(),
            "storefront cart ready"
        );

        Self {
            cart,
            tier,
            persistence,
        }
    }

    /// Shared handle for UI components.
    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    pub fn storage_tier(&self) -> StorageTier {
        self.tier
    }

    /// Whether the cart will survive a reload.
    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some() && self.tier.is_persistent()
    }

    /// Wait for pending cart writes. `false` when nothing is persisting.
    pub fn flush(&self) -> bool {
        self.persistence.as_ref().is_some_and(PersistenceHandle::flush)
    }

    /// Submit the cart to the order service; the cart is cleared on success.
    pub fn place_order<S>(
        &self,
        service: &S,
        details: CheckoutDetails,
    ) -> Result<OrderReceipt, CheckoutError<S::Error>>
    where
        S: OrderService,
    {
        submit_order(&self.cart, service, details)
    }

    /// Flush pending writes and stop the writer.
    pub fn shutdown(mut self) {
        if let Some(handle) = self.persistence.take() {
            handle.shutdown();
        }
        tracing::info!("storefront cart shut down");
    }
}

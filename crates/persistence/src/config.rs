use std::path::PathBuf;

use crate::storage::StorageTier;

/// Storage key the cart record lives under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "storefront.cart";

/// Where and how the cart is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Namespaced key of the single cart record.
    pub key: String,
    /// Highest tier to try; lower tiers are fallbacks.
    pub preferred: StorageTier,
    /// Override for the durable directory (defaults to the OS data dir).
    pub durable_dir: Option<PathBuf>,
    /// Identifies the session-scoped directory.
    pub session_id: String,
}

impl StorageConfig {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            key: DEFAULT_CART_KEY.to_string(),
            preferred: StorageTier::Durable,
            durable_dir: None,
            session_id: session_id.into(),
        }
    }
}

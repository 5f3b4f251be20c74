//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `STOREFRONT_CART_KEY` | `storefront.cart` |
//! | `STOREFRONT_STORAGE` | `durable` (`session`, `memory`) |
//! | `STOREFRONT_DATA_DIR` | OS data dir + `/storefront` |
//! | `STOREFRONT_SESSION_ID` | fresh UUIDv7 |

use std::path::PathBuf;

use storefront_persistence::{StorageConfig, StorageTier};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let session_id = var("STOREFRONT_SESSION_ID").unwrap_or_else(|| Uuid::now_v7().to_string());
        let mut storage = StorageConfig::new(session_id);

        if let Some(key) = var("STOREFRONT_CART_KEY") {
            storage.key = key;
        }

        if let Some(raw) = var("STOREFRONT_STORAGE") {
            match raw.parse::<StorageTier>() {
                Ok(tier) => storage.preferred = tier,
                Err(err) => {
                    tracing::warn!(
                        value = %raw,
                        error = %err,
                        "STOREFRONT_STORAGE not recognised; using durable storage"
                    );
                }
            }
        }

        storage.durable_dir = var("STOREFRONT_DATA_DIR").map(PathBuf::from);

        Self { storage }
    }
}

use thiserror::Error;

use crate::storage::StorageTier;

/// Storage-level failure. Never escapes a cart dispatch; callers log it.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{0} storage is unavailable: {1}")]
    Unavailable(StorageTier, String),

    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored cart record is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

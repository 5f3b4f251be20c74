//! `storefront-persistence` — keeps a durable copy of the cart.
//!
//! Storage is tiered (durable, session, memory) and probed at startup; the
//! cart record is written from a background thread so storage health never
//! affects a dispatch.

pub mod bridge;
pub mod config;
pub mod error;
pub mod storage;

pub use bridge::{PersistenceHandle, PersistenceWorker, load_items, rehydrate, save_items};
pub use config::{DEFAULT_CART_KEY, StorageConfig};
pub use error::StorageError;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageTier, open_store, probe};

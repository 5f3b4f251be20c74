//! Persistence bridge between the cart store and a key-value store.
//!
//! - On startup, `rehydrate` reads the single cart record and seeds a
//!   `CartState` (totals are recomputed, never read back).
//! - After startup, `PersistenceWorker::attach` subscribes to the cart store.
//!   The listener only enqueues the new item list; a background thread does
//!   the serialization and the write. A failed write is logged and dropped.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::Context;

use storefront_cart::{CartChange, CartItem, CartState, CartStore};
use storefront_events::Subscription;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, StorageTier};

/// Read the persisted items, if any.
pub fn load_items(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<Vec<CartItem>>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    let items: Vec<CartItem> = serde_json::from_str(&raw)?;
    Ok(Some(items))
}

/// Serialize and write the item list (derived totals are not stored).
pub fn save_items(store: &dyn KeyValueStore, key: &str, items: &[CartItem]) -> anyhow::Result<()> {
    let payload = serde_json::to_string(items).context("failed to serialize cart items")?;
    store.set(key, &payload).with_context(|| {
        format!("failed to write cart record {key:?} to {} storage", store.tier())
    })?;
    Ok(())
}

/// Seed a cart from storage. Any problem yields an empty cart; nothing is
/// propagated.
pub fn rehydrate(store: &dyn KeyValueStore, key: &str) -> CartState {
    match load_items(store, key) {
        Ok(Some(items)) => {
            let state = CartState::from_items(items);
            tracing::info!(
                tier = %store.tier(),
                items = state.items().len(),
                unit_count = state.unit_count(),
                "cart rehydrated"
            );
            state
        }
        Ok(None) => {
            tracing::debug!(tier = %store.tier(), "no persisted cart; starting empty");
            CartState::empty()
        }
        Err(err) => {
            tracing::warn!(
                tier = %store.tier(),
                error = %err,
                "could not rehydrate cart; starting empty"
            );
            CartState::empty()
        }
    }
}

enum Request {
    Write { sequence: u64, items: Vec<CartItem> },
    Flush(Sender<()>),
    Shutdown,
}

/// Writes records in sequence order, dropping anything older than the last
/// write.
struct Writer {
    store: Arc<dyn KeyValueStore>,
    key: String,
    last_written: u64,
}

impl Writer {
    fn write(&mut self, sequence: u64, items: &[CartItem]) {
        if sequence <= self.last_written {
            tracing::debug!(
                sequence,
                last_written = self.last_written,
                "skipping stale cart write"
            );
            return;
        }

        match save_items(self.store.as_ref(), &self.key, items) {
            Ok(()) => {
                self.last_written = sequence;
                tracing::debug!(sequence, items = items.len(), "cart persisted");
            }
            Err(err) => {
                // The in-memory cart stays authoritative; the next change retries.
                tracing::warn!(sequence, error = %format!("{err:#}"), "cart write failed");
            }
        }
    }
}

fn worker_loop(rx: Receiver<Request>, mut writer: Writer) {
    let mut deferred: Option<Request> = None;

    loop {
        let request = match deferred.take() {
            Some(request) => request,
            None => match rx.recv() {
                Ok(request) => request,
                Err(_) => break,
            },
        };

        match request {
            Request::Write { sequence, items } => {
                // Coalesce a burst of changes into a single write of the newest one.
                let (mut sequence, mut items) = (sequence, items);
                while let Ok(next) = rx.try_recv() {
                    match next {
                        Request::Write {
                            sequence: next_seq,
                            items: next_items,
                        } => {
                            if next_seq > sequence {
                                sequence = next_seq;
                                items = next_items;
                            }
                        }
                        other => {
                            deferred = Some(other);
                            break;
                        }
                    }
                }
                writer.write(sequence, &items);
            }
            Request::Flush(ack) => {
                let _ = ack.send(());
            }
            Request::Shutdown => break,
        }
    }

    tracing::debug!(key = %writer.key, "cart persistence worker stopped");
}

/// Spawns the background writer for a cart store.
#[derive(Debug)]
pub struct PersistenceWorker;

impl PersistenceWorker {
    /// Subscribe `cart` to `store` under `key`.
    ///
    /// Fails only if the writer thread cannot be spawned; the caller should
    /// then carry on without persistence.
    pub fn attach(
        cart: &CartStore,
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> std::io::Result<PersistenceHandle> {
        let key = key.into();
        let tier = store.tier();
        let (tx, rx) = mpsc::channel::<Request>();

        let writer = Writer {
            store,
            key,
            last_written: cart.sequence(),
        };
        let join = thread::Builder::new()
            .name("cart-persistence".to_string())
            .spawn(move || worker_loop(rx, writer))?;

        let listener_tx = tx.clone();
        let subscription = cart.subscribe(move |change: &CartChange| {
            let request = Request::Write {
                sequence: change.sequence(),
                items: change.snapshot().items().to_vec(),
            };
            if listener_tx.send(request).is_err() {
                tracing::warn!(
                    sequence = change.sequence(),
                    "cart persistence worker is gone; change not persisted"
                );
            }
        });

        Ok(PersistenceHandle {
            tier,
            tx,
            join: Some(join),
            subscription: Some(subscription),
        })
    }
}

/// Handle to the running writer. Dropping it stops the writer after pending
/// writes are done.
#[derive(Debug)]
pub struct PersistenceHandle {
    tier: StorageTier,
    tx: Sender<Request>,
    join: Option<thread::JoinHandle<()>>,
    subscription: Option<Subscription<CartChange>>,
}

impl PersistenceHandle {
    pub fn tier(&self) -> StorageTier {
        self.tier
    }

    /// Block until every change enqueued so far has been written (or failed).
    ///
    /// Returns `false` if the writer is no longer running.
    pub fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(Request::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }

    /// Unsubscribe, write what is pending, and stop the writer.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(join) = self.join.take() {
            let _ = self.tx.send(Request::Shutdown);
            if join.join().is_err() {
                tracing::warn!("cart persistence worker panicked");
            }
        }
    }
}

impl Drop for PersistenceHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

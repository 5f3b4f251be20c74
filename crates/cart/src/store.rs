//! Cart command dispatcher.
//!
//! `CartStore` is the only place a new `CartState` value is produced. Each
//! dispatch runs the command against a private copy of the current snapshot,
//! publishes the result as a fresh `Arc<CartState>`, and then tells listeners
//! about it. Readers holding an older `Arc` keep seeing the old value.
//!
//! ```text
//! UI event ─▶ dispatch(cmd) ─▶ handle + apply (pure) ─▶ swap snapshot
//!                                                      └▶ listeners (persistence, UI)
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use storefront_core::{Amount, ProductId};
use storefront_events::{Event, EventEnvelope, Listeners, Subscription, execute};

use crate::cart::{CartCommand, CartEvent, CartState};
use crate::item::CartItem;
use crate::selectors;

/// Notification sent to listeners after a command changed the cart.
#[derive(Debug, Clone)]
pub struct CartChange {
    sequence: u64,
    events: Vec<EventEnvelope<CartEvent>>,
    snapshot: Arc<CartState>,
}

impl CartChange {
    /// Position of this change in the store's mutation stream (starts at 1).
    ///
    /// Concurrent dispatches may reach a listener out of order; compare
    /// against the last sequence seen to drop stale changes.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn events(&self) -> &[EventEnvelope<CartEvent>] {
        &self.events
    }

    pub fn snapshot(&self) -> &Arc<CartState> {
        &self.snapshot
    }
}

#[derive(Debug)]
struct Current {
    snapshot: Arc<CartState>,
    sequence: u64,
}

/// Single-instance-per-session cart state container.
///
/// Constructed by the composition root and shared by handle (`Arc<CartStore>`);
/// there is no global instance.
#[derive(Debug)]
pub struct CartStore {
    current: Mutex<Current>,
    listeners: Listeners<CartChange>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::with_state(CartState::empty())
    }

    /// Start from a rehydrated state.
    pub fn with_state(state: CartState) -> Self {
        Self {
            current: Mutex::new(Current {
                snapshot: Arc::new(state),
                sequence: 0,
            }),
            listeners: Listeners::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Current> {
        // The guarded section is pure and cannot leave `Current` half-written.
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `command` and return the resulting snapshot.
    ///
    /// Always succeeds. Listeners are only notified when the command changed
    /// something, and only after the new snapshot is visible to readers.
    pub fn dispatch(&self, command: CartCommand) -> Arc<CartState> {
        let change = {
            let mut current = self.lock();

            let mut next = CartState::clone(&current.snapshot);
            let events = match execute(&mut next, &command) {
                Ok(events) => events,
                Err(never) => match never {},
            };

            if events.is_empty() {
                tracing::debug!(?command, "cart command was a no-op");
                return Arc::clone(&current.snapshot);
            }

            current.sequence += 1;
            current.snapshot = Arc::new(next);

            let sequence = current.sequence;
            CartChange {
                sequence,
                events: events
                    .into_iter()
                    .map(|ev| EventEnvelope::new(sequence, ev))
                    .collect(),
                snapshot: Arc::clone(&current.snapshot),
            }
        };

        for envelope in &change.events {
            tracing::trace!(
                event_id = %envelope.event_id(),
                event_type = envelope.payload().event_type(),
                version = envelope.payload().version(),
                recorded_at = %envelope.recorded_at(),
                sequence = envelope.sequence_number(),
                "cart event"
            );
        }
        tracing::debug!(
            sequence = change.sequence,
            items = change.snapshot.items().len(),
            unit_count = change.snapshot.unit_count(),
            "cart updated"
        );

        self.listeners.publish(&change);
        change.snapshot
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> Arc<CartState> {
        Arc::clone(&self.lock().snapshot)
    }

    /// Number of state-changing commands applied so far.
    pub fn sequence(&self) -> u64 {
        self.lock().sequence
    }

    /// Register a listener for every subsequent change.
    ///
    /// Listeners run on the dispatching thread after the store lock is
    /// released. Each change is delivered exactly once, but two threads
    /// dispatching at the same time can deliver them out of sequence order.
    /// Listeners that need ordering must check [`CartChange::sequence`].
    pub fn subscribe<F>(&self, listener: F) -> Subscription<CartChange>
    where
        F: Fn(&CartChange) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn items(&self) -> Vec<CartItem> {
        selectors::items(&self.snapshot()).to_vec()
    }

    pub fn subtotal(&self) -> Amount {
        selectors::subtotal(&self.snapshot())
    }

    pub fn unit_count(&self) -> u64 {
        selectors::unit_count(&self.snapshot())
    }

    pub fn find_item(&self, id: ProductId) -> Option<CartItem> {
        selectors::find_item(&self.snapshot(), id).cloned()
    }

    pub fn is_checkout_ready(&self) -> bool {
        selectors::is_checkout_ready(&self.snapshot())
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

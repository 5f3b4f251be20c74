//! Listener registry (observer pattern, mechanics only).
//!
//! A `Listeners<M>` fans a message out to every registered callback, in
//! subscription order. Callbacks run on the publishing thread, after the
//! registry lock has been released, so a callback may publish or subscribe
//! again without deadlocking.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Listener<M> = Arc<dyn Fn(&M) + Send + Sync>;

struct Registry<M> {
    next_id: u64,
    entries: Vec<(u64, Listener<M>)>,
}

fn lock<M>(registry: &Mutex<Registry<M>>) -> MutexGuard<'_, Registry<M>> {
    // Listeners never run under the lock, so a poisoned registry still holds
    // a consistent entry list.
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Broadcast registry of callbacks.
pub struct Listeners<M> {
    registry: Arc<Mutex<Registry<M>>>,
}

impl<M> Listeners<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it receives every message published afterwards.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<M>
    where
        F: Fn(&M) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Deliver `message` to every current listener. Returns how many were called.
    pub fn publish(&self, message: &M) -> usize {
        let targets: Vec<Listener<M>> = lock(&self.registry)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &targets {
            listener(message);
        }

        tracing::trace!(listeners = targets.len(), "published to listeners");
        targets.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<M> Default for Listeners<M> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<M> core::fmt::Debug for Listeners<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

/// Handle returned by [`Listeners::subscribe`].
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<M> {
    id: u64,
    registry: Weak<Mutex<Registry<M>>>,
}

impl<M> Subscription<M> {
    /// Remove the listener. Returns `false` if it was already gone (or the
    /// registry itself was dropped).
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock(&registry);
        let before = registry.entries.len();
        registry.entries.retain(|(id, _)| *id != self.id);
        registry.entries.len() != before
    }
}

impl<M> core::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

//! Listener registry: callbacks keyed by id, removed when their
//! [`Subscription`] is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::state::AuthSnapshot;

type Callback = Arc<dyn Fn(&AuthSnapshot) + Send + Sync>;

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registered change callbacks.
pub struct ListenerRegistry {
    /// Listener ID → callback.
    listeners: Arc<DashMap<ListenerId, Callback>>,
    /// Next ID to hand out.
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a callback. It stays registered until the returned
    /// subscription is dropped or `unsubscribe`d.
    pub fn register<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(id, Arc::new(callback));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Invokes every registered callback with `snapshot`.
    ///
    /// Callbacks are collected first so they may register or drop
    /// subscriptions without deadlocking the map.
    pub fn notify(&self, snapshot: &AuthSnapshot) {
        let callbacks: Vec<Callback> = self
            .listeners
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for callback in callbacks {
            callback(snapshot);
        }
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Handle of a registered listener. Dropping it unregisters the listener.
#[derive(Debug)]
#[must_use = "dropping the subscription unregisters the listener immediately"]
pub struct Subscription {
    id: ListenerId,
    listeners: Weak<DashMap<ListenerId, Callback>>,
}

impl Subscription {
    /// ID of the registered listener.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Unregisters the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(&self.id);
        }
    }
}

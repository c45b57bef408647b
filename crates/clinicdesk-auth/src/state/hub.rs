//! Single-writer publication point for [`AuthSnapshot`].

use tokio::sync::watch;
use tracing::debug;

use clinicdesk_core::types::Identity;

use crate::listener::{ListenerRegistry, Subscription};

use super::model::{AuthSnapshot, AuthorizationState};

/// Holds the current snapshot and notifies observers on every change.
///
/// Observers can either hold a `watch` receiver or register a callback.
#[derive(Debug)]
pub struct AuthStateHub {
    /// Latest snapshot.
    tx: watch::Sender<AuthSnapshot>,
    /// Callback observers.
    listeners: ListenerRegistry,
}

impl AuthStateHub {
    /// Create a hub in the initial (loading, denied) state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthSnapshot::initial());
        Self {
            tx,
            listeners: ListenerRegistry::new(),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    /// Receiver that observes every future snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    /// Register a callback invoked after each change.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        self.listeners.register(callback)
    }

    /// Record the identity of a new session.
    ///
    /// A different email drops the previous authorization in the same
    /// update; it is restored only by a resolution for the new identity.
    pub fn set_identity(&self, identity: Option<Identity>) {
        self.update(|s| {
            if email_of(&s.identity) != email_of(&identity) {
                s.authorization = AuthorizationState::unauthorized();
            }
            s.identity = identity;
        });
    }

    /// Record the result of a role resolution and end the loading phase.
    pub fn set_authorization(&self, authorization: AuthorizationState) {
        self.update(|s| {
            s.authorization = authorization;
            s.loading = false;
        });
    }

    /// Drop identity and authorization (sign-out or no session).
    pub fn clear(&self) {
        self.update(|s| {
            s.identity = None;
            s.authorization = AuthorizationState::unauthorized();
            s.loading = false;
        });
    }

    fn update(&self, modify: impl FnOnce(&mut AuthSnapshot)) {
        let changed = self.tx.send_if_modified(|snapshot| {
            let before = snapshot.clone();
            modify(snapshot);
            *snapshot != before
        });

        if changed {
            let snapshot = self.snapshot();
            debug!(
                role = %snapshot.authorization.role,
                loading = snapshot.loading,
                "Authorization snapshot changed"
            );
            self.listeners.notify(&snapshot);
        }
    }
}

fn email_of(identity: &Option<Identity>) -> Option<&str> {
    identity.as_ref().and_then(|i| i.email.as_deref())
}

impl Default for AuthStateHub {
    fn default() -> Self {
        Self::new()
    }
}

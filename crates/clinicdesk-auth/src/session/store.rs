//! Session store: bootstraps the session from the auth collaborator and
//! follows its change feed.
//!
//! Change events are applied in the order they arrive. Each event's role
//! lookup runs as its own task and is not cancelled by later events, so a
//! slow lookup for an older session can land after a newer one and win.
//! A session for a different email starts out unauthorized until its own
//! lookup lands.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, RwLock, broadcast};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use clinicdesk_core::events::AuthChangeEvent;
use clinicdesk_core::traits::AuthProvider;
use clinicdesk_core::types::{Identity, Session};

use crate::role::RoleResolver;
use crate::state::{AuthStateHub, AuthorizationState};

/// State shared between the store and its listener task.
#[derive(Debug)]
struct Shared {
    /// Auth collaborator.
    auth: Arc<dyn AuthProvider>,
    /// Role resolver.
    resolver: RoleResolver,
    /// Current session.
    session: RwLock<Option<Session>>,
    /// Snapshot publication.
    hub: Arc<AuthStateHub>,
}

impl Shared {
    /// Replace the session and publish the new identity immediately.
    async fn replace_session(&self, session: Option<Session>) -> Option<Identity> {
        let identity = session.as_ref().map(|s| s.user.clone());
        *self.session.write().await = session;

        match &identity {
            Some(identity) => self.hub.set_identity(Some(identity.clone())),
            None => self.hub.clear(),
        }
        identity
    }

    /// Resolve the role for `identity` and publish it.
    async fn resolve_and_publish(&self, identity: Identity) -> AuthorizationState {
        let state = self.resolver.resolve(&identity).await;
        self.hub.set_authorization(state.clone());
        state
    }

    /// Apply one transition and wait for its role resolution.
    async fn apply(&self, session: Option<Session>) -> AuthorizationState {
        match self.replace_session(session).await {
            Some(identity) => self.resolve_and_publish(identity).await,
            None => AuthorizationState::unauthorized(),
        }
    }
}

/// Tracks the current session and re-resolves the role on every change.
///
/// Dropping the store (or calling [`shutdown`](Self::shutdown)) stops
/// following the change feed.
#[derive(Debug)]
pub struct SessionStore {
    /// Shared state.
    shared: Arc<Shared>,
    /// Change-feed listener.
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    /// Creates a store publishing into `hub`.
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        resolver: RoleResolver,
        hub: Arc<AuthStateHub>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                auth,
                resolver,
                session: RwLock::new(None),
                hub,
            }),
            listener: Mutex::new(None),
        }
    }

    /// Fetches the current session, resolves its role, then starts
    /// following the change feed. Calling it again is a no-op.
    ///
    /// A failing session fetch is treated as "no session".
    pub async fn start(&self) {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return;
        }

        // Subscribe before fetching so no transition is lost in between.
        let events = self.shared.auth.subscribe();

        let session = match self.shared.auth.current_session().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to fetch current session, starting signed out");
                None
            }
        };
        info!(signed_in = session.is_some(), "Session bootstrapped");
        self.shared.apply(session).await;

        *listener = Some(tokio::spawn(follow(self.shared.clone(), events)));
    }

    /// Stops following the change feed.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
            debug!("Session listener stopped");
        }
    }

    /// The current session.
    pub async fn session(&self) -> Option<Session> {
        self.shared.session.read().await.clone()
    }

    /// Identity of the current session.
    pub async fn identity(&self) -> Option<Identity> {
        self.shared
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.user.clone())
    }

    /// True until the first resolution has completed.
    pub fn is_loading(&self) -> bool {
        self.shared.hub.snapshot().loading
    }

    /// Re-runs the role lookup for the current identity.
    pub async fn refresh_user_role(&self) -> AuthorizationState {
        match self.identity().await {
            Some(identity) => self.shared.resolve_and_publish(identity).await,
            None => {
                self.shared.hub.clear();
                AuthorizationState::unauthorized()
            }
        }
    }

    /// Drops the local session and authorization.
    pub async fn clear(&self) {
        self.shared.replace_session(None).await;
    }

    /// The role resolver in use.
    pub fn resolver(&self) -> &RoleResolver {
        &self.shared.resolver
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        if let Some(handle) = self.listener.get_mut().take() {
            handle.abort();
        }
    }
}

/// Applies change events in arrival order until the feed closes.
async fn follow(shared: Arc<Shared>, mut events: broadcast::Receiver<AuthChangeEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                debug!(kind = ?event.kind, "Auth change received");
                spawn_transition(&shared, event.session).await;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Auth change feed lagged, resynchronizing");
                match shared.auth.current_session().await {
                    Ok(session) => spawn_transition(&shared, session).await,
                    Err(e) => {
                        warn!(error = %e, "Resynchronization failed, clearing session");
                        spawn_transition(&shared, None).await;
                    }
                }
            }
            Err(RecvError::Closed) => {
                debug!("Auth change feed closed");
                break;
            }
        }
    }
}

/// Publishes the new session now and resolves its role in the background.
async fn spawn_transition(shared: &Arc<Shared>, session: Option<Session>) {
    if let Some(identity) = shared.replace_session(session).await {
        let shared = shared.clone();
        tokio::spawn(async move {
            shared.resolve_and_publish(identity).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clinicdesk_backend::{MemoryAuthProvider, MemoryDataClient};
    use clinicdesk_core::config::AuthConfig;
    use clinicdesk_entity::user::UserRole;
    use serde_json::json;
    use tokio::time::timeout;

    use crate::gate::{AccessGate, RouteDecision};
    use crate::state::AuthSnapshot;

    use super::*;

    struct Fixture {
        auth: Arc<MemoryAuthProvider>,
        data: Arc<MemoryDataClient>,
        hub: Arc<AuthStateHub>,
        store: SessionStore,
    }

    fn fixture(auth: MemoryAuthProvider) -> Fixture {
        let auth = Arc::new(auth);
        let data = Arc::new(MemoryDataClient::new());
        let hub = Arc::new(AuthStateHub::new());
        let resolver = RoleResolver::new(data.clone(), &AuthConfig::default());
        let store = SessionStore::new(auth.clone(), resolver, hub.clone());
        Fixture {
            auth,
            data,
            hub,
            store,
        }
    }

    fn grant(data: &MemoryDataClient, email: &str, role: &str) {
        data.insert_row(
            "authorized_users",
            json!({ "email": email, "role": role, "is_active": true }),
        );
    }

    async fn wait_for(hub: &AuthStateHub, check: impl FnMut(&AuthSnapshot) -> bool) -> AuthSnapshot {
        let mut rx = hub.subscribe();
        let snapshot = timeout(Duration::from_secs(5), rx.wait_for(check))
            .await
            .expect("timed out waiting for snapshot")
            .expect("hub dropped")
            .clone();
        snapshot
    }

    #[tokio::test]
    async fn test_start_without_session() {
        let f = fixture(MemoryAuthProvider::new());
        assert!(f.store.is_loading());

        f.store.start().await;

        assert!(!f.store.is_loading());
        assert!(f.store.identity().await.is_none());
        assert!(!f.hub.snapshot().is_authorized());
    }

    #[tokio::test]
    async fn test_start_with_existing_session_resolves_role() {
        let f = fixture(MemoryAuthProvider::with_session_for("admin@example.com"));
        grant(&f.data, "admin@example.com", "admin");

        f.store.start().await;

        let snapshot = f.hub.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.authorization.role, UserRole::Admin);
        assert_eq!(
            f.store.identity().await.and_then(|i| i.email),
            Some("admin@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn test_sign_in_and_out_events_are_followed() {
        let f = fixture(MemoryAuthProvider::new());
        grant(&f.data, "doctor@example.com", "doctor");
        f.store.start().await;

        f.auth
            .sign_in_as(Identity::with_email("doctor@example.com"))
            .await;
        let snapshot = wait_for(&f.hub, |s| s.authorization.role == UserRole::Doctor).await;
        assert!(snapshot.is_authorized());

        f.auth.sign_out().await.unwrap();
        let snapshot = wait_for(&f.hub, |s| s.identity.is_none()).await;
        assert_eq!(snapshot.authorization, AuthorizationState::unauthorized());
        assert!(f.store.session().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_following() {
        let f = fixture(MemoryAuthProvider::new());
        grant(&f.data, "helper@example.com", "helper");
        f.store.start().await;
        f.store.shutdown().await;

        f.auth
            .sign_in_as(Identity::with_email("helper@example.com"))
            .await;
        tokio::task::yield_now().await;

        assert!(f.store.identity().await.is_none());
        assert!(!f.hub.snapshot().is_authorized());
    }

    // Known race: lookups are not cancelled when a newer session arrives,
    // so a slow lookup for an older session overwrites the newer result.
    #[tokio::test]
    async fn test_stale_lookup_overwrites_newer_resolution() {
        let f = fixture(MemoryAuthProvider::new());
        grant(&f.data, "slow@example.com", "admin");
        grant(&f.data, "fast@example.com", "patient");
        let gate = f.data.gate_lookup("slow@example.com");
        f.store.start().await;

        f.auth
            .sign_in_as(Identity::with_email("slow@example.com"))
            .await;
        f.auth
            .sign_in_as(Identity::with_email("fast@example.com"))
            .await;
        let snapshot = wait_for(&f.hub, |s| s.authorization.role == UserRole::Patient).await;
        assert_eq!(
            snapshot.identity.and_then(|i| i.email).as_deref(),
            Some("fast@example.com")
        );

        gate.add_permits(1);
        let snapshot = wait_for(&f.hub, |s| s.authorization.role == UserRole::Admin).await;
        assert_eq!(
            snapshot.identity.and_then(|i| i.email).as_deref(),
            Some("fast@example.com")
        );
    }

    #[tokio::test]
    async fn test_new_identity_is_denied_while_its_lookup_is_pending() {
        let f = fixture(MemoryAuthProvider::with_session_for("admin@example.com"));
        f.data.insert_row(
            "authorized_users",
            json!({
                "email": "admin@example.com",
                "role": "admin",
                "full_name": "Alice Admin",
                "is_active": true
            }),
        );
        f.store.start().await;
        assert_eq!(AccessGate::route(&f.hub.snapshot()), RouteDecision::Allow);

        let gate = f.data.gate_lookup("stranger@example.com");
        f.auth
            .sign_in_as(Identity::with_email("stranger@example.com"))
            .await;
        let snapshot = wait_for(&f.hub, |s| {
            s.identity.as_ref().and_then(|i| i.email.as_deref()) == Some("stranger@example.com")
        })
        .await;

        assert_eq!(snapshot.authorization.role, UserRole::Unauthorized);
        assert_eq!(snapshot.authorization.full_name, None);
        assert_ne!(AccessGate::route(&snapshot), RouteDecision::Allow);

        gate.add_permits(2);
        f.store.refresh_user_role().await;
        assert!(!f.hub.snapshot().is_authorized());
    }

    #[tokio::test]
    async fn test_token_refresh_keeps_role_while_lookup_is_pending() {
        let f = fixture(MemoryAuthProvider::with_session_for("doctor@example.com"));
        grant(&f.data, "doctor@example.com", "doctor");
        f.store.start().await;
        let before = f.store.session().await.map(|s| s.access_token);

        let gate = f.data.gate_lookup("doctor@example.com");
        f.auth.refresh().await.unwrap();
        timeout(Duration::from_secs(5), async {
            while f.store.session().await.map(|s| s.access_token) == before {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("token refresh was not applied");

        assert_eq!(f.hub.snapshot().authorization.role, UserRole::Doctor);
        gate.add_permits(1);
    }
}

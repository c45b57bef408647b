//! Auth service: the single entry point the dashboard and CLI hold.
//!
//! Wires the session store, role resolver, snapshot hub and access gate
//! together around the two collaborators.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use clinicdesk_core::config::AuthConfig;
use clinicdesk_core::result::AppResult;
use clinicdesk_core::traits::{AuthProvider, DataClient};
use clinicdesk_core::types::{Identity, ProviderRedirect, Session};

use crate::audit::AuditReport;
use crate::gate::{AccessGate, Feature, RouteDecision};
use crate::listener::Subscription;
use crate::role::RoleResolver;
use crate::session::SessionStore;
use crate::state::{AuthSnapshot, AuthStateHub, AuthorizationState};

/// Authentication and authorization facade.
#[derive(Debug)]
pub struct AuthService {
    /// Auth collaborator.
    auth: Arc<dyn AuthProvider>,
    /// Snapshot publication.
    hub: Arc<AuthStateHub>,
    /// Session tracking.
    store: SessionStore,
    /// Access decisions.
    gate: AccessGate,
    /// Auth configuration.
    config: AuthConfig,
}

impl AuthService {
    /// Creates the service. Nothing is fetched until [`start`](Self::start).
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        data: Arc<dyn DataClient>,
        config: &AuthConfig,
    ) -> Self {
        let hub = Arc::new(AuthStateHub::new());
        let resolver = RoleResolver::new(data, config);
        let store = SessionStore::new(auth.clone(), resolver, hub.clone());
        Self {
            auth,
            hub,
            store,
            gate: AccessGate::new(),
            config: config.clone(),
        }
    }

    /// Replaces the access gate (custom feature policies).
    pub fn with_gate(mut self, gate: AccessGate) -> Self {
        self.gate = gate;
        self
    }

    /// Resolves the current session and starts following changes.
    pub async fn start(&self) -> AuthSnapshot {
        self.store.start().await;
        self.hub.snapshot()
    }

    /// Stops following changes.
    pub async fn shutdown(&self) {
        self.store.shutdown().await;
    }

    // ── Observation ──────────────────────────────────────────────

    /// Current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.hub.snapshot()
    }

    /// Current authorization state.
    pub fn state(&self) -> AuthorizationState {
        self.hub.snapshot().authorization
    }

    /// `role ≠ unauthorized`.
    pub fn is_authorized(&self) -> bool {
        self.hub.snapshot().is_authorized()
    }

    /// True until the first resolution completes.
    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    /// Identity of the current session.
    pub async fn identity(&self) -> Option<Identity> {
        self.store.identity().await
    }

    /// The current session.
    pub async fn session(&self) -> Option<Session> {
        self.store.session().await
    }

    /// Watch receiver of snapshots.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.hub.subscribe()
    }

    /// Registers a change callback; dropping the subscription removes it.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        self.hub.on_change(callback)
    }

    /// Receiver of login audit results.
    pub fn audit_reports(&self) -> broadcast::Receiver<AuditReport> {
        self.store.resolver().audit().subscribe()
    }

    /// Waits up to `wait` for detached login audits. Returns `false` if
    /// some are still running.
    pub async fn settle_audits(&self, wait: Duration) -> bool {
        self.store.resolver().audit().settle(wait).await
    }

    // ── Operations ───────────────────────────────────────────────

    /// Re-runs the role lookup for the current identity.
    pub async fn refresh_user_role(&self) -> AuthorizationState {
        self.store.refresh_user_role().await
    }

    /// Starts an OAuth sign-in. `None` uses the configured provider.
    ///
    /// The session itself arrives later through the change feed.
    pub async fn sign_in_with_provider(
        &self,
        provider: Option<&str>,
    ) -> AppResult<ProviderRedirect> {
        let provider = provider.unwrap_or(&self.config.default_provider);
        self.auth
            .sign_in_with_provider(provider, &self.config.redirect_url)
            .await
    }

    /// Signs in with email and password.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        self.auth.sign_in_with_password(email.trim(), password).await
    }

    /// Ends the session. Local state is reset even when the collaborator
    /// fails; its error is still returned.
    pub async fn sign_out(&self) -> AppResult<()> {
        let result = self.auth.sign_out().await;
        self.store.clear().await;

        match &result {
            Ok(()) => info!("Signed out"),
            Err(e) => warn!(error = %e, "Sign-out failed remotely, local session cleared"),
        }
        result
    }

    // ── Gate ─────────────────────────────────────────────────────

    /// Routing decision for a view that requires an authorized session.
    pub fn route_decision(&self) -> RouteDecision {
        AccessGate::route(&self.hub.snapshot())
    }

    /// Routing decision for a feature view.
    pub fn route_feature(&self, feature: Feature) -> RouteDecision {
        self.gate.route_feature(&self.hub.snapshot(), feature)
    }

    /// Whether the signed-in user may open `feature`.
    pub fn can_access(&self, feature: Feature) -> bool {
        self.gate.permits(&self.hub.snapshot(), feature)
    }

    /// Errors with `Authentication` without a session, and with
    /// `Authorization` unless the current role may open `feature`.
    pub fn require(&self, feature: Feature) -> AppResult<()> {
        self.gate.require(&self.hub.snapshot(), feature)
    }

    /// The access gate in use.
    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use clinicdesk_backend::{MemoryAuthProvider, MemoryDataClient};
    use clinicdesk_core::error::ErrorKind;
    use clinicdesk_entity::user::UserRole;
    use serde_json::json;
    use tokio::time::timeout;

    use super::*;

    fn service(auth: Arc<MemoryAuthProvider>, data: Arc<MemoryDataClient>) -> AuthService {
        AuthService::new(auth, data, &AuthConfig::default())
    }

    fn grant_admin(data: &MemoryDataClient) {
        data.insert_row(
            "authorized_users",
            json!({
                "email": "admin@example.com",
                "role": "admin",
                "full_name": "Alice Admin",
                "is_active": true
            }),
        );
    }

    async fn wait_for(
        service: &AuthService,
        check: impl FnMut(&AuthSnapshot) -> bool,
    ) -> AuthSnapshot {
        let mut rx = service.subscribe();
        let snapshot = timeout(Duration::from_secs(5), rx.wait_for(check))
            .await
            .expect("timed out waiting for snapshot")
            .expect("hub dropped")
            .clone();
        snapshot
    }

    #[tokio::test]
    async fn test_password_sign_in_then_start() {
        let auth = Arc::new(MemoryAuthProvider::new());
        auth.register_account("helper@example.com", "secret");
        let data = Arc::new(MemoryDataClient::new());
        data.insert_row(
            "authorized_users",
            json!({ "email": "helper@example.com", "role": "helper", "is_active": true }),
        );
        let service = service(auth, data);

        assert!(
            service
                .sign_in_with_password("helper@example.com", "wrong")
                .await
                .is_err()
        );
        service
            .sign_in_with_password(" helper@example.com ", "secret")
            .await
            .unwrap();

        let snapshot = service.start().await;
        assert_eq!(snapshot.authorization.role, UserRole::Helper);
        assert_eq!(service.route_decision(), RouteDecision::Allow);
        assert!(service.can_access(Feature::Patients));
        assert!(!service.can_access(Feature::Billing));
    }

    #[tokio::test]
    async fn test_provider_sign_in_uses_configured_default() {
        let service = service(
            Arc::new(MemoryAuthProvider::new()),
            Arc::new(MemoryDataClient::new()),
        );
        let redirect = service.sign_in_with_provider(None).await.unwrap();
        assert_eq!(redirect.provider, "google");
        assert!(redirect.url.contains("redirect_to=http://localhost:5173/"));

        let redirect = service.sign_in_with_provider(Some("github")).await.unwrap();
        assert_eq!(redirect.provider, "github");
    }

    #[tokio::test]
    async fn test_failed_sign_out_still_resets_local_state() {
        let auth = Arc::new(MemoryAuthProvider::with_session_for("admin@example.com"));
        let data = Arc::new(MemoryDataClient::new());
        data.insert_row(
            "authorized_users",
            json!({ "email": "admin@example.com", "role": "admin", "is_active": true }),
        );
        let service = service(auth.clone(), data);
        service.start().await;
        assert!(service.is_authorized());

        auth.fail_next_sign_out();
        let err = service.sign_out().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExternalService);

        assert!(service.identity().await.is_none());
        assert_eq!(service.state(), AuthorizationState::unauthorized());
        assert_eq!(service.route_decision(), RouteDecision::RedirectToLogin);
        assert!(service.require(Feature::Dashboard).is_err());
    }

    #[tokio::test]
    async fn test_on_change_observers_see_transitions() {
        let auth = Arc::new(MemoryAuthProvider::with_session_for("patient@example.com"));
        let data = Arc::new(MemoryDataClient::new());
        data.insert_row(
            "authorized_users",
            json!({ "email": "patient@example.com", "role": "patient", "is_active": true }),
        );
        let service = service(auth, data);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscription = {
            let seen = seen.clone();
            service.on_change(move |s| seen.lock().unwrap().push(s.authorization.role))
        };

        service.start().await;
        service.sign_out().await.unwrap();
        drop(subscription);
        service.refresh_user_role().await;

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.first(), Some(&UserRole::Unauthorized));
        assert!(seen.contains(&UserRole::Patient));
        assert_eq!(seen.last(), Some(&UserRole::Unauthorized));
    }

    #[tokio::test]
    async fn test_start_audit_can_be_settled() {
        let auth = Arc::new(MemoryAuthProvider::with_session_for("admin@example.com"));
        let data = Arc::new(MemoryDataClient::new());
        grant_admin(&data);
        let service = service(auth, data.clone());
        let mut reports = service.audit_reports();

        service.start().await;
        assert!(service.settle_audits(Duration::from_secs(5)).await);

        let report = reports.try_recv().unwrap();
        assert_eq!(report.email, "admin@example.com");
        assert_eq!(report.outcome, crate::audit::AuditOutcome::Recorded);
        assert_eq!(data.rpc_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_switching_user_does_not_inherit_role() {
        let auth = Arc::new(MemoryAuthProvider::with_session_for("admin@example.com"));
        let data = Arc::new(MemoryDataClient::new());
        grant_admin(&data);
        let service = service(auth.clone(), data.clone());
        service.start().await;
        assert!(service.can_access(Feature::DataBackup));

        let gate = data.gate_lookup("stranger@example.com");
        auth.sign_in_as(Identity::with_email("stranger@example.com"))
            .await;
        wait_for(&service, |s| {
            s.identity.as_ref().and_then(|i| i.email.as_deref()) == Some("stranger@example.com")
        })
        .await;

        assert_ne!(service.route_decision(), RouteDecision::Allow);
        assert!(!service.can_access(Feature::DataBackup));
        assert_eq!(service.state().full_name, None);
        gate.add_permits(1);
    }

    #[tokio::test]
    async fn test_lookup_landing_after_sign_out_grants_nothing() {
        let auth = Arc::new(MemoryAuthProvider::new());
        let data = Arc::new(MemoryDataClient::new());
        grant_admin(&data);
        let service = service(auth.clone(), data.clone());
        service.start().await;

        let gate = data.gate_lookup("admin@example.com");
        auth.sign_in_as(Identity::with_email("admin@example.com"))
            .await;
        wait_for(&service, |s| s.identity.is_some()).await;

        service.sign_out().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        gate.add_permits(1);
        let snapshot = wait_for(&service, |s| s.authorization.role == UserRole::Admin).await;

        assert!(snapshot.identity.is_none());
        assert_eq!(service.route_decision(), RouteDecision::RedirectToLogin);
        assert!(!service.can_access(Feature::DataBackup));
        assert_eq!(
            service.require(Feature::DataBackup).unwrap_err().kind,
            ErrorKind::Authentication
        );
    }
}

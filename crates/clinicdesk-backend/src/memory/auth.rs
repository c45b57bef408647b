//! In-memory auth collaborator.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use tokio::sync::{RwLock, broadcast};
use tracing::info;
use uuid::Uuid;

use clinicdesk_core::error::AppError;
use clinicdesk_core::events::{AuthChangeEvent, AuthChangeKind};
use clinicdesk_core::result::AppResult;
use clinicdesk_core::traits::AuthProvider;
use clinicdesk_core::types::{Identity, ProviderRedirect, Session};

/// Buffer of the change-event channel.
const EVENT_BUFFER: usize = 32;

/// Auth collaborator keeping its session in memory.
#[derive(Debug)]
pub struct MemoryAuthProvider {
    /// Current session.
    session: RwLock<Option<Session>>,
    /// Change-event fan-out.
    events: broadcast::Sender<AuthChangeEvent>,
    /// Email → password for password sign-in.
    accounts: DashMap<String, String>,
    /// When set, the next `sign_out` fails without clearing the session.
    fail_sign_out: AtomicBool,
}

impl MemoryAuthProvider {
    /// Create a provider with no session.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            session: RwLock::new(None),
            events,
            accounts: DashMap::new(),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Create a provider that already holds a session for `email`.
    pub fn with_session_for(email: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            session: RwLock::new(Some(issue_session(Identity::with_email(email)))),
            events,
            accounts: DashMap::new(),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Register credentials accepted by `sign_in_with_password`.
    pub fn register_account(&self, email: &str, password: &str) {
        self.accounts.insert(email.to_string(), password.to_string());
    }

    /// Complete a sign-in for `identity`, as the provider callback would.
    pub async fn sign_in_as(&self, identity: Identity) -> Session {
        let session = issue_session(identity);
        self.replace(Some(session.clone()), AuthChangeKind::SignedIn)
            .await;
        session
    }

    /// Issue fresh tokens for the current user.
    pub async fn refresh(&self) -> AppResult<Session> {
        let user = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or_else(|| AppError::session("No session to refresh"))?;

        let session = issue_session(user);
        self.replace(Some(session.clone()), AuthChangeKind::TokenRefreshed)
            .await;
        Ok(session)
    }

    /// Make the next `sign_out` call fail.
    pub fn fail_next_sign_out(&self) {
        self.fail_sign_out.store(true, Ordering::SeqCst);
    }

    async fn replace(&self, session: Option<Session>, kind: AuthChangeKind) {
        *self.session.write().await = session.clone();
        let _ = self.events.send(AuthChangeEvent::new(kind, session));
    }
}

impl Default for MemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn issue_session(user: Identity) -> Session {
    Session {
        access_token: format!("memory-access-{}", Uuid::new_v4()),
        refresh_token: format!("memory-refresh-{}", Uuid::new_v4()),
        token_type: "bearer".to_string(),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        user,
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn current_session(&self) -> AppResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent> {
        self.events.subscribe()
    }

    async fn sign_in_with_provider(
        &self,
        provider: &str,
        redirect_to: &str,
    ) -> AppResult<ProviderRedirect> {
        if provider.trim().is_empty() {
            return Err(AppError::validation("Provider name must not be empty"));
        }
        Ok(ProviderRedirect {
            provider: provider.to_string(),
            url: format!("memory://authorize?provider={provider}&redirect_to={redirect_to}"),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let accepted = self
            .accounts
            .get(email)
            .is_some_and(|stored| stored.value() == password);
        if !accepted {
            return Err(AppError::authentication("Invalid login credentials"));
        }

        info!(email = %email, "Signed in");
        Ok(self.sign_in_as(Identity::with_email(email)).await)
    }

    async fn sign_out(&self) -> AppResult<()> {
        if self.fail_sign_out.swap(false, Ordering::SeqCst) {
            return Err(AppError::external("Sign-out rejected by auth service"));
        }
        self.replace(None, AuthChangeKind::SignedOut).await;
        Ok(())
    }
}

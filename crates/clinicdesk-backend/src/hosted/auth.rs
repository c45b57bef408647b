//! Hosted auth client: password and refresh grants, OAuth authorize URL,
//! logout, and local session persistence.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use clinicdesk_core::error::{AppError, ErrorKind};
use clinicdesk_core::events::{AuthChangeEvent, AuthChangeKind};
use clinicdesk_core::result::AppResult;
use clinicdesk_core::traits::{AuthProvider, PreferenceStore};
use clinicdesk_core::types::{Identity, ProviderRedirect, Session};

use super::http::HostedHttp;

/// Buffer of the change-event channel.
const EVENT_BUFFER: usize = 32;

/// Session payload returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: Identity,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .or_else(|| self.expires_in.map(|secs| now + Duration::seconds(secs)));

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at,
            user: self.user,
        }
    }
}

/// Auth client for the hosted backend.
///
/// The session is kept in the shared [`HostedHttp`] slot and mirrored to
/// the local preference store so a later process can restore it.
#[derive(Debug, Clone)]
pub struct HostedAuthProvider {
    /// Shared HTTP plumbing.
    http: HostedHttp,
    /// Local persistence for the session.
    preferences: Arc<dyn PreferenceStore>,
    /// Preference key holding the serialized session.
    session_key: String,
    /// Change-event fan-out.
    events: broadcast::Sender<AuthChangeEvent>,
}

impl HostedAuthProvider {
    /// Create the auth client.
    pub fn new(
        http: HostedHttp,
        preferences: Arc<dyn PreferenceStore>,
        session_key: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            http,
            preferences,
            session_key: session_key.into(),
            events,
        }
    }

    /// Exchange the refresh token of the current session for a new session.
    pub async fn refresh_session(&self) -> AppResult<Session> {
        let refresh_token = self
            .http
            .session_slot()
            .read()
            .await
            .as_ref()
            .map(|s| s.refresh_token.clone())
            .ok_or_else(|| AppError::session("No session to refresh"))?;

        let session = self.refresh_with(&refresh_token).await?;
        self.store(Some(session.clone()), AuthChangeKind::TokenRefreshed)
            .await?;
        Ok(session)
    }

    async fn refresh_with(&self, refresh_token: &str) -> AppResult<Session> {
        let url = format!("{}/token?grant_type=refresh_token", self.http.config().auth_url());
        let request = self
            .http
            .post(&url)
            .await
            .json(&serde_json::json!({ "refresh_token": refresh_token }));

        let response = self.http.send(request, ErrorKind::Session).await?;
        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid token response: {e}"),
                e,
            )
        })?;
        Ok(token.into_session(Utc::now()))
    }

    /// Replace the session, persist it and notify subscribers.
    async fn store(&self, session: Option<Session>, kind: AuthChangeKind) -> AppResult<()> {
        *self.http.session_slot().write().await = session.clone();

        match &session {
            Some(s) => {
                let json = serde_json::to_string(s)?;
                self.preferences.set(&self.session_key, &json).await?;
            }
            None => self.preferences.remove(&self.session_key).await?,
        }

        // No receivers is fine: nobody is watching yet.
        let _ = self.events.send(AuthChangeEvent::new(kind, session));
        Ok(())
    }

    /// Load a persisted session, refreshing it when the access token expired.
    async fn restore(&self) -> AppResult<Option<Session>> {
        let Some(json) = self.preferences.get(&self.session_key).await? else {
            return Ok(None);
        };

        let persisted: Session = match serde_json::from_str(&json) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted session");
                self.preferences.remove(&self.session_key).await?;
                return Ok(None);
            }
        };

        if !persisted.is_expired_at(Utc::now()) {
            *self.http.session_slot().write().await = Some(persisted.clone());
            debug!("Restored persisted session");
            return Ok(Some(persisted));
        }

        match self.refresh_with(&persisted.refresh_token).await {
            Ok(session) => {
                self.store(Some(session.clone()), AuthChangeKind::TokenRefreshed)
                    .await?;
                info!("Refreshed expired persisted session");
                Ok(Some(session))
            }
            Err(e) => {
                warn!(error = %e, "Persisted session expired and could not be refreshed");
                self.store(None, AuthChangeKind::SignedOut).await?;
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AuthProvider for HostedAuthProvider {
    async fn current_session(&self) -> AppResult<Option<Session>> {
        if let Some(session) = self.http.session_slot().read().await.clone() {
            return Ok(Some(session));
        }
        self.restore().await
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

        let base = format!("{}/authorize", self.http.config().auth_url());
        let mut url = reqwest::Url::parse(&base)
            .map_err(|e| AppError::configuration(format!("Invalid backend URL '{base}': {e}")))?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);

        info!(provider = %provider, "OAuth sign-in started");
        Ok(ProviderRedirect {
            provider: provider.to_string(),
            url: url.to_string(),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session> {
        let url = format!("{}/token?grant_type=password", self.http.config().auth_url());
        let request = self
            .http
            .post(&url)
            .await
            .json(&serde_json::json!({ "email": email, "password": password }));

        let response = self.http.send(request, ErrorKind::Authentication).await?;
        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid token response: {e}"),
                e,
            )
        })?;

        let session = token.into_session(Utc::now());
        self.store(Some(session.clone()), AuthChangeKind::SignedIn)
            .await?;
        info!(email = %email, "Signed in");
        Ok(session)
    }

    async fn sign_out(&self) -> AppResult<()> {
        let had_session = self.http.session_slot().read().await.is_some();

        let remote = if had_session {
            let url = format!("{}/logout", self.http.config().auth_url());
            let request = self.http.post(&url).await;
            self.http.send(request, ErrorKind::Session).await.map(|_| ())
        } else {
            Ok(())
        };

        // The local session is dropped even when the remote call failed.
        self.store(None, AuthChangeKind::SignedOut).await?;
        remote
    }
}

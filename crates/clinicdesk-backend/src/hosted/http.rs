//! Shared HTTP plumbing for the hosted auth and REST clients.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use tokio::sync::RwLock;

use clinicdesk_core::config::BackendConfig;
use clinicdesk_core::error::{AppError, ErrorKind};
use clinicdesk_core::result::AppResult;
use clinicdesk_core::types::Session;

/// HTTP client, project settings and the session slot shared by the
/// hosted auth and data clients.
///
/// The auth client writes the slot; the data client reads the access
/// token from it so row-level policies see the signed-in user.
#[derive(Debug, Clone)]
pub struct HostedHttp {
    /// Underlying HTTP client (connection pool).
    client: reqwest::Client,
    /// Project settings.
    config: BackendConfig,
    /// Current session, if signed in.
    session: Arc<RwLock<Option<Session>>>,
}

impl HostedHttp {
    /// Create a client for the given project.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Project settings.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Shared session slot.
    pub(crate) fn session_slot(&self) -> &Arc<RwLock<Option<Session>>> {
        &self.session
    }

    /// Start a GET request with the project headers.
    pub(crate) async fn get(&self, url: &str) -> RequestBuilder {
        self.with_headers(self.client.get(url)).await
    }

    /// Start a POST request with the project headers.
    pub(crate) async fn post(&self, url: &str) -> RequestBuilder {
        self.with_headers(self.client.post(url)).await
    }

    async fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone());

        builder
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }

    /// Send a request and map transport failures and error statuses.
    ///
    /// `failure_kind` is used for 4xx responses so that callers can tell a
    /// rejected credential from an unreachable backend.
    pub(crate) async fn send(
        &self,
        builder: RequestBuilder,
        failure_kind: ErrorKind,
    ) -> AppResult<Response> {
        let response = builder.send().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Backend request failed: {e}"),
                e,
            )
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| status.to_string());
        let kind = if status.is_client_error() {
            failure_kind
        } else {
            ErrorKind::ExternalService
        };

        Err(AppError::new(
            kind,
            format!("Backend returned {}: {message}", status.as_u16()),
        ))
    }
}

/// Error body shapes returned by the auth and REST endpoints.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extract the most specific message from an error body.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
}

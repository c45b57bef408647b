//! Session and identity issued by the auth collaborator.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::AppError;

/// The authenticated user's externally verified attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Provider-side user id, when the collaborator exposes one.
    #[serde(default)]
    pub id: Option<String>,
    /// Email address used as the authorization lookup key.
    #[serde(default)]
    pub email: Option<String>,
    /// Free-form provider metadata.
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl Identity {
    /// Create an identity carrying only an email.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: Some(email.into()),
            user_metadata: serde_json::Value::Null,
        }
    }

    /// Return the email if present and syntactically valid.
    pub fn validated_email(&self) -> Result<&str, AppError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::validation("Identity has no email"))?;

        if !email.validate_email() {
            return Err(AppError::validation(format!("Invalid email: '{email}'")));
        }

        Ok(email)
    }
}

/// Opaque token bundle. Replaced wholesale on every auth event.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated requests.
    pub access_token: String,
    /// Token used to obtain a new session.
    pub refresh_token: String,
    /// Token type, normally `bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// When the access token expires.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// The signed-in user.
    pub user: Identity,
}

impl Session {
    /// Whether the access token has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Where to send the user to complete an OAuth sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRedirect {
    /// Provider name, e.g. `google`.
    pub provider: String,
    /// Authorization URL.
    pub url: String,
}

//! Authentication and authorization configuration.

use serde::{Deserialize, Serialize};

/// Settings for the session bootstrap and role lookup flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Side table holding one authorization row per email.
    #[serde(default = "default_authorization_table")]
    pub authorization_table: String,
    /// Column of the authorization table matched against the identity email.
    #[serde(default = "default_email_column")]
    pub email_column: String,
    /// Remote procedure invoked (best effort) after a successful role lookup.
    #[serde(default = "default_audit_rpc")]
    pub audit_rpc: String,
    /// OAuth provider used when none is given explicitly.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Where the provider redirects after an OAuth sign-in.
    #[serde(default = "default_redirect_url")]
    pub redirect_url: String,
    /// Local preference key under which the session is persisted.
    #[serde(default = "default_session_key")]
    pub session_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            authorization_table: default_authorization_table(),
            email_column: default_email_column(),
            audit_rpc: default_audit_rpc(),
            default_provider: default_provider(),
            redirect_url: default_redirect_url(),
            session_key: default_session_key(),
        }
    }
}

fn default_authorization_table() -> String {
    "authorized_users".to_string()
}

fn default_email_column() -> String {
    "email".to_string()
}

fn default_audit_rpc() -> String {
    "log_user_login".to_string()
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_redirect_url() -> String {
    "http://localhost:5173/".to_string()
}

fn default_session_key() -> String {
    "clinicdesk.auth.session".to_string()
}

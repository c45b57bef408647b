//! Backend-as-a-service connection configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for the hosted backend (auth + REST + RPC).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    #[serde(default = "default_url")]
    pub url: String,
    /// Public (anonymous) API key sent with every request.
    #[serde(default)]
    pub anon_key: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            anon_key: String::new(),
        }
    }
}

impl BackendConfig {
    /// Base URL for the auth endpoints.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url.trim_end_matches('/'))
    }

    /// Base URL for the REST (row query and RPC) endpoints.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }
}

fn default_url() -> String {
    "http://localhost:54321".to_string()
}

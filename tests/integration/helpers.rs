//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use clinicdesk_auth::{AuthService, AuthSnapshot};
use clinicdesk_backend::{MemoryAuthProvider, MemoryDataClient};
use clinicdesk_core::config::AuthConfig;

/// Authorization table used by the default configuration.
pub const TABLE: &str = "authorized_users";

/// Test application context
pub struct TestApp {
    /// In-memory auth collaborator
    pub auth: Arc<MemoryAuthProvider>,
    /// In-memory data collaborator
    pub data: Arc<MemoryDataClient>,
    /// Service under test (not started)
    pub service: AuthService,
}

impl TestApp {
    /// Create a test application with no session
    pub fn new() -> Self {
        Self::with_auth(MemoryAuthProvider::new())
    }

    /// Create a test application already signed in as `email`
    pub fn signed_in_as(email: &str) -> Self {
        Self::with_auth(MemoryAuthProvider::with_session_for(email))
    }

    fn with_auth(auth: MemoryAuthProvider) -> Self {
        let auth = Arc::new(auth);
        let data = Arc::new(MemoryDataClient::new());
        let service = AuthService::new(auth.clone(), data.clone(), &AuthConfig::default());
        Self {
            auth,
            data,
            service,
        }
    }

    /// Insert an authorization row
    pub fn grant(&self, email: &str, role: &str, is_active: bool) {
        self.data.insert_row(
            TABLE,
            json!({
                "email": email,
                "role": role,
                "full_name": format!("Dr. {}", email.split('@').next().unwrap_or(email)),
                "is_active": is_active,
            }),
        );
    }

    /// Set `is_active` on the row for `email`
    pub fn set_active(&self, email: &str, is_active: bool) {
        self.data
            .update_where(TABLE, "email", email, json!({ "is_active": is_active }));
    }

    /// Wait until the published snapshot satisfies `check`
    pub async fn wait_for(&self, check: impl FnMut(&AuthSnapshot) -> bool) -> AuthSnapshot {
        let mut rx = self.service.subscribe();
        let snapshot = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(check))
            .await
            .expect("Timed out waiting for snapshot")
            .expect("Snapshot channel closed")
            .clone();
        snapshot
    }
}

//! Authorization side-table row.

use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// A row of the authorization table, keyed by email.
///
/// Extra columns returned by the backend (ids, timestamps) are ignored.
/// A row without `is_active` is treated as inactive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// Email the row applies to.
    pub email: String,
    /// Stored role.
    pub role: UserRole,
    /// Display name shown in the dashboard header.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Whether the row currently grants its role.
    #[serde(default)]
    pub is_active: bool,
}

impl AuthorizationRecord {
    /// Role this row actually grants.
    pub fn effective_role(&self) -> UserRole {
        if self.is_active {
            self.role
        } else {
            UserRole::Unauthorized
        }
    }

    /// Name this row actually exposes. Inactive rows expose none.
    pub fn effective_full_name(&self) -> Option<&str> {
        if self.is_active {
            self.full_name.as_deref()
        } else {
            None
        }
    }
}

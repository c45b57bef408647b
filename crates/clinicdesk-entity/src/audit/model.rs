//! Login audit payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserRole;

/// Arguments of the login audit remote procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginAudit {
    /// Email of the user who signed in.
    pub user_email: String,
    /// Role resolved for the login.
    pub user_role: UserRole,
    /// Display name, if the authorization row has one.
    pub user_name: Option<String>,
    /// When the role was resolved.
    pub occurred_at: DateTime<Utc>,
}

impl LoginAudit {
    /// Create an audit entry stamped with the current time.
    pub fn now(email: impl Into<String>, role: UserRole, full_name: Option<String>) -> Self {
        Self {
            user_email: email.into(),
            user_role: role,
            user_name: full_name,
            occurred_at: Utc::now(),
        }
    }
}

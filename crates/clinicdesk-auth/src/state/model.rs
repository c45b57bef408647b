//! Authorization state value types.

use serde::{Deserialize, Serialize};

use clinicdesk_core::types::Identity;
use clinicdesk_entity::user::{AuthorizationRecord, UserRole};

/// Role and display name resolved for the current identity.
///
/// `is_authorized` is computed from the role rather than stored, so it
/// cannot disagree with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
    /// Effective role.
    pub role: UserRole,
    /// Display name from the authorization row.
    pub full_name: Option<String>,
}

impl AuthorizationState {
    /// The deny state.
    pub fn unauthorized() -> Self {
        Self::default()
    }

    /// State granted by a looked-up row (inactive rows grant nothing).
    pub fn from_record(record: &AuthorizationRecord) -> Self {
        Self {
            role: record.effective_role(),
            full_name: record.effective_full_name().map(str::to_string),
        }
    }

    /// Whether the role passes the access gate.
    pub fn is_authorized(&self) -> bool {
        self.role.is_authorized()
    }
}

/// What observers see: identity, authorization and the loading flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSnapshot {
    /// Identity of the current session, if any.
    pub identity: Option<Identity>,
    /// Resolved authorization.
    pub authorization: AuthorizationState,
    /// True until the first session resolution has completed.
    pub loading: bool,
}

impl AuthSnapshot {
    /// Snapshot before anything has been resolved.
    pub fn initial() -> Self {
        Self {
            identity: None,
            authorization: AuthorizationState::unauthorized(),
            loading: true,
        }
    }

    /// Shorthand for `authorization.is_authorized()`.
    pub fn is_authorized(&self) -> bool {
        self.authorization.is_authorized()
    }
}

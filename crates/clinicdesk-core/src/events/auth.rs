//! Session change notifications from the auth collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Session;

/// The kind of session transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeKind {
    /// A session was restored when the subscription started.
    InitialSession,
    /// A user signed in.
    SignedIn,
    /// The user signed out.
    SignedOut,
    /// The access token was refreshed.
    TokenRefreshed,
    /// The user's attributes changed.
    UserUpdated,
}

/// A session transition, carrying the replacement session (if any).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthChangeEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub kind: AuthChangeKind,
    /// The new session; `None` after sign-out.
    pub session: Option<Session>,
}

impl AuthChangeEvent {
    /// Create a new change event.
    pub fn new(kind: AuthChangeKind, session: Option<Session>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind,
            session,
        }
    }

    /// Create a sign-out event.
    pub fn signed_out() -> Self {
        Self::new(AuthChangeKind::SignedOut, None)
    }
}

//! Role resolver: translates an authenticated email into an
//! [`AuthorizationState`] and audits the login.
//!
//! | Lookup result               | Role                  | Full name        |
//! |-----------------------------|-----------------------|------------------|
//! | no row / lookup error       | `unauthorized`        | none             |
//! | row, `is_active = false`    | `unauthorized`        | none             |
//! | row, `is_active = true`     | row's `role`          | row's `full_name`|

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use clinicdesk_core::config::AuthConfig;
use clinicdesk_core::error::AppError;
use clinicdesk_core::result::AppResult;
use clinicdesk_core::traits::DataClient;
use clinicdesk_core::types::Identity;
use clinicdesk_entity::audit::LoginAudit;
use clinicdesk_entity::user::AuthorizationRecord;

use crate::audit::AuditDispatcher;
use crate::state::AuthorizationState;

/// Outcome of one resolution, including the detached audit task (if any).
#[derive(Debug)]
pub struct Resolution {
    /// The resolved state.
    pub state: AuthorizationState,
    /// Handle of the audit call fired for an active row.
    pub audit: Option<JoinHandle<()>>,
}

/// Looks up authorization rows by email.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    /// Data collaborator.
    data: Arc<dyn DataClient>,
    /// Authorization table name.
    table: String,
    /// Column matched against the email.
    email_column: String,
    /// Login audit dispatcher.
    audit: AuditDispatcher,
}

impl RoleResolver {
    /// Creates a resolver for the configured table and audit procedure.
    pub fn new(data: Arc<dyn DataClient>, config: &AuthConfig) -> Self {
        let audit = AuditDispatcher::new(data.clone(), config.audit_rpc.clone());
        Self {
            data,
            table: config.authorization_table.clone(),
            email_column: config.email_column.clone(),
            audit,
        }
    }

    /// The login audit dispatcher.
    pub fn audit(&self) -> &AuditDispatcher {
        &self.audit
    }

    /// Resolves the state for an identity. Never fails: every error
    /// degrades to [`AuthorizationState::unauthorized`].
    pub async fn resolve(&self, identity: &Identity) -> AuthorizationState {
        self.resolve_detailed(identity).await.state
    }

    /// Like [`resolve`](Self::resolve), also returning the audit handle.
    pub async fn resolve_detailed(&self, identity: &Identity) -> Resolution {
        let email = match identity.validated_email() {
            Ok(email) => email,
            Err(e) => {
                warn!(error = %e, "Cannot resolve role without a valid email");
                return Resolution {
                    state: AuthorizationState::unauthorized(),
                    audit: None,
                };
            }
        };

        let record = match self.lookup(email).await {
            Ok(record) => record,
            Err(e) => {
                warn!(email = %email, error = %e, "Role lookup failed, denying access");
                None
            }
        };

        let Some(record) = record else {
            info!(email = %email, "No authorization record, denying access");
            return Resolution {
                state: AuthorizationState::unauthorized(),
                audit: None,
            };
        };

        let state = AuthorizationState::from_record(&record);
        if !record.is_active {
            info!(email = %email, stored_role = %record.role, "Authorization record inactive");
            return Resolution { state, audit: None };
        }

        info!(email = %email, role = %state.role, "Role resolved");
        let audit = self.audit.dispatch(LoginAudit::now(
            email,
            state.role,
            state.full_name.clone(),
        ));

        Resolution {
            state,
            audit: Some(audit),
        }
    }

    /// Fetches and decodes the row for `email`.
    pub async fn lookup(&self, email: &str) -> AppResult<Option<AuthorizationRecord>> {
        let row = self
            .data
            .fetch_one_eq(&self.table, &self.email_column, email)
            .await?;

        row.map(|value| {
            serde_json::from_value::<AuthorizationRecord>(value).map_err(|e| {
                AppError::validation(format!(
                    "Malformed row in '{}' for '{email}': {e}",
                    self.table
                ))
            })
        })
        .transpose()
    }
}

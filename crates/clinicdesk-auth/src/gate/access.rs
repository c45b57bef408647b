//! Access gate: the permit/redirect decision for guarded views.

use serde::{Deserialize, Serialize};

use clinicdesk_core::error::AppError;
use clinicdesk_entity::user::UserRole;

use crate::state::{AuthSnapshot, AuthorizationState};

use super::policies::{Feature, FeaturePolicies};

/// Action offered on the access-denied view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeniedAction {
    /// End the session.
    SignOut,
    /// Go back to the login view.
    ReturnToLogin,
}

/// What a guarded view should do with the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Still resolving; show a placeholder.
    Pending,
    /// Render the view.
    Allow,
    /// No session; go to the login view.
    RedirectToLogin,
    /// Signed in without access; go to the access-denied view.
    AccessDenied {
        /// Actions the denied view offers.
        actions: Vec<DeniedAction>,
    },
}

/// Evaluates authorization state for routing.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    /// Feature policy table.
    policies: FeaturePolicies,
}

impl AccessGate {
    /// Creates a gate with the default policies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gate with custom policies.
    pub fn with_policies(policies: FeaturePolicies) -> Self {
        Self { policies }
    }

    /// `role ≠ unauthorized`.
    pub fn is_authorized(state: &AuthorizationState) -> bool {
        state.is_authorized()
    }

    /// Decision for a view that only requires an authorized session.
    pub fn route(snapshot: &AuthSnapshot) -> RouteDecision {
        if snapshot.loading {
            RouteDecision::Pending
        } else if snapshot.identity.is_none() {
            RouteDecision::RedirectToLogin
        } else if !snapshot.is_authorized() {
            RouteDecision::AccessDenied {
                actions: vec![DeniedAction::SignOut, DeniedAction::ReturnToLogin],
            }
        } else {
            RouteDecision::Allow
        }
    }

    /// Decision for a view tied to a feature.
    pub fn route_feature(&self, snapshot: &AuthSnapshot, feature: Feature) -> RouteDecision {
        match Self::route(snapshot) {
            RouteDecision::Allow if !self.can_access(&snapshot.authorization.role, feature) => {
                RouteDecision::AccessDenied {
                    actions: vec![DeniedAction::SignOut, DeniedAction::ReturnToLogin],
                }
            }
            decision => decision,
        }
    }

    /// Whether `role` may open `feature`.
    pub fn can_access(&self, role: &UserRole, feature: Feature) -> bool {
        role.is_authorized() && self.policies.allows(role, &feature)
    }

    /// Whether the signed-in user of `snapshot` may open `feature`.
    ///
    /// A role without an identity (a lookup that landed after sign-out)
    /// grants nothing.
    pub fn permits(&self, snapshot: &AuthSnapshot, feature: Feature) -> bool {
        snapshot.identity.is_some() && self.can_access(&snapshot.authorization.role, feature)
    }

    /// Like [`permits`](Self::permits), as an error for `?` callers.
    pub fn require(&self, snapshot: &AuthSnapshot, feature: Feature) -> Result<(), AppError> {
        if snapshot.identity.is_none() {
            return Err(AppError::authentication(format!(
                "Sign in to access '{feature}'"
            )));
        }
        if self.can_access(&snapshot.authorization.role, feature) {
            Ok(())
        } else {
            Err(AppError::authorization(format!(
                "Role '{}' may not access '{feature}'",
                snapshot.authorization.role
            )))
        }
    }

    /// The policy table in use.
    pub fn policies(&self) -> &FeaturePolicies {
        &self.policies
    }
}

#[cfg(test)]
mod tests {
    use clinicdesk_core::error::ErrorKind;
    use clinicdesk_core::types::Identity;

    use crate::state::AuthorizationState;

    use super::*;

    fn snapshot(role: UserRole, signed_in: bool, loading: bool) -> AuthSnapshot {
        AuthSnapshot {
            identity: signed_in.then(|| Identity::with_email("someone@example.com")),
            authorization: AuthorizationState {
                role,
                full_name: None,
            },
            loading,
        }
    }

    #[test]
    fn test_route_decisions() {
        assert_eq!(
            AccessGate::route(&snapshot(UserRole::Admin, true, true)),
            RouteDecision::Pending
        );
        assert_eq!(
            AccessGate::route(&snapshot(UserRole::Unauthorized, false, false)),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(
            AccessGate::route(&snapshot(UserRole::Unauthorized, true, false)),
            RouteDecision::AccessDenied {
                actions: vec![DeniedAction::SignOut, DeniedAction::ReturnToLogin]
            }
        );
        assert_eq!(
            AccessGate::route(&snapshot(UserRole::Helper, true, false)),
            RouteDecision::Allow
        );
    }

    #[test]
    fn test_feature_routes() {
        let gate = AccessGate::new();
        let helper = snapshot(UserRole::Helper, true, false);
        assert_eq!(
            gate.route_feature(&helper, Feature::Patients),
            RouteDecision::Allow
        );
        assert!(matches!(
            gate.route_feature(&helper, Feature::Billing),
            RouteDecision::AccessDenied { .. }
        ));
        assert_eq!(
            gate.route_feature(&snapshot(UserRole::Admin, false, false), Feature::Billing),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn test_require() {
        let gate = AccessGate::new();
        assert!(
            gate.require(&snapshot(UserRole::Admin, true, false), Feature::DataBackup)
                .is_ok()
        );

        let err = gate
            .require(&snapshot(UserRole::Unauthorized, true, false), Feature::Dashboard)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[test]
    fn test_role_without_identity_grants_nothing() {
        let gate = AccessGate::new();
        let orphan = snapshot(UserRole::Admin, false, false);

        assert!(gate.can_access(&UserRole::Admin, Feature::DataBackup));
        assert!(!gate.permits(&orphan, Feature::DataBackup));
        assert_eq!(
            gate.require(&orphan, Feature::DataBackup).unwrap_err().kind,
            ErrorKind::Authentication
        );
    }
}

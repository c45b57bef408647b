//! Session status command and the shared status table.

use serde::Serialize;
use tabled::Tabled;

use clinicdesk_auth::{AuthService, AuthSnapshot, DeniedAction, RouteDecision};
use clinicdesk_core::error::AppError;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Status display row
#[derive(Debug, Serialize, Tabled)]
pub struct StatusRow {
    /// Signed-in email
    email: String,
    /// Effective role
    role: String,
    /// Display name
    full_name: String,
    /// Dashboard access
    access: String,
    /// Features open to the role
    features: String,
}

impl StatusRow {
    /// Build the row for a snapshot.
    pub fn new(service: &AuthService, snapshot: &AuthSnapshot) -> Self {
        let mut features: Vec<String> = service
            .gate()
            .policies()
            .features_for_role(&snapshot.authorization.role)
            .iter()
            .map(|f| f.to_string())
            .collect();
        features.sort();

        Self {
            email: snapshot
                .identity
                .as_ref()
                .and_then(|i| i.email.clone())
                .unwrap_or_else(|| "-".to_string()),
            role: snapshot.authorization.role.to_string(),
            full_name: snapshot
                .authorization
                .full_name
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            access: describe(&service.route_decision()),
            features: if features.is_empty() {
                "-".to_string()
            } else {
                features.join(", ")
            },
        }
    }
}

/// Human-readable routing decision.
pub fn describe(decision: &RouteDecision) -> String {
    match decision {
        RouteDecision::Pending => "pending".to_string(),
        RouteDecision::Allow => "allowed".to_string(),
        RouteDecision::RedirectToLogin => "sign-in required".to_string(),
        RouteDecision::AccessDenied { actions } => {
            let actions: Vec<&str> = actions
                .iter()
                .map(|a| match a {
                    DeniedAction::SignOut => "sign out",
                    DeniedAction::ReturnToLogin => "return to login",
                })
                .collect();
            format!("denied ({})", actions.join(" / "))
        }
    }
}

/// Print the current snapshot of `service`.
pub fn print_status(service: &AuthService, format: OutputFormat) {
    let snapshot = service.snapshot();
    output::print_item(&StatusRow::new(service, &snapshot), format);
}

/// Execute the status command
pub async fn execute(app: &App, format: OutputFormat) -> Result<(), AppError> {
    app.auth.start().await;
    print_status(&app.auth, format);
    Ok(())
}

//! Integration tests for the session → role → gate flow.

mod helpers;

use clinicdesk_auth::{AuditOutcome, AuthorizationState, RouteDecision};
use clinicdesk_core::error::ErrorKind;
use clinicdesk_core::traits::AuthProvider;
use clinicdesk_core::types::Identity;
use clinicdesk_entity::user::UserRole;

use helpers::TestApp;

#[tokio::test]
async fn test_missing_record_then_granted_on_refresh() {
    let app = TestApp::signed_in_as("doctor@example.com");

    let snapshot = app.service.start().await;
    assert_eq!(snapshot.authorization.role, UserRole::Unauthorized);
    assert!(!app.service.is_authorized());

    app.grant("doctor@example.com", "doctor", true);
    let state = app.service.refresh_user_role().await;

    assert_eq!(state.role, UserRole::Doctor);
    assert!(state.is_authorized());
    assert!(app.service.is_authorized());
    assert_eq!(app.service.route_decision(), RouteDecision::Allow);
}

#[tokio::test]
async fn test_deactivated_mid_session_is_demoted_on_refresh() {
    let app = TestApp::signed_in_as("helper@example.com");
    app.grant("helper@example.com", "helper", true);
    app.service.start().await;
    assert_eq!(app.service.state().role, UserRole::Helper);

    app.set_active("helper@example.com", false);
    let state = app.service.refresh_user_role().await;

    assert_eq!(state, AuthorizationState::unauthorized());
    assert!(app.service.identity().await.is_some());
    assert!(matches!(
        app.service.route_decision(),
        RouteDecision::AccessDenied { .. }
    ));
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let app = TestApp::signed_in_as("admin@example.com");
    app.grant("admin@example.com", "admin", true);
    app.service.start().await;

    let first = app.service.refresh_user_role().await;
    let second = app.service.refresh_user_role().await;
    assert_eq!(first, second);
    assert_eq!(second.full_name.as_deref(), Some("Dr. admin"));
}

#[tokio::test]
async fn test_sign_out_resets_role_and_name() {
    let app = TestApp::signed_in_as("admin@example.com");
    app.grant("admin@example.com", "admin", true);
    app.service.start().await;
    assert!(app.service.state().full_name.is_some());

    app.service.sign_out().await.unwrap();

    assert_eq!(app.service.state(), AuthorizationState::unauthorized());
    assert!(app.service.identity().await.is_none());
    assert_eq!(app.service.route_decision(), RouteDecision::RedirectToLogin);
}

#[tokio::test]
async fn test_sign_out_failure_is_returned_and_state_reset() {
    let app = TestApp::signed_in_as("patient@example.com");
    app.grant("patient@example.com", "patient", true);
    app.service.start().await;

    app.auth.fail_next_sign_out();
    let err = app.service.sign_out().await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::ExternalService);
    assert_eq!(app.service.state(), AuthorizationState::unauthorized());
    assert!(app.service.session().await.is_none());
}

#[tokio::test]
async fn test_lookup_outage_degrades_to_unauthorized() {
    let app = TestApp::signed_in_as("doctor@example.com");
    app.grant("doctor@example.com", "doctor", true);
    app.data.set_fail_lookups(true);

    app.service.start().await;
    assert_eq!(app.service.state(), AuthorizationState::unauthorized());
    assert!(!app.service.is_loading());

    app.data.set_fail_lookups(false);
    assert_eq!(app.service.refresh_user_role().await.role, UserRole::Doctor);
}

#[tokio::test]
async fn test_audit_failure_keeps_role() {
    let app = TestApp::new();
    app.grant("admin@example.com", "admin", true);
    app.data.set_fail_rpc(true);
    let mut reports = app.service.audit_reports();
    app.service.start().await;

    app.auth
        .sign_in_as(Identity::with_email("admin@example.com"))
        .await;
    let snapshot = app.wait_for(|s| s.authorization.role == UserRole::Admin).await;
    assert!(snapshot.is_authorized());

    let report = reports.recv().await.unwrap();
    assert_eq!(report.email, "admin@example.com");
    assert!(matches!(report.outcome, AuditOutcome::Failed(_)));
    assert_eq!(app.service.state().role, UserRole::Admin);
}

#[tokio::test]
async fn test_audit_payload() {
    let app = TestApp::signed_in_as("helper@example.com");
    app.grant("helper@example.com", "helper", true);
    let mut reports = app.service.audit_reports();

    app.service.start().await;
    let report = reports.recv().await.unwrap();
    assert_eq!(report.outcome, AuditOutcome::Recorded);

    let calls = app.data.rpc_calls().await;
    assert_eq!(calls.len(), 1);
    let (function, args) = &calls[0];
    assert_eq!(function, "log_user_login");
    assert_eq!(args["user_email"], "helper@example.com");
    assert_eq!(args["user_role"], "helper");
    assert_eq!(args["user_name"], "Dr. helper");
    assert!(args["occurred_at"].is_string());
    assert!(args.get("email").is_none());
}

#[tokio::test]
async fn test_second_user_waits_for_own_lookup() {
    let app = TestApp::signed_in_as("doctor@example.com");
    app.grant("doctor@example.com", "doctor", true);
    app.grant("helper@example.com", "helper", true);
    app.service.start().await;
    assert_eq!(app.service.state().role, UserRole::Doctor);

    let gate = app.data.gate_lookup("helper@example.com");
    app.auth
        .sign_in_as(Identity::with_email("helper@example.com"))
        .await;
    let pending = app
        .wait_for(|s| {
            s.identity.as_ref().and_then(|i| i.email.as_deref()) == Some("helper@example.com")
        })
        .await;
    assert_eq!(pending.authorization, AuthorizationState::unauthorized());
    assert_ne!(app.service.route_decision(), RouteDecision::Allow);

    gate.add_permits(1);
    let resolved = app.wait_for(|s| s.authorization.role == UserRole::Helper).await;
    assert_eq!(resolved.authorization.full_name.as_deref(), Some("Dr. helper"));
    assert_eq!(app.service.route_decision(), RouteDecision::Allow);
}

#[tokio::test]
async fn test_token_refresh_re_resolves_role() {
    let app = TestApp::signed_in_as("doctor@example.com");
    app.grant("doctor@example.com", "doctor", true);
    app.service.start().await;
    assert_eq!(app.service.state().role, UserRole::Doctor);

    app.set_active("doctor@example.com", false);
    app.auth.refresh().await.unwrap();

    let snapshot = app.wait_for(|s| !s.is_authorized()).await;
    assert!(snapshot.identity.is_some());
}

#[tokio::test]
async fn test_remote_sign_out_event_clears_state() {
    let app = TestApp::signed_in_as("doctor@example.com");
    app.grant("doctor@example.com", "doctor", true);
    app.service.start().await;

    // Sign-out initiated elsewhere (another tab, token revocation).
    app.auth.sign_out().await.unwrap();

    let snapshot = app.wait_for(|s| s.identity.is_none()).await;
    assert_eq!(snapshot.authorization, AuthorizationState::unauthorized());
    assert!(!snapshot.loading);
}

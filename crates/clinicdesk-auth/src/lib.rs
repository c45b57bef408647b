//! # clinicdesk-auth
//!
//! Authentication and authorization flow for the ClinicDesk dashboard.
//!
//! ## Modules
//!
//! - `session` — tracks the auth collaborator's session and reacts to changes
//! - `role` — resolves an identity's role from the authorization table
//! - `audit` — best-effort login audit as a detached task
//! - `state` — derived authorization state and the snapshot hub
//! - `listener` — explicit change-observer registration
//! - `gate` — access decisions and per-role feature policies
//! - `service` — the facade constructed once per process

pub mod audit;
pub mod gate;
pub mod listener;
pub mod role;
pub mod service;
pub mod session;
pub mod state;

pub use audit::{AuditDispatcher, AuditOutcome, AuditReport};
pub use gate::{AccessGate, DeniedAction, Feature, FeaturePolicies, RouteDecision};
pub use listener::{ListenerRegistry, Subscription};
pub use role::RoleResolver;
pub use service::AuthService;
pub use session::SessionStore;
pub use state::{AuthSnapshot, AuthStateHub, AuthorizationState};

//! Access gate and per-role feature policies.

pub mod access;
pub mod policies;

pub use access::{AccessGate, DeniedAction, RouteDecision};
pub use policies::{Feature, FeaturePolicies};

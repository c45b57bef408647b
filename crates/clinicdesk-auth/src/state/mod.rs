//! Derived authorization state and its publication.

pub mod hub;
pub mod model;

pub use hub::AuthStateHub;
pub use model::{AuthSnapshot, AuthorizationState};

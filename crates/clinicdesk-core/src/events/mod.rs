//! Events emitted by the external collaborators.

pub mod auth;

pub use auth::{AuthChangeEvent, AuthChangeKind};

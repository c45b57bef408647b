//! Shared value types exchanged with the external collaborators.

pub mod session;

pub use session::{Identity, ProviderRedirect, Session};

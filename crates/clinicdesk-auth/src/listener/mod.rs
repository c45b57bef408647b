//! Explicit change-observer registration.

pub mod registry;

pub use registry::{ListenerId, ListenerRegistry, Subscription};

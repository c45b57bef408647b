//! Session tracking.

pub mod store;

pub use store::SessionStore;

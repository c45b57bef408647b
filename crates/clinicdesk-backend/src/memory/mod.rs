//! In-process collaborators.
//!
//! Behave like the hosted services from the caller's point of view and add
//! hooks for injecting failures and holding lookups in flight.

pub mod auth;
pub mod data;

pub use auth::MemoryAuthProvider;
pub use data::MemoryDataClient;

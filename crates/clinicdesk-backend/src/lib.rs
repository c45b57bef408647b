//! # clinicdesk-backend
//!
//! Implementations of the collaborator traits from `clinicdesk-core`.
//!
//! ## Modules
//!
//! - `hosted` — HTTP clients for the hosted backend (auth and REST/RPC)
//! - `memory` — in-process auth and data collaborators for tests and offline use
//! - `local` — preference stores and the ambient theme signal

pub mod hosted;
pub mod local;
pub mod memory;

pub use hosted::{HostedAuthProvider, HostedDataClient, HostedHttp};
pub use local::{EnvThemeSignal, FilePreferenceStore, MemoryPreferenceStore};
pub use memory::{MemoryAuthProvider, MemoryDataClient};

//! # clinicdesk-core
//!
//! Core crate for ClinicDesk. Contains the collaborator traits (auth,
//! data, local persistence, ambient environment), configuration schemas,
//! session types issued by the auth collaborator, auth change events,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other ClinicDesk crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;

//! Best-effort login audit.

pub mod dispatcher;

pub use dispatcher::{AuditDispatcher, AuditOutcome, AuditReport};

//! User authorization entities.

pub mod record;
pub mod role;

pub use record::AuthorizationRecord;
pub use role::UserRole;

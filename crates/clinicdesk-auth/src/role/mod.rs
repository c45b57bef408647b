//! Role resolution.

pub mod resolver;

pub use resolver::{Resolution, RoleResolver};

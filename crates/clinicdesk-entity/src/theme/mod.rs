//! UI theme entities.

pub mod model;

pub use model::Theme;

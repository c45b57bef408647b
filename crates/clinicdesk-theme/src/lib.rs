//! # clinicdesk-theme
//!
//! Process-wide light/dark preference: restored from local persistence or
//! the ambient environment, applied as a mutually exclusive style marker.

pub mod markers;
pub mod store;

pub use markers::StyleMarkers;
pub use store::{ThemeSnapshot, ThemeStore};

//! Collaborator traits defined in `clinicdesk-core` and implemented by
//! `clinicdesk-backend` (hosted and in-memory) or by the host environment.

pub mod ambient;
pub mod auth;
pub mod data;
pub mod preferences;

pub use ambient::AmbientThemeSignal;
pub use auth::AuthProvider;
pub use data::DataClient;
pub use preferences::PreferenceStore;

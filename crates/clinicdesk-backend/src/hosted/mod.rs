//! Clients for the hosted backend-as-a-service.

pub mod auth;
pub mod http;
pub mod rest;

pub use auth::HostedAuthProvider;
pub use http::HostedHttp;
pub use rest::HostedDataClient;

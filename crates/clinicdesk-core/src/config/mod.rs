//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field has a default so a missing file still yields
//! a usable configuration.

pub mod auth;
pub mod backend;
pub mod backup;
pub mod logging;
pub mod preferences;
pub mod theme;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::backend::BackendConfig;
pub use self::backup::BackupConfig;
pub use self::logging::LoggingConfig;
pub use self::preferences::PreferencesConfig;
pub use self::theme::{AmbientMode, ThemeConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// (`default.toml` + environment overlay + `CLINICDESK__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend-as-a-service connection settings.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Session and role lookup settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Theme store settings.
    #[serde(default)]
    pub theme: ThemeConfig,
    /// Local preference persistence settings.
    #[serde(default)]
    pub preferences: PreferencesConfig,
    /// Backup command settings.
    #[serde(default)]
    pub backup: BackupConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config/` relative to the working directory.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from(Path::new("config"), env)
    }

    /// Load configuration from the given directory.
    ///
    /// Merges `default.toml` with a `{env}.toml` overlay and environment
    /// variables prefixed with `CLINICDESK__`.
    pub fn load_from(dir: &Path, env: &str) -> Result<Self, AppError> {
        let default_path = dir.join("default");
        let env_path = dir.join(env);

        let config = config::Config::builder()
            .add_source(config::File::with_name(&default_path.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&env_path.to_string_lossy()).required(false))
            .add_source(
                config::Environment::with_prefix("CLINICDESK")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

//! Theme preference configuration.

use serde::{Deserialize, Serialize};

/// How the ambient light/dark preference is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientMode {
    /// Inspect the host environment.
    Auto,
    /// Always report a light preference.
    Light,
    /// Always report a dark preference.
    Dark,
}

/// Theme store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Local preference key holding the persisted theme.
    #[serde(default = "default_preference_key")]
    pub preference_key: String,
    /// Source of the ambient preference used when nothing is persisted.
    #[serde(default = "default_ambient")]
    pub ambient: AmbientMode,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            preference_key: default_preference_key(),
            ambient: default_ambient(),
        }
    }
}

fn default_preference_key() -> String {
    "theme".to_string()
}

fn default_ambient() -> AmbientMode {
    AmbientMode::Auto
}

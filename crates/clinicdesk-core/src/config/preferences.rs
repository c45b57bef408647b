//! Local preference persistence configuration.

use serde::{Deserialize, Serialize};

/// Where local preferences (theme, persisted session) are stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Path of the JSON preference file.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> String {
    "data/preferences.json".to_string()
}

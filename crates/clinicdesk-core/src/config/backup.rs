//! Data backup configuration.

use serde::{Deserialize, Serialize};

/// Settings for the table export command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory receiving timestamped backup folders.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Tables exported by a backup run, in order.
    #[serde(default = "default_tables")]
    pub tables: Vec<String>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            tables: default_tables(),
        }
    }
}

fn default_output_dir() -> String {
    "backups".to_string()
}

fn default_tables() -> Vec<String> {
    [
        "patients",
        "appointments",
        "cases",
        "treatments",
        "billing",
        "authorized_users",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

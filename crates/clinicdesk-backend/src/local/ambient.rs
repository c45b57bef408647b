//! Ambient light/dark preference of the host environment.

use clinicdesk_core::config::AmbientMode;
use clinicdesk_core::traits::AmbientThemeSignal;

/// Reads the host preference from configuration or the terminal.
///
/// In `auto` mode the `COLORFGBG` variable (`"fg;bg"`, set by many
/// terminal emulators) decides: background colors 0–6 and 8 are dark.
#[derive(Debug, Clone)]
pub struct EnvThemeSignal {
    mode: AmbientMode,
}

impl EnvThemeSignal {
    /// Create a signal for the configured mode.
    pub fn new(mode: AmbientMode) -> Self {
        Self { mode }
    }
}

impl AmbientThemeSignal for EnvThemeSignal {
    fn prefers_dark(&self) -> bool {
        match self.mode {
            AmbientMode::Light => false,
            AmbientMode::Dark => true,
            AmbientMode::Auto => std::env::var("COLORFGBG")
                .ok()
                .and_then(|v| colorfgbg_is_dark(&v))
                .unwrap_or(false),
        }
    }
}

/// Interpret a `COLORFGBG` value. `None` when it cannot be parsed.
fn colorfgbg_is_dark(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(bg, 0..=6 | 8))
}

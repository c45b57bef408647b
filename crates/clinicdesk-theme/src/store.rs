//! Theme store: the in-memory theme, its persisted copy, and the applied
//! style marker.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use clinicdesk_core::config::ThemeConfig;
use clinicdesk_core::result::AppResult;
use clinicdesk_core::traits::{AmbientThemeSignal, PreferenceStore};
use clinicdesk_entity::theme::Theme;

use crate::markers::StyleMarkers;

/// Value published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeSnapshot {
    /// Current theme.
    pub theme: Theme,
    /// Applied style markers.
    pub markers: StyleMarkers,
    /// Whether a theme has been applied (by `mount` or a setter).
    pub mounted: bool,
}

/// Process-wide light/dark preference.
///
/// Until [`mount`](Self::mount) completes, [`theme`](Self::theme) reports
/// `light` and no marker is applied.
#[derive(Debug)]
pub struct ThemeStore {
    /// Local persistence.
    preferences: Arc<dyn PreferenceStore>,
    /// Host preference used when nothing valid is persisted.
    ambient: Arc<dyn AmbientThemeSignal>,
    /// Preference key.
    key: String,
    /// Current state.
    tx: watch::Sender<ThemeSnapshot>,
}

impl ThemeStore {
    /// Creates an unmounted store.
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        ambient: Arc<dyn AmbientThemeSignal>,
        config: &ThemeConfig,
    ) -> Self {
        let (tx, _) = watch::channel(ThemeSnapshot::default());
        Self {
            preferences,
            ambient,
            key: config.preference_key.clone(),
            tx,
        }
    }

    /// Restores the persisted theme, or the ambient one, and applies it.
    pub async fn mount(&self) -> Theme {
        let theme = match self.persisted().await {
            Some(theme) => {
                debug!(theme = %theme, "Restored persisted theme");
                theme
            }
            None if self.ambient.prefers_dark() => Theme::Dark,
            None => Theme::Light,
        };

        self.apply(theme);
        info!(theme = %theme, "Theme mounted");
        theme
    }

    /// The current theme.
    pub fn theme(&self) -> Theme {
        self.tx.borrow().theme
    }

    /// Whether a theme has been applied.
    pub fn is_mounted(&self) -> bool {
        self.tx.borrow().mounted
    }

    /// Currently applied style markers.
    pub fn markers(&self) -> StyleMarkers {
        self.tx.borrow().markers.clone()
    }

    /// Receiver notified on every theme change.
    pub fn subscribe(&self) -> watch::Receiver<ThemeSnapshot> {
        self.tx.subscribe()
    }

    /// Sets, applies and persists `theme`.
    ///
    /// The theme is applied even if persisting fails; the error is returned.
    pub async fn set_theme(&self, theme: Theme) -> AppResult<()> {
        self.apply(theme);
        if let Err(e) = self.preferences.set(&self.key, theme.as_str()).await {
            warn!(theme = %theme, error = %e, "Failed to persist theme");
            return Err(e);
        }
        info!(theme = %theme, "Theme changed");
        Ok(())
    }

    /// Switches to the other theme and returns it.
    pub async fn toggle_theme(&self) -> AppResult<Theme> {
        let theme = self.theme().toggled();
        self.set_theme(theme).await?;
        Ok(theme)
    }

    async fn persisted(&self) -> Option<Theme> {
        match self.preferences.get(&self.key).await {
            Ok(Some(value)) => match value.parse() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    warn!(error = %e, "Ignoring invalid persisted theme");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted theme");
                None
            }
        }
    }

    fn apply(&self, theme: Theme) {
        self.tx.send_modify(|state| {
            state.theme = theme;
            state.markers.apply(theme);
            state.mounted = true;
        });
    }
}

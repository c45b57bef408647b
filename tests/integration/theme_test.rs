//! Integration tests for the theme preference.

use std::sync::Arc;

use clinicdesk_backend::{EnvThemeSignal, FilePreferenceStore};
use clinicdesk_core::config::{AmbientMode, ThemeConfig};
use clinicdesk_entity::theme::Theme;
use clinicdesk_theme::ThemeStore;

fn store(path: &std::path::Path, ambient: AmbientMode) -> ThemeStore {
    ThemeStore::new(
        Arc::new(FilePreferenceStore::new(path)),
        Arc::new(EnvThemeSignal::new(ambient)),
        &ThemeConfig::default(),
    )
}

#[tokio::test]
async fn test_set_dark_is_seen_on_next_initialization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let first = store(&path, AmbientMode::Light);
    first.mount().await;
    first.set_theme(Theme::Dark).await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let prefs: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(prefs["theme"], "dark");

    let second = store(&path, AmbientMode::Light);
    assert_eq!(second.mount().await, Theme::Dark);
    assert!(second.markers().contains("dark"));
    assert!(!second.markers().contains("light"));
}

#[tokio::test]
async fn test_toggle_twice_is_identity() {
    let dir = tempfile::tempdir().unwrap();
    let theme = store(&dir.path().join("preferences.json"), AmbientMode::Dark);
    let original = theme.mount().await;

    theme.toggle_theme().await.unwrap();
    theme.toggle_theme().await.unwrap();

    assert_eq!(theme.theme(), original);
    assert_eq!(theme.markers().theme(), Some(original));
}

#[tokio::test]
async fn test_no_preference_file_uses_ambient() {
    let dir = tempfile::tempdir().unwrap();
    let theme = store(&dir.path().join("missing.json"), AmbientMode::Dark);

    assert_eq!(theme.theme(), Theme::Light);
    assert_eq!(theme.mount().await, Theme::Dark);
}

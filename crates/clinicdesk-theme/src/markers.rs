//! Style markers set on the document root.

use std::collections::BTreeSet;

use clinicdesk_entity::theme::Theme;

/// Marker names currently active on the root element.
///
/// Applying a theme removes the other theme's marker before adding its
/// own, so exactly one of `light`/`dark` is active once a theme was
/// applied. Unrelated markers are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMarkers {
    active: BTreeSet<String>,
}

impl StyleMarkers {
    /// Markers with nothing active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the theme marker to `theme`.
    pub fn apply(&mut self, theme: Theme) {
        self.active.remove(theme.toggled().as_str());
        self.active.insert(theme.as_str().to_string());
    }

    /// Add an unrelated marker.
    pub fn insert(&mut self, marker: impl Into<String>) {
        self.active.insert(marker.into());
    }

    /// Whether `marker` is active.
    pub fn contains(&self, marker: &str) -> bool {
        self.active.contains(marker)
    }

    /// The theme whose marker is active, if exactly one is.
    pub fn theme(&self) -> Option<Theme> {
        match (self.contains("light"), self.contains("dark")) {
            (true, false) => Some(Theme::Light),
            (false, true) => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Active markers in name order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_theme_marker() {
        let mut markers = StyleMarkers::new();
        assert_eq!(markers.theme(), None);

        for theme in [Theme::Dark, Theme::Light, Theme::Light, Theme::Dark] {
            markers.apply(theme);
            assert_eq!(markers.theme(), Some(theme));
            assert_ne!(markers.contains("light"), markers.contains("dark"));
        }
    }

    #[test]
    fn test_unrelated_markers_survive() {
        let mut markers = StyleMarkers::new();
        markers.insert("compact");
        markers.apply(Theme::Dark);
        markers.apply(Theme::Light);

        assert_eq!(markers.iter().collect::<Vec<_>>(), vec!["compact", "light"]);
    }
}

//! Ambient environment signal.

/// Host dark/light preference query.
pub trait AmbientThemeSignal: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the host environment prefers a dark appearance.
    fn prefers_dark(&self) -> bool;
}

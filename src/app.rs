//! Collaborator wiring shared by every command.

use std::sync::Arc;

use clinicdesk_auth::AuthService;
use clinicdesk_backend::{
    EnvThemeSignal, FilePreferenceStore, HostedAuthProvider, HostedDataClient, HostedHttp,
};
use clinicdesk_core::config::AppConfig;
use clinicdesk_core::traits::{DataClient, PreferenceStore};
use clinicdesk_theme::ThemeStore;

/// Everything a command needs, built once per invocation.
pub struct App {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Local preference file.
    pub preferences: Arc<dyn PreferenceStore>,
    /// Hosted REST/RPC client.
    pub data: Arc<dyn DataClient>,
    /// Auth facade (not started).
    pub auth: AuthService,
}

impl App {
    /// Build the hosted collaborators and the auth service.
    pub fn new(config: AppConfig) -> Self {
        let preferences: Arc<dyn PreferenceStore> =
            Arc::new(FilePreferenceStore::new(&config.preferences.path));
        let http = HostedHttp::new(config.backend.clone());
        let provider = Arc::new(HostedAuthProvider::new(
            http.clone(),
            preferences.clone(),
            config.auth.session_key.clone(),
        ));
        let data: Arc<dyn DataClient> = Arc::new(HostedDataClient::new(http));
        let auth = AuthService::new(provider, data.clone(), &config.auth);

        Self {
            config,
            preferences,
            data,
            auth,
        }
    }

    /// Theme store over the same preference file.
    pub fn theme_store(&self) -> ThemeStore {
        ThemeStore::new(
            self.preferences.clone(),
            Arc::new(EnvThemeSignal::new(self.config.theme.ambient)),
            &self.config.theme,
        )
    }
}

//! Auth collaborator trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::events::AuthChangeEvent;
use crate::result::AppResult;
use crate::types::{ProviderRedirect, Session};

/// The external authentication service.
///
/// Implementations own the session; consumers only read it and react to
/// change notifications.
#[async_trait]
pub trait AuthProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Return the current session, if any.
    async fn current_session(&self) -> AppResult<Option<Session>>;

    /// Subscribe to session transitions. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent>;

    /// Start an OAuth sign-in with the named provider.
    async fn sign_in_with_provider(
        &self,
        provider: &str,
        redirect_to: &str,
    ) -> AppResult<ProviderRedirect>;

    /// Sign in with email and password.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;

    /// End the current session.
    async fn sign_out(&self) -> AppResult<()>;
}

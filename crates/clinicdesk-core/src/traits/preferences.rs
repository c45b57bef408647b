//! Local persistence collaborator trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Key/value string preferences persisted on the local machine.
#[async_trait]
pub trait PreferenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read a preference. `None` if it was never set.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a preference, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a preference. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;
}

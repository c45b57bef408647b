//! Data collaborator trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::result::AppResult;

/// Row-level access to the hosted relational store.
///
/// Rows travel as JSON objects; callers decode them into their own types.
#[async_trait]
pub trait DataClient: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch at most one row where `column` equals `value`.
    async fn fetch_one_eq(&self, table: &str, column: &str, value: &str)
    -> AppResult<Option<Value>>;

    /// Fetch every row of a table.
    async fn fetch_all(&self, table: &str) -> AppResult<Vec<Value>>;

    /// Invoke a remote procedure with named JSON arguments.
    async fn call_rpc(&self, function: &str, args: Value) -> AppResult<Value>;
}

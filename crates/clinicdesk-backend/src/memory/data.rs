//! In-memory data collaborator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{Mutex, Semaphore};
use tracing::debug;

use clinicdesk_core::error::AppError;
use clinicdesk_core::result::AppResult;
use clinicdesk_core::traits::DataClient;

/// Tables of JSON rows held in memory.
#[derive(Debug, Default)]
pub struct MemoryDataClient {
    /// Table name → rows.
    tables: DashMap<String, Vec<Value>>,
    /// Every RPC invocation, in call order.
    rpc_calls: Mutex<Vec<(String, Value)>>,
    /// Lookup value → gate that must yield a permit before the lookup answers.
    gates: DashMap<String, Arc<Semaphore>>,
    /// When set, lookups fail as if the backend were unreachable.
    fail_lookups: AtomicBool,
    /// When set, RPC calls fail (after being recorded).
    fail_rpc: AtomicBool,
}

impl MemoryDataClient {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row to a table.
    pub fn insert_row(&self, table: &str, row: Value) {
        self.tables.entry(table.to_string()).or_default().push(row);
    }

    /// Merge `patch` into every row whose `column` equals `value`.
    ///
    /// Returns the number of rows changed.
    pub fn update_where(&self, table: &str, column: &str, value: &str, patch: Value) -> usize {
        let Some(mut rows) = self.tables.get_mut(table) else {
            return 0;
        };
        let Value::Object(patch) = patch else {
            return 0;
        };

        let mut changed = 0;
        for row in rows.iter_mut().filter(|r| column_matches(r, column, value)) {
            if let Value::Object(fields) = row {
                for (k, v) in &patch {
                    fields.insert(k.clone(), v.clone());
                }
                changed += 1;
            }
        }
        changed
    }

    /// Remove every row whose `column` equals `value`.
    pub fn delete_where(&self, table: &str, column: &str, value: &str) -> usize {
        let Some(mut rows) = self.tables.get_mut(table) else {
            return 0;
        };
        let before = rows.len();
        rows.retain(|r| !column_matches(r, column, value));
        before - rows.len()
    }

    /// Make lookups fail (or succeed again).
    pub fn set_fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make RPC calls fail (or succeed again).
    pub fn set_fail_rpc(&self, fail: bool) {
        self.fail_rpc.store(fail, Ordering::SeqCst);
    }

    /// Hold lookups for `value` until a permit is added to the returned gate.
    ///
    /// Each permit releases one lookup.
    pub fn gate_lookup(&self, value: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.insert(value.to_string(), gate.clone());
        gate
    }

    /// RPC invocations recorded so far.
    pub async fn rpc_calls(&self) -> Vec<(String, Value)> {
        self.rpc_calls.lock().await.clone()
    }
}

fn column_matches(row: &Value, column: &str, value: &str) -> bool {
    match row.get(column) {
        Some(Value::String(s)) => s == value,
        Some(other) => other.to_string() == value,
        None => false,
    }
}

#[async_trait]
impl DataClient for MemoryDataClient {
    async fn fetch_one_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> AppResult<Option<Value>> {
        let gate = self.gates.get(value).map(|g| g.value().clone());
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| AppError::external("Lookup gate closed"))?;
            permit.forget();
        }

        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::external(format!(
                "Lookup on '{table}' failed: backend unreachable"
            )));
        }

        let row = self.tables.get(table).and_then(|rows| {
            rows.iter()
                .find(|r| column_matches(r, column, value))
                .cloned()
        });
        debug!(table = %table, found = row.is_some(), "Memory row lookup");
        Ok(row)
    }

    async fn fetch_all(&self, table: &str) -> AppResult<Vec<Value>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::external(format!(
                "Select on '{table}' failed: backend unreachable"
            )));
        }
        Ok(self
            .tables
            .get(table)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    async fn call_rpc(&self, function: &str, args: Value) -> AppResult<Value> {
        self.rpc_calls
            .lock()
            .await
            .push((function.to_string(), args));

        if self.fail_rpc.load(Ordering::SeqCst) {
            return Err(AppError::external(format!("RPC '{function}' failed")));
        }
        Ok(Value::Null)
    }
}

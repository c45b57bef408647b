//! Hosted REST client: equality lookups, table export, and RPC calls.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use clinicdesk_core::error::{AppError, ErrorKind};
use clinicdesk_core::result::AppResult;
use clinicdesk_core::traits::DataClient;

use super::http::HostedHttp;

/// Row query client for the hosted relational store.
#[derive(Debug, Clone)]
pub struct HostedDataClient {
    /// Shared HTTP plumbing.
    http: HostedHttp,
}

impl HostedDataClient {
    /// Create the data client.
    pub fn new(http: HostedHttp) -> Self {
        Self { http }
    }

    /// Build a table URL with the given query pairs.
    fn table_url(&self, table: &str, pairs: &[(&str, &str)]) -> AppResult<String> {
        let base = format!("{}/{table}", self.http.config().rest_url());
        let mut url = reqwest::Url::parse(&base)
            .map_err(|e| AppError::configuration(format!("Invalid backend URL '{base}': {e}")))?;
        url.query_pairs_mut().extend_pairs(pairs);
        Ok(url.to_string())
    }
}

/// Build the equality filter value understood by the REST endpoint.
fn eq_filter(value: &str) -> String {
    format!("eq.{value}")
}

/// Decode an RPC response body. Void procedures answer with an empty body.
fn decode_rpc_body(body: &str) -> AppResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}

#[async_trait]
impl DataClient for HostedDataClient {
    async fn fetch_one_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
    ) -> AppResult<Option<Value>> {
        let filter = eq_filter(value);
        let url = self.table_url(
            table,
            &[(column, filter.as_str()), ("select", "*"), ("limit", "1")],
        )?;
        let request = self.http.get(&url).await;

        let response = self.http.send(request, ErrorKind::ExternalService).await?;
        let rows: Vec<Value> = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid rows from '{table}': {e}"),
                e,
            )
        })?;

        debug!(table = %table, column = %column, found = !rows.is_empty(), "Row lookup");
        Ok(rows.into_iter().next())
    }

    async fn fetch_all(&self, table: &str) -> AppResult<Vec<Value>> {
        let url = self.table_url(table, &[("select", "*")])?;
        let request = self.http.get(&url).await;

        let response = self.http.send(request, ErrorKind::ExternalService).await?;
        response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Invalid rows from '{table}': {e}"),
                e,
            )
        })
    }

    async fn call_rpc(&self, function: &str, args: Value) -> AppResult<Value> {
        let url = format!("{}/rpc/{function}", self.http.config().rest_url());
        let request = self.http.post(&url).await.json(&args);

        let response = self.http.send(request, ErrorKind::ExternalService).await?;
        let body = response.text().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                format!("Failed to read RPC '{function}' response: {e}"),
                e,
            )
        })?;
        decode_rpc_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eq_filter() {
        assert_eq!(eq_filter("doctor@example.com"), "eq.doctor@example.com");
    }

    #[test]
    fn test_table_url_encodes_filter() {
        let mut config = clinicdesk_core::config::BackendConfig::default();
        config.url = "https://clinic.example.co/".to_string();
        let client = HostedDataClient::new(HostedHttp::new(config));

        let url = client
            .table_url(
                "authorized_users",
                &[("email", "eq.a+b@example.com"), ("limit", "1")],
            )
            .unwrap();
        assert_eq!(
            url,
            "https://clinic.example.co/rest/v1/authorized_users?email=eq.a%2Bb%40example.com&limit=1"
        );
    }

    #[test]
    fn test_void_rpc_body_is_null() {
        assert_eq!(decode_rpc_body("").unwrap(), Value::Null);
        assert_eq!(decode_rpc_body("  \n").unwrap(), Value::Null);
        assert_eq!(
            decode_rpc_body(r#"{"logged":true}"#).unwrap(),
            serde_json::json!({ "logged": true })
        );
        assert!(decode_rpc_body("not json").is_err());
    }
}

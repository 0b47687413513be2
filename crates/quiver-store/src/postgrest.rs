//! PostgREST implementation of EntityStore
//!
//! This implementation talks to a Supabase-style PostgREST endpoint with a
//! service-role key. Row filters use the `id=eq.<id>` query syntax.

use crate::{EntityStore, StoreError, StoreResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;
use tracing::debug;

/// PostgREST implementation of EntityStore
///
/// Authenticates every request with the service-role key, which bypasses
/// row-level security the way the backend's other trusted functions do.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    /// Base URL of the backend, e.g. `https://project.supabase.co`
    base_url: String,

    /// Service-role key, sent as both `apikey` and bearer token
    service_key: String,

    /// HTTP client
    client: Client,
}

impl PostgrestStore {
    /// Create a new PostgrestStore instance
    pub fn new(base_url: String, service_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            client,
        }
    }

    /// Get the REST endpoint URL for a table
    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Get the REST root URL, used for health probes
    fn rest_root_url(&self) -> String {
        format!("{}/rest/v1/", self.base_url)
    }

    fn auth_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }
}

#[async_trait]
impl EntityStore for PostgrestStore {
    async fn fetch(&self, table: &str, field: &str, id: &str) -> StoreResult<Value> {
        debug!(%table, %field, %id, "Fetching entity field");

        let id_filter = format!("eq.{}", id);
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("id", id_filter.as_str()), ("select", field)])
            // Single-object representation: PostgREST answers 406 unless
            // exactly one row matches the filter.
            .header("Accept", "application/vnd.pgrst.object+json");

        let response = self
            .auth_headers(request)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_ACCEPTABLE {
            return Err(StoreError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StoreError::RequestFailed(format!(
                "Failed to fetch {} row {}: {} {}",
                table, id, status, error_body
            )));
        }

        let row: Value = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidPayload(e.to_string()))?;

        let fields = row.as_object().ok_or_else(|| {
            StoreError::InvalidPayload(format!("{} row {} is not an object", table, id))
        })?;

        match fields.get(field) {
            Some(value) => Ok(value.clone()),
            None => Err(StoreError::FieldMissing {
                table: table.to_string(),
                field: field.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn update(&self, table: &str, field: &str, id: &str, value: Value) -> StoreResult<()> {
        debug!(%table, %field, %id, "Updating entity field");

        let mut patch = serde_json::Map::new();
        patch.insert(field.to_string(), value);

        let id_filter = format!("eq.{}", id);
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&[("id", id_filter.as_str())])
            // return=representation makes a zero-row match observable: the
            // response body is an empty array instead of a bare 204.
            .header("Prefer", "return=representation")
            .json(&Value::Object(patch));

        let response = self
            .auth_headers(request)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(StoreError::RequestFailed(format!(
                "Failed to update {} row {}: {} {}",
                table, id, status, error_body
            )));
        }

        let rows: Value = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidPayload(e.to_string()))?;

        match rows.as_array() {
            Some(updated) if updated.is_empty() => Err(StoreError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            }),
            Some(_) => Ok(()),
            None => Err(StoreError::InvalidPayload(
                "Update response is not an array".to_string(),
            )),
        }
    }

    async fn health_check(&self) -> StoreResult<bool> {
        debug!("Performing entity store health check");

        let request = self.client.get(self.rest_root_url());
        let response = self
            .auth_headers(request)
            .send()
            .await
            .map_err(|e| StoreError::RequestFailed(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

//! Gemini implementation of the EmbeddingProvider
//!
//! This module provides integration with the Gemini embedContent API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error};

use super::EmbeddingProvider;
use crate::error::{ServerError, ServerResult};

/// Gemini implementation of EmbeddingProvider
#[derive(Debug, Clone)]
pub struct GeminiEmbeddingProvider {
    /// Base URL for the Gemini API
    api_base_url: String,

    /// Gemini API key
    api_key: String,

    /// Embedding model name
    model: String,

    /// Ceiling on a single embedContent call
    request_timeout: Duration,

    /// HTTP client
    client: Client,
}

/// Response shape of a successful embedContent call
#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<EmbeddingPayload>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingPayload {
    values: Option<Vec<f64>>,
}

impl GeminiEmbeddingProvider {
    /// Create a new GeminiEmbeddingProvider
    pub fn new(api_base_url: String, api_key: String, model: String, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            request_timeout,
            client,
        }
    }

    /// Get the embedContent URL for the configured model
    fn embed_content_url(&self) -> String {
        format!(
            "{}/models/{}:embedContent?key={}",
            self.api_base_url, self.model, self.api_key
        )
    }

    /// Get the models listing URL, used for health probes
    fn models_url(&self) -> String {
        format!("{}/models?key={}", self.api_base_url, self.api_key)
    }

    fn timeout_error(&self) -> ServerError {
        ServerError::ProviderTimeout {
            timeout_ms: self.request_timeout.as_millis() as u64,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> ServerResult<Vec<f64>> {
        debug!(model = %self.model, chars = text.chars().count(), "Requesting embedding");

        let body = json!({
            "model": self.model,
            "content": {
                "parts": [
                    { "text": text }
                ]
            },
            "taskType": "RETRIEVAL_DOCUMENT",
        });

        let response = self
            .client
            .post(self.embed_content_url())
            .header("Content-Type", "application/json")
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timeout_error()
                } else {
                    ServerError::ProviderError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // The provider wraps its detail in { error: { message } }; fall
            // back to the raw body when it does not.
            let detail = serde_json::from_str::<Value>(&error_body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                .unwrap_or(error_body);
            error!(%status, %detail, "Embedding request rejected");
            return Err(ServerError::ProviderError(format!("{}: {}", status, detail)));
        }

        let payload: EmbedContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error()
            } else {
                ServerError::ProviderBadResponse(e.to_string())
            }
        })?;

        let vector = payload
            .embedding
            .and_then(|e| e.values)
            .ok_or_else(|| {
                ServerError::ProviderBadResponse(
                    "Response is missing embedding.values".to_string(),
                )
            })?;

        if vector.is_empty() {
            return Err(ServerError::ProviderBadResponse(
                "Embedding vector is empty".to_string(),
            ));
        }

        debug!(dimension = vector.len(), "Embedding generated");
        Ok(vector)
    }

    async fn health_check(&self) -> ServerResult<bool> {
        debug!("Performing embedding provider health check");

        let response = self
            .client
            .get(self.models_url())
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| ServerError::ProviderError(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

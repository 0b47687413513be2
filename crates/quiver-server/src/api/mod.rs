//! API module for the Quiver embedding service
//!
//! This module contains the API routes and handlers for the service.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod errors;
pub mod health;

use crate::error::{ServerError, ServerResult};
use crate::server::EmbedServer;

/// Inbound embedding request body
///
/// Either `entity_type`/`entity_id` or the legacy `meeting_id` form; the
/// identifiers stay raw JSON values until normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Entity type, a member of the configured entity set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,

    /// Opaque entity identifier, string or number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Value>,

    /// Legacy identifier; implies `entity_type = "meeting"` and overrides
    /// the fields above
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<Value>,
}

/// Success acknowledgment for a generated embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedAck {
    /// Always true on the success path
    pub success: bool,
    /// Entity type the vector was written for
    pub entity_type: String,
    /// Normalized entity id
    pub entity_id: String,
    /// Dimensionality of the persisted vector
    pub embedding_dimension: usize,
}

/// Build the router for API endpoints
pub fn build_router(server: Arc<EmbedServer>) -> Router {
    Router::new()
        // Embedding generation
        .route("/", post(handle_generate_embedding))
        // Health check
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        // Shared state
        .with_state(server)
}

/// Permissive cross-origin policy, answering preflight requests in kind
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-client-info"),
            header::HeaderName::from_static("apikey"),
        ])
}

/// Handler for generating an entity embedding
async fn handle_generate_embedding(
    State(server): State<Arc<EmbedServer>>,
    body: Bytes,
) -> impl IntoResponse {
    let request = match parse_embed_request(&body) {
        Ok(request) => request,
        Err(err) => return errors::api_error_response(&err),
    };

    match server.generate_embedding(request).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(err) => errors::api_error_response(&err),
    }
}

/// Parse the raw body into an embedding request.
///
/// Parsed by hand rather than through the Json extractor so a malformed body
/// produces the same error envelope as every other rejection.
fn parse_embed_request(body: &Bytes) -> ServerResult<EmbedRequest> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ServerError::InvalidInput(format!("Request body is not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(ServerError::InvalidInput(
            "Request body must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| ServerError::InvalidInput(format!("Malformed request body: {}", e)))
}

// Re-export all modules for easier imports
pub use errors::*;
pub use health::*;

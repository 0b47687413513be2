//! Health check endpoint for the Quiver embedding service
//!
//! This module contains the health check handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::server::EmbedServer;

/// Health check handler
///
/// Reports basic liveness plus the status of the entity store and the
/// embedding provider.
pub async fn health_check(State(server): State<Arc<EmbedServer>>) -> impl IntoResponse {
    info!("Health check requested");

    let mut response = json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {},
    });

    // Check entity store
    let store_status = match server.check_store_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(_) => "DOWN",
    };
    response["dependencies"]["entityStore"] = json!({
        "status": store_status,
    });

    // Check embedding provider
    let provider_status = match server.check_provider_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(_) => "DOWN",
    };
    response["dependencies"]["embeddingProvider"] = json!({
        "status": provider_status,
    });

    // Determine overall status
    let overall_status = if store_status == "DOWN" || provider_status == "DOWN" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (overall_status, Json(response))
}

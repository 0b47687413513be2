//! Error handling for the Quiver service API
//!
//! This module contains standardized error handling for the API.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::error::ServerError;

/// General error response handler for API errors
///
/// Converts a ServerError into a standardized API error response: a JSON
/// envelope with a per-taxonomy status code and error code.
pub fn api_error_response(err: &ServerError) -> axum::response::Response {
    let (status_code, error_code) = match err {
        ServerError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "ERR_INVALID_INPUT"),
        ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "ERR_NOT_FOUND"),
        ServerError::EmptyContent(_) => (StatusCode::UNPROCESSABLE_ENTITY, "ERR_EMPTY_CONTENT"),
        ServerError::ProviderTimeout { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "ERR_PROVIDER_TIMEOUT")
        }
        ServerError::ProviderError(_) => (StatusCode::BAD_GATEWAY, "ERR_PROVIDER_ERROR"),
        ServerError::ProviderBadResponse(_) => {
            (StatusCode::BAD_GATEWAY, "ERR_PROVIDER_BAD_RESPONSE")
        }
        ServerError::StoreError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ERR_STORE_ERROR"),
        ServerError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ERR_CONFIG_ERROR"),
        ServerError::InternalError(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "ERR_INTERNAL_SERVER_ERROR")
        }
    };

    let error_message = format!("{}", err);

    // Create standardized error response
    let error_response = json!({
        "error": error_message,
        "errorDetails": {
            "errorCode": error_code,
            "errorMessage": error_message,
        }
    });

    (status_code, Json(error_response)).into_response()
}

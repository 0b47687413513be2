//! Error types for the Quiver embedding service
//!
//! This module contains the error types used throughout the server.

use quiver_store::StoreError;
use thiserror::Error;

/// Server error types
///
/// Every variant is terminal for the request that produced it; the service
/// performs no internal retries.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Request failed validation before any network or store call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// The entity's text field flattened to nothing
    #[error("Empty content: {0}")]
    EmptyContent(String),

    /// The embedding provider did not answer within the configured ceiling
    #[error("Embedding provider timed out after {timeout_ms}ms")]
    ProviderTimeout {
        /// Configured request ceiling in milliseconds
        timeout_ms: u64,
    },

    /// The embedding provider answered with a non-success status
    #[error("Embedding provider error: {0}")]
    ProviderError(String),

    /// The embedding provider answered 200 but without a usable vector
    #[error("Embedding provider returned a malformed response: {0}")]
    ProviderBadResponse(String),

    /// Entity store error
    #[error("Entity store error: {0}")]
    StoreError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

// Implement conversions from other error types
impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RowNotFound { table, id } => {
                ServerError::NotFound(format!("{} row {}", table, id))
            }
            StoreError::FieldMissing { table, field, id } => {
                ServerError::NotFound(format!("Field {} on {} row {}", field, table, id))
            }
            _ => ServerError::StoreError(format!("{}", err)),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::InvalidInput(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

impl ServerError {
    /// Check if the error was produced by the embedding provider
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            ServerError::ProviderTimeout { .. }
                | ServerError::ProviderError(_)
                | ServerError::ProviderBadResponse(_)
        )
    }

    /// Check if the error rejects the request itself rather than a collaborator
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServerError::InvalidInput(_) | ServerError::NotFound(_) | ServerError::EmptyContent(_)
        )
    }
}

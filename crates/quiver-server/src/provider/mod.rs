//! Embedding provider integration
//!
//! This module contains the embedding provider client and related functionality.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::ServerResult;

/// Interface for embedding provider operations
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate an embedding vector for a bounded piece of plain text.
    ///
    /// The returned vector is guaranteed non-empty; dimensionality is
    /// provider-defined.
    async fn embed(&self, text: &str) -> ServerResult<Vec<f64>>;

    /// Get health status
    async fn health_check(&self) -> ServerResult<bool>;
}

/// Re-export specific implementations
pub mod gemini;

pub use gemini::GeminiEmbeddingProvider;

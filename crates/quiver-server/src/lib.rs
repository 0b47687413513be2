//!
//! Quiver Server - Entity embedding service for the Quiver backend
//!
//! This module exports all the components of the embedding service.

// External dependencies
use std::sync::Arc;
use std::time::Duration;

/// API module
pub mod api;

/// Server module
pub mod server;

/// Entity registry module
pub mod entities;

/// Flattening module
pub mod flatten;

/// Embedding provider client module
pub mod provider;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

// Re-export key types
pub use config::ServerConfig;
pub use entities::{EntityConfig, EntityRegistry};
pub use error::{ServerError, ServerResult};
pub use server::EmbedServer;

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    // Initialize logging
    init_logging(&config);

    // Create dependencies
    let registry = EntityRegistry::from_config(&config)?;
    let store = create_store(&config)?;
    let provider = create_provider(&config)?;

    // Create server
    let server = EmbedServer::new(config, registry, store, provider);

    // Run server
    server.run().await
}

/// Initialize logging
///
/// A no-op when the binary already installed a subscriber.
fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // Create filter based on config
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Initialize subscriber
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

/// Create entity store client
pub fn create_store(config: &ServerConfig) -> ServerResult<Arc<dyn quiver_store::EntityStore>> {
    if config.store_url.starts_with("memory://") {
        // Use in-memory entity store for development and testing
        tracing::info!("Using in-memory entity store");
        Ok(Arc::new(quiver_store::InMemoryEntityStore::new()))
    } else if config.store_url.starts_with("http://") || config.store_url.starts_with("https://") {
        let service_key = config.store_service_key.clone().ok_or_else(|| {
            ServerError::ConfigError(
                "STORE_SERVICE_KEY is required for an HTTP entity store".to_string(),
            )
        })?;

        tracing::info!("Using PostgREST entity store at {}", config.store_url);
        let store = quiver_store::PostgrestStore::new(config.store_url.clone(), service_key);
        Ok(Arc::new(store))
    } else {
        Err(ServerError::ConfigError(format!(
            "Unsupported store URL: {}",
            config.store_url
        )))
    }
}

/// Create embedding provider client
pub fn create_provider(
    config: &ServerConfig,
) -> ServerResult<Arc<dyn provider::EmbeddingProvider>> {
    let api_key = config.provider_api_key.clone().ok_or_else(|| {
        ServerError::ConfigError("GEMINI_API_KEY is required to generate embeddings".to_string())
    })?;

    tracing::info!(
        "Using Gemini embedding provider with model {}",
        config.provider_model
    );
    let provider = provider::GeminiEmbeddingProvider::new(
        config.provider_api_url.clone(),
        api_key,
        config.provider_model.clone(),
        Duration::from_secs(config.provider_timeout_seconds),
    );
    Ok(Arc::new(provider))
}

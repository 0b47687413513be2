//! Main Quiver embedding server implementation
//!
//! This module contains the EmbedServer implementation: the request pipeline
//! from normalized entity reference to persisted vector.

use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

use quiver_store::EntityStore;

use crate::api::{EmbedAck, EmbedRequest};
use crate::config::ServerConfig;
use crate::entities::{EntityRef, EntityRegistry};
use crate::error::{ServerError, ServerResult};
use crate::flatten::{flatten, truncate_chars, MAX_EMBED_CHARS};
use crate::provider::EmbeddingProvider;

/// Main server implementation
#[derive(Clone)]
pub struct EmbedServer {
    /// Configuration
    pub config: ServerConfig,

    /// Entity type registry
    registry: EntityRegistry,

    /// Entity store client
    store: Arc<dyn EntityStore>,

    /// Embedding provider client
    provider: Arc<dyn EmbeddingProvider>,
}

/// Manual Debug implementation that doesn't try to debug the trait objects
impl std::fmt::Debug for EmbedServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbedServer")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}

impl EmbedServer {
    /// Create a new EmbedServer
    pub fn new(
        config: ServerConfig,
        registry: EntityRegistry,
        store: Arc<dyn EntityStore>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            config,
            registry,
            store,
            provider,
        }
    }

    /// Run the server
    pub async fn run(self) -> ServerResult<()> {
        info!("Starting Quiver embedding server");

        let bind_address = self.config.bind_address.clone();
        let port = self.config.port;

        // Build the API router
        let app = crate::api::build_router(Arc::new(self));

        // Create and bind the TCP listener
        let listener = TcpListener::bind((bind_address.as_str(), port)).await?;
        let addr: SocketAddr = listener.local_addr()?;
        info!("Listening on {}", addr);

        // Run the server
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::InternalError(e.to_string()))?;

        Ok(())
    }

    /// Generate and persist the embedding for one entity.
    ///
    /// The pipeline runs strictly in sequence: normalize, resolve config,
    /// fetch, flatten, bound, embed, persist. The store write never starts
    /// before the provider call has succeeded and been validated.
    pub async fn generate_embedding(&self, request: EmbedRequest) -> ServerResult<EmbedAck> {
        let entity = EntityRef::resolve(&request)?;

        let entity_config = self.registry.get(&entity.entity_type).ok_or_else(|| {
            ServerError::InvalidInput(format!(
                "Unknown entity_type {:?}, expected one of {:?}",
                entity.entity_type,
                self.registry.supported_types()
            ))
        })?;

        debug!(
            entity_type = %entity.entity_type,
            entity_id = %entity.entity_id,
            table = %entity_config.table,
            "Generating embedding"
        );

        let raw_content = self
            .store
            .fetch(
                &entity_config.table,
                &entity_config.text_field,
                &entity.entity_id,
            )
            .await?;

        let text = flatten(&raw_content);
        if text.trim().is_empty() {
            return Err(ServerError::EmptyContent(format!(
                "{} {} has no embeddable content in {}",
                entity.entity_type, entity.entity_id, entity_config.text_field
            )));
        }

        let text = truncate_chars(text, MAX_EMBED_CHARS);

        let vector = self.provider.embed(&text).await?;

        self.store
            .update(
                &entity_config.table,
                &entity_config.embedding_field,
                &entity.entity_id,
                json!(vector),
            )
            .await?;

        info!(
            entity_type = %entity.entity_type,
            entity_id = %entity.entity_id,
            dimension = vector.len(),
            "Embedding persisted"
        );

        Ok(EmbedAck {
            success: true,
            entity_type: entity.entity_type,
            entity_id: entity.entity_id,
            embedding_dimension: vector.len(),
        })
    }

    /// Check entity store health
    pub async fn check_store_health(&self) -> ServerResult<bool> {
        Ok(self.store.health_check().await?)
    }

    /// Check embedding provider health
    pub async fn check_provider_health(&self) -> ServerResult<bool> {
        self.provider.health_check().await
    }
}

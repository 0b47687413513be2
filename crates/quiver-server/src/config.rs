//! Configuration for the Quiver embedding service
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// URL of the entity store (`memory://local` or an https PostgREST base)
    pub store_url: String,

    /// Service-role key for the entity store
    #[serde(default)]
    pub store_service_key: Option<String>,

    /// Base URL of the embedding provider API
    #[serde(default = "default_provider_api_url")]
    pub provider_api_url: String,

    /// API key for the embedding provider
    #[serde(default)]
    pub provider_api_key: Option<String>,

    /// Embedding model name
    #[serde(default = "default_provider_model")]
    pub provider_model: String,

    /// Ceiling on a single provider call, in seconds
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_seconds: u64,

    /// JSON object of extra entity type descriptors, merged over the built-ins
    #[serde(default)]
    pub entity_config_json: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_provider_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1".to_string()
}

fn default_provider_model() -> String {
    "embedding-001".to_string()
}

fn default_provider_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        // Start with defaults
        let mut config = Self::default();

        // Override from environment variables
        if let Ok(port) = env::var("SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SERVER_PORT value: {}", port);
            }
        }

        if let Ok(host) = env::var("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Ok(store_url) = env::var("STORE_URL") {
            config.store_url = store_url;
        }

        if let Ok(service_key) = env::var("STORE_SERVICE_KEY") {
            config.store_service_key = Some(service_key);
        }

        if let Ok(provider_api_url) = env::var("PROVIDER_API_URL") {
            config.provider_api_url = provider_api_url;
        }

        if let Ok(api_key) = env::var("GEMINI_API_KEY") {
            config.provider_api_key = Some(api_key);
        }

        if let Ok(model) = env::var("PROVIDER_MODEL") {
            config.provider_model = model;
        }

        if let Ok(timeout) = env::var("PROVIDER_TIMEOUT_SECONDS") {
            if let Ok(seconds) = timeout.parse::<u64>() {
                config.provider_timeout_seconds = seconds;
            } else {
                warn!("Invalid PROVIDER_TIMEOUT_SECONDS value: {}", timeout);
            }
        }

        if let Ok(entity_config) = env::var("ENTITY_CONFIG_JSON") {
            if !entity_config.is_empty() {
                config.entity_config_json = Some(entity_config);
            }
        }

        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.log_level = log_level;
        }

        // Validate required fields
        if config.store_url.is_empty() {
            return Err(ServerError::ConfigError(
                "Store URL is required".to_string(),
            ));
        }

        if config.provider_timeout_seconds == 0 {
            return Err(ServerError::ConfigError(
                "Provider timeout must be at least one second".to_string(),
            ));
        }

        // Add warnings for missing optional fields
        if config.provider_api_key.is_none() {
            warn!("No GEMINI_API_KEY provided - embedding requests will fail!");
        }

        if config.store_url.starts_with("http") && config.store_service_key.is_none() {
            warn!("Using an HTTP entity store but no STORE_SERVICE_KEY provided in environment!");
        }

        info!("Loaded server configuration");
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            store_url: String::new(),
            store_service_key: None,
            provider_api_url: default_provider_api_url(),
            provider_api_key: None,
            provider_model: default_provider_model(),
            provider_timeout_seconds: default_provider_timeout(),
            entity_config_json: None,
            log_level: default_log_level(),
        }
    }
}

//! Entity type registry and request normalization
//!
//! Maps each supported entity type to the table and fields the embedding
//! pipeline reads and writes, and normalizes inbound identifiers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::api::EmbedRequest;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

/// Per-type descriptor: where an entity's text lives and where its vector goes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Backing table name
    pub table: String,
    /// Column holding the embeddable source content
    pub text_field: String,
    /// Column the embedding vector is written to
    pub embedding_field: String,
}

/// Registry of supported entity types
///
/// Built once at startup and immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    configs: HashMap<String, EntityConfig>,
}

impl EntityRegistry {
    /// Registry with the built-in meeting, task, and ticket types
    pub fn builtin() -> Self {
        let mut configs = HashMap::new();
        configs.insert(
            "meeting".to_string(),
            EntityConfig {
                table: "meetings".to_string(),
                text_field: "meeting_summary_json".to_string(),
                embedding_field: "summary_embedding".to_string(),
            },
        );
        configs.insert(
            "task".to_string(),
            EntityConfig {
                table: "tasks".to_string(),
                text_field: "description".to_string(),
                embedding_field: "description_embedding".to_string(),
            },
        );
        configs.insert(
            "ticket".to_string(),
            EntityConfig {
                table: "tickets".to_string(),
                text_field: "description".to_string(),
                embedding_field: "description_embedding".to_string(),
            },
        );
        Self { configs }
    }

    /// Build the registry from configuration: built-ins plus any overrides
    /// carried in `entity_config_json`
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let mut registry = Self::builtin();

        if let Some(extra) = &config.entity_config_json {
            let overrides: HashMap<String, EntityConfig> = serde_json::from_str(extra)
                .map_err(|e| {
                    ServerError::ConfigError(format!("Invalid ENTITY_CONFIG_JSON: {}", e))
                })?;
            for (entity_type, entity_config) in overrides {
                registry.configs.insert(entity_type, entity_config);
            }
        }

        Ok(registry)
    }

    /// Look up the descriptor for an entity type
    pub fn get(&self, entity_type: &str) -> Option<&EntityConfig> {
        self.configs.get(entity_type)
    }

    /// The supported entity types, for error messages
    pub fn supported_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.configs.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// A normalized (entity_type, entity_id) pair
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    /// Validated member of the configured entity set
    pub entity_type: String,
    /// Opaque identifier, always a string after normalization
    pub entity_id: String,
}

impl EntityRef {
    /// Normalize a request into an entity reference.
    ///
    /// A legacy `meeting_id` field, when present and non-null, overrides
    /// `entity_type`/`entity_id`. Membership of the type in the registry is
    /// checked separately so the error message can name the supported set.
    pub fn resolve(request: &EmbedRequest) -> ServerResult<Self> {
        if let Some(meeting_id) = request.meeting_id.as_ref().filter(|v| !v.is_null()) {
            let entity_id = normalize_id(meeting_id).ok_or_else(|| {
                ServerError::InvalidInput(
                    "meeting_id must be a non-empty string or a number".to_string(),
                )
            })?;
            return Ok(Self {
                entity_type: "meeting".to_string(),
                entity_id,
            });
        }

        let entity_type = request
            .entity_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServerError::InvalidInput("entity_type is required".to_string()))?;

        let raw_id = request
            .entity_id
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or_else(|| ServerError::InvalidInput("entity_id is required".to_string()))?;

        let entity_id = normalize_id(raw_id).ok_or_else(|| {
            ServerError::InvalidInput(
                "entity_id must be a non-empty string or a number".to_string(),
            )
        })?;

        Ok(Self {
            entity_type: entity_type.to_string(),
            entity_id,
        })
    }
}

/// Normalize an opaque identifier to its string form.
///
/// Strings pass through, numbers take their JSON rendering, everything else
/// (booleans, arrays, objects) is rejected.
fn normalize_id(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

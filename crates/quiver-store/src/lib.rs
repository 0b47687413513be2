//! Quiver Entity Store
//!
//! Provides abstractions and implementations for row-level entity storage.
//! The EntityStore trait defines a contract for reading a single field from
//! an entity row and writing a computed value back onto it.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors produced by entity store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matched the requested id
    #[error("No {table} row found with id {id}")]
    RowNotFound {
        /// Table that was queried
        table: String,
        /// Row id that did not match
        id: String,
    },

    /// The row exists but does not carry the requested field
    #[error("Field {field} not present on {table} row {id}")]
    FieldMissing {
        /// Table that was queried
        table: String,
        /// Field that was selected
        field: String,
        /// Row id that matched
        id: String,
    },

    /// Transport-level failure (connection, permission, backend fault)
    #[error("Store request failed: {0}")]
    RequestFailed(String),

    /// The backend answered with a payload the client cannot interpret
    #[error("Store returned unexpected payload: {0}")]
    InvalidPayload(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Result type for EntityStore operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait defining the contract for entity storage implementations
///
/// Implementations expose exactly the two row operations the embedding
/// pipeline needs: read one field from one row, and write one field on one
/// row. Credentials and connection management belong to the implementation.
#[async_trait]
pub trait EntityStore: Send + Sync + std::fmt::Debug {
    /// Read the named field from exactly one row of `table`.
    ///
    /// Returns the field's raw JSON value. A present-but-null column comes
    /// back as `Value::Null`; an absent column is `FieldMissing`.
    async fn fetch(&self, table: &str, field: &str, id: &str) -> StoreResult<Value>;

    /// Write `value` into the named field of exactly one row of `table`.
    async fn update(&self, table: &str, field: &str, id: &str, value: Value) -> StoreResult<()>;

    /// Get health status of the backing service
    async fn health_check(&self) -> StoreResult<bool>;
}

pub mod memory;
pub mod postgrest;

pub use memory::InMemoryEntityStore;
pub use postgrest::PostgrestStore;

//! In-memory implementation of EntityStore
//!
//! This implementation is primarily intended for testing and development purposes.

use crate::{EntityStore, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of EntityStore
///
/// Rows live in nested maps keyed by table name and row id. All data is lost
/// when the instance is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntityStore {
    tables: Arc<RwLock<HashMap<String, HashMap<String, Value>>>>,
}

impl InMemoryEntityStore {
    /// Create a new in-memory entity store
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a row into a table, replacing any existing row with the same id.
    ///
    /// `row` must be a JSON object; its keys are the row's fields.
    pub async fn insert_row(&self, table: &str, id: &str, row: Value) {
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), row);
    }

    /// Snapshot a full row, mainly for assertions in tests
    pub async fn get_row(&self, table: &str, id: &str) -> Option<Value> {
        let tables = self.tables.read().await;
        tables.get(table).and_then(|rows| rows.get(id)).cloned()
    }
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn fetch(&self, table: &str, field: &str, id: &str) -> StoreResult<Value> {
        let tables = self.tables.read().await;

        let row = tables
            .get(table)
            .and_then(|rows| rows.get(id))
            .ok_or_else(|| StoreError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;

        match row.get(field) {
            Some(value) => Ok(value.clone()),
            None => Err(StoreError::FieldMissing {
                table: table.to_string(),
                field: field.to_string(),
                id: id.to_string(),
            }),
        }
    }

    async fn update(&self, table: &str, field: &str, id: &str, value: Value) -> StoreResult<()> {
        let mut tables = self.tables.write().await;

        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.get_mut(id))
            .ok_or_else(|| StoreError::RowNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;

        match row.as_object_mut() {
            Some(fields) => {
                fields.insert(field.to_string(), value);
                Ok(())
            }
            None => Err(StoreError::InvalidPayload(format!(
                "{} row {} is not an object",
                table, id
            ))),
        }
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};

use quiver_server::{
    api::EmbedRequest, EmbedServer, EntityRegistry, ServerConfig, ServerError,
};
use quiver_store::{memory::InMemoryEntityStore, EntityStore, StoreError};

// Mock the embedding provider
mock! {
    #[derive(Debug)]
    pub Provider {}

    #[async_trait]
    impl quiver_server::provider::EmbeddingProvider for Provider {
        async fn embed(&self, text: &str) -> Result<Vec<f64>, ServerError>;
        async fn health_check(&self) -> Result<bool, ServerError>;
    }
}

// Mock the entity store
mock! {
    #[derive(Debug)]
    pub Store {}

    #[async_trait]
    impl EntityStore for Store {
        async fn fetch(&self, table: &str, field: &str, id: &str) -> Result<Value, StoreError>;
        async fn update(&self, table: &str, field: &str, id: &str, value: Value) -> Result<(), StoreError>;
        async fn health_check(&self) -> Result<bool, StoreError>;
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        bind_address: "127.0.0.1".to_string(),
        store_url: "memory://test".to_string(),
        provider_api_key: Some("test-api-key".to_string()),
        log_level: "debug".to_string(),
        ..ServerConfig::default()
    }
}

// Helper to create a test server around an in-memory store
fn create_test_server(provider: MockProvider) -> (EmbedServer, Arc<InMemoryEntityStore>) {
    let store = Arc::new(InMemoryEntityStore::new());
    let server = EmbedServer::new(
        test_config(),
        EntityRegistry::builtin(),
        store.clone(),
        Arc::new(provider),
    );
    (server, store)
}

fn embed_request(body: Value) -> EmbedRequest {
    serde_json::from_value(body).unwrap()
}

#[tokio::test]
async fn test_unknown_entity_type_makes_no_calls() {
    // Mocks with no expectations: any store or provider call panics.
    let server = EmbedServer::new(
        test_config(),
        EntityRegistry::builtin(),
        Arc::new(MockStore::new()),
        Arc::new(MockProvider::new()),
    );

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "widget", "entity_id": 1 })))
        .await
        .unwrap_err();

    match err {
        ServerError::InvalidInput(msg) => assert!(msg.contains("widget")),
        other => panic!("Expected InvalidInput, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_identifiers_make_no_calls() {
    let server = EmbedServer::new(
        test_config(),
        EntityRegistry::builtin(),
        Arc::new(MockStore::new()),
        Arc::new(MockProvider::new()),
    );

    let err = server
        .generate_embedding(embed_request(json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::InvalidInput(_)));
}

#[tokio::test]
async fn test_task_embedding_end_to_end() {
    let mut provider = MockProvider::new();
    provider
        .expect_embed()
        .withf(|text| text == "Fix bug")
        .times(1)
        .returning(|_| Ok(vec![0.1, 0.2]));

    let (server, store) = create_test_server(provider);
    store
        .insert_row("tasks", "42", json!({ "description": "Fix bug" }))
        .await;

    let ack = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap();

    assert!(ack.success);
    assert_eq!(ack.entity_type, "task");
    assert_eq!(ack.entity_id, "42");
    assert_eq!(ack.embedding_dimension, 2);

    let row = store.get_row("tasks", "42").await.unwrap();
    assert_eq!(row["description_embedding"], json!([0.1, 0.2]));
}

#[tokio::test]
async fn test_legacy_meeting_id_flattens_summary() {
    let mut provider = MockProvider::new();
    provider
        .expect_embed()
        .withf(|text| text.contains("ship v2") && text.contains("Roadmap"))
        .times(1)
        .returning(|_| Ok(vec![0.5; 8]));

    let (server, store) = create_test_server(provider);
    store
        .insert_row(
            "meetings",
            "7",
            json!({
                "meeting_summary_json": {
                    "topics": [{ "title": "Roadmap", "points": ["ship v2"] }]
                }
            }),
        )
        .await;

    let ack = server
        .generate_embedding(embed_request(json!({ "meeting_id": 7 })))
        .await
        .unwrap();

    assert_eq!(ack.entity_type, "meeting");
    assert_eq!(ack.entity_id, "7");

    let row = store.get_row("meetings", "7").await.unwrap();
    assert_eq!(row["summary_embedding"], json!(vec![0.5; 8]));
}

#[tokio::test]
async fn test_empty_content_skips_provider() {
    // No provider expectations: an embed call would panic.
    let (server, store) = create_test_server(MockProvider::new());
    store
        .insert_row("tasks", "42", json!({ "description": "   " }))
        .await;

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::EmptyContent(_)));
}

#[tokio::test]
async fn test_null_field_is_empty_content() {
    let (server, store) = create_test_server(MockProvider::new());
    store
        .insert_row("tasks", "42", json!({ "description": null }))
        .await;

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::EmptyContent(_)));
}

#[tokio::test]
async fn test_missing_row_is_not_found() {
    let (server, _store) = create_test_server(MockProvider::new());

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::NotFound(_)));
}

#[tokio::test]
async fn test_missing_field_is_not_found() {
    let (server, store) = create_test_server(MockProvider::new());
    store.insert_row("tasks", "42", json!({ "title": "x" })).await;

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::NotFound(_)));
}

#[tokio::test]
async fn test_long_text_is_bounded_before_provider_call() {
    let mut provider = MockProvider::new();
    provider
        .expect_embed()
        .withf(|text| text.chars().count() == 8000)
        .times(1)
        .returning(|_| Ok(vec![0.1]));

    let (server, store) = create_test_server(provider);
    store
        .insert_row("tasks", "42", json!({ "description": "a".repeat(9000) }))
        .await;

    server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_provider_timeout_skips_store_write() {
    let mut provider = MockProvider::new();
    provider
        .expect_embed()
        .times(1)
        .returning(|_| Err(ServerError::ProviderTimeout { timeout_ms: 15000 }));

    let (server, store) = create_test_server(provider);
    store
        .insert_row("tasks", "42", json!({ "description": "Fix bug" }))
        .await;

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::ProviderTimeout { .. }));

    let row = store.get_row("tasks", "42").await.unwrap();
    assert!(row.get("description_embedding").is_none());
}

#[tokio::test]
async fn test_provider_bad_response_skips_store_write() {
    let mut provider = MockProvider::new();
    provider
        .expect_embed()
        .times(1)
        .returning(|_| Err(ServerError::ProviderBadResponse("no values".to_string())));

    let (server, store) = create_test_server(provider);
    store
        .insert_row("tasks", "42", json!({ "description": "Fix bug" }))
        .await;

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::ProviderBadResponse(_)));

    let row = store.get_row("tasks", "42").await.unwrap();
    assert!(row.get("description_embedding").is_none());
}

#[tokio::test]
async fn test_store_write_failure_surfaces_as_store_error() {
    let mut provider = MockProvider::new();
    provider
        .expect_embed()
        .times(1)
        .returning(|_| Ok(vec![0.1, 0.2]));

    let mut store = MockStore::new();
    store
        .expect_fetch()
        .times(1)
        .returning(|_, _, _| Ok(json!("Fix bug")));
    store
        .expect_update()
        .times(1)
        .returning(|_, _, _, _| Err(StoreError::RequestFailed("connection reset".to_string())));

    let server = EmbedServer::new(
        test_config(),
        EntityRegistry::builtin(),
        Arc::new(store),
        Arc::new(provider),
    );

    let err = server
        .generate_embedding(embed_request(json!({ "entity_type": "task", "entity_id": 42 })))
        .await
        .unwrap_err();

    match err {
        ServerError::StoreError(msg) => assert!(msg.contains("connection reset")),
        other => panic!("Expected StoreError, got {:?}", other),
    }
}

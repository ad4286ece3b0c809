//! Integration tests for common Elastiq workflows.
//!
//! These tests run schema, migration and document workflows end to end
//! against the in-memory store.

use async_trait::async_trait;
use elastiq::orm::memory::StoreOperation;
use elastiq::orm::{Migration, MigrationReport, Schema, StoreRequest};
use elastiq::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

type OrmResult<T> = elastiq::orm::Result<T>;

// =============================================================================
// Migrations
// =============================================================================

struct CreateUsers;

#[async_trait]
impl Migration for CreateUsers {
    fn name(&self) -> &str {
        "2024_01_01_000000_create_users"
    }

    async fn up(&self, schema: &Schema) -> OrmResult<()> {
        let mut mapping = Mapping::new("users");
        mapping.shards(1).replicas(0);
        mapping.keyword("id");
        mapping.keyword("email");
        mapping.text("name").analyzer("standard");
        mapping.integer("age");
        mapping.geo_point("location");

        let addresses = mapping.nested("addresses");
        addresses.keyword("city");
        addresses.keyword("zip");

        schema.create(&mapping).await.map(|_| ())
    }

    async fn down(&self, schema: &Schema) -> OrmResult<()> {
        schema.drop("users").await.map(|_| ())
    }
}

struct AddNickname;

#[async_trait]
impl Migration for AddNickname {
    fn name(&self) -> &str {
        "2024_02_01_000000_add_nickname"
    }

    async fn up(&self, schema: &Schema) -> OrmResult<()> {
        let mut mapping = Mapping::new("users");
        mapping.keyword("nickname");
        schema.update(&mapping).await.map(|_| ())
    }

    async fn down(&self, _schema: &Schema) -> OrmResult<()> {
        Ok(())
    }
}

async fn migrated() -> (Arc<MemoryStore>, Repository, MigrationReport) {
    let store = Arc::new(MemoryStore::new());
    let repository = Repository::new(store.clone());
    let report = repository
        .migrator()
        .add(CreateUsers)
        .add(AddNickname)
        .run()
        .await
        .unwrap();
    (store, repository, report)
}

#[tokio::test]
async fn test_migrations_build_the_index() {
    let (store, _, report) = migrated().await;
    assert!(report.is_success());
    assert_eq!(report.applied.len(), 2);

    let definition = store.index_definition("users").unwrap();
    assert_eq!(
        definition["settings"],
        json!({ "number_of_shards": 1, "number_of_replicas": 0 })
    );
    assert_eq!(definition["mappings"]["dynamic"], "strict");

    let properties = &definition["mappings"]["properties"];
    assert_eq!(properties["nickname"], json!({ "type": "keyword" }));
    assert_eq!(
        properties["addresses"],
        json!({
            "type": "nested",
            "properties": { "city": { "type": "keyword" }, "zip": { "type": "keyword" } }
        })
    );

    let update = &store.calls_to(StoreOperation::PutMapping)[0];
    assert_eq!(
        update.to_json(),
        json!({ "index": "users", "body": { "properties": { "nickname": { "type": "keyword" } } } })
    );
}

#[tokio::test]
async fn test_migration_reset_drops_the_index() {
    let (store, repository, _) = migrated().await;

    let migrator = repository.migrator().add(CreateUsers).add(AddNickname);
    let report = migrator.reset().await.unwrap();

    assert_eq!(
        report.applied,
        vec!["2024_02_01_000000_add_nickname", "2024_01_01_000000_create_users"]
    );
    assert!(store.index_definition("users").is_none());
    assert_eq!(migrator.pending().await.unwrap().len(), 2);
}

// =============================================================================
// Documents
// =============================================================================

#[tokio::test]
async fn test_document_lifecycle() {
    let (store, repository, _) = migrated().await;

    let ada = repository
        .index("users")
        .insert(json!({
            "email": "ada@example.com",
            "name": "Ada Lovelace",
            "age": 36,
            "location": { "lat": 51.5074, "lon": -0.1278 },
            "addresses": [{ "city": "London", "zip": "W1" }]
        }))
        .await
        .unwrap();
    let id = ada["id"].as_str().unwrap().to_string();

    repository
        .index("users")
        .insert(json!({
            "id": "grace",
            "email": "grace@example.com",
            "name": "Grace Hopper",
            "age": 85,
            "location": { "lat": 40.7128, "lon": -74.0060 },
            "addresses": [{ "city": "NYC", "zip": "10001" }]
        }))
        .await
        .unwrap();

    let near_london = repository
        .index("users")
        .geo_distance("location", 51.5, -0.12, "20km")
        .execute()
        .await
        .unwrap();
    assert_eq!(near_london.len(), 1);
    assert_eq!(near_london[0]["email"], "ada@example.com");

    let named = repository
        .index("users")
        .where_op("name", "match", "lovelace")
        .count()
        .await
        .unwrap();
    assert_eq!(named, 1);

    let updated = repository
        .index("users")
        .update(&id, json!({ "nickname": "Countess" }))
        .await
        .unwrap();
    assert_eq!(updated["@version"], 2);
    assert_eq!(store.document("users", &id).unwrap()["nickname"], "Countess");

    repository
        .index("users")
        .delete(&id, DeleteMode::Logical)
        .await
        .unwrap();
    assert_eq!(repository.index("users").count().await.unwrap(), 1);

    let response: Response<Value> = repository
        .index("users")
        .update(&id, json!({ "age": 37 }))
        .await
        .into();
    assert!(!response.is_success());

    repository
        .index("users")
        .delete("grace", DeleteMode::Physical)
        .await
        .unwrap();
    assert!(!repository.index("users").exists("grace").await.unwrap());
}

#[tokio::test]
async fn test_store_failures_surface_uniformly() {
    let (store, repository, _) = migrated().await;
    repository
        .index("users")
        .insert(json!({ "id": "a" }))
        .await
        .unwrap();

    store.fail_next(StoreOperation::Delete, "cluster_block_exception");
    let result = repository
        .index("users")
        .delete("a", DeleteMode::Physical)
        .await;

    assert!(matches!(result, Err(ElastiqError::InvalidQuery(reason)) if reason == "cluster_block_exception"));
    assert!(store.document("users", "a").is_some());
}

#[tokio::test]
async fn test_search_payload_round_trips_through_store_request() {
    let repository = Repository::new(Arc::new(MemoryStore::new()));
    let payload = repository
        .index("users")
        .select(["email"])
        .where_op("age", ">=", 18)
        .to_json();

    let request = StoreRequest::from_json(payload.clone()).unwrap();
    assert_eq!(request.index, "users");
    assert_eq!(request.to_json(), payload);
}

#[test]
fn test_logging_config_defaults_to_json() {
    let config = elastiq::logging::LogConfig::default();
    assert_eq!(config.format, elastiq::logging::Format::Json);
    assert_eq!(config.filter, "info");
}

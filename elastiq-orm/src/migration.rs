//! Batched schema migrations.
//!
//! Applied migrations are recorded as `{migration, batch}` documents in a
//! bookkeeping index, keyed by migration name. A run applies every pending
//! migration as one batch; a rollback reverts the latest batch.
//!
//! Failures are per item: a migration that fails is reported and skipped,
//! and the rest of the batch still runs.

use crate::error::{ElastiqError, Result};
use crate::schema::Schema;
use crate::store::{DocumentStore, StoreRequest};
use async_trait::async_trait;
use elastiq_mapping::{Mapping, PropertyBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Default bookkeeping index.
pub const MIGRATIONS_INDEX: &str = "migrations";

/// Upper bound on recorded migrations read back per query.
const MAX_RECORDS: u64 = 10_000;

/// One reversible schema change.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Unique name, also the record ID.
    fn name(&self) -> &str;

    /// Apply the change.
    async fn up(&self, schema: &Schema) -> Result<()>;

    /// Revert the change.
    async fn down(&self, schema: &Schema) -> Result<()>;
}

/// Record of an applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Migration name.
    pub migration: String,
    /// Batch it was applied in, starting at 1.
    pub batch: u64,
}

/// Outcome of a run, rollback or reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Migrations applied or reverted, in execution order.
    pub applied: Vec<String>,
    /// Migrations that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl MigrationReport {
    /// Whether every item succeeded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Whether nothing was attempted.
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty() && self.failed.is_empty()
    }

    fn fail(&mut self, name: &str, error: ElastiqError) {
        warn!(migration = %name, error = %error, "Migration failed");
        self.failed.push((name.to_string(), error.to_string()));
    }
}

/// Runs migrations against a store.
pub struct Migrator {
    store: Arc<dyn DocumentStore>,
    schema: Schema,
    index: String,
    migrations: Vec<Arc<dyn Migration>>,
}

impl Migrator {
    /// Migrator recording into [`MIGRATIONS_INDEX`].
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            schema: Schema::new(store.clone()),
            store,
            index: MIGRATIONS_INDEX.to_string(),
            migrations: Vec::new(),
        }
    }

    /// Record into another index.
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    /// Register a migration. Registration order is execution order.
    pub fn add(mut self, migration: impl Migration + 'static) -> Self {
        self.migrations.push(Arc::new(migration));
        self
    }

    /// Register a shared migration.
    pub fn add_arc(mut self, migration: Arc<dyn Migration>) -> Self {
        self.migrations.push(migration);
        self
    }

    /// Bookkeeping index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Applied migrations, oldest batch first.
    pub async fn applied(&self) -> Result<Vec<MigrationRecord>> {
        if !self.schema.exists(&self.index).await? {
            return Ok(Vec::new());
        }

        let response = self
            .store
            .search(StoreRequest::new(&self.index).body(json!({
                "size": MAX_RECORDS,
                "query": { "match_all": {} }
            })))
            .await?;

        let mut records = Vec::new();
        if let Some(hits) = response["hits"]["hits"].as_array() {
            for hit in hits {
                records.push(serde_json::from_value::<MigrationRecord>(
                    hit["_source"].clone(),
                )?);
            }
        }

        records.sort_by_key(|record| (record.batch, self.position(&record.migration)));
        Ok(records)
    }

    /// Names of registered migrations not yet applied.
    pub async fn pending(&self) -> Result<Vec<String>> {
        let applied = self.applied().await?;
        Ok(self
            .migrations
            .iter()
            .map(|migration| migration.name().to_string())
            .filter(|name| !applied.iter().any(|record| &record.migration == name))
            .collect())
    }

    /// Apply every pending migration as one new batch.
    pub async fn run(&self) -> Result<MigrationReport> {
        self.ensure_index().await?;
        let applied = self.applied().await?;
        let batch = applied.iter().map(|record| record.batch).max().unwrap_or(0) + 1;

        let mut report = MigrationReport::default();
        for migration in &self.migrations {
            let name = migration.name();
            if applied.iter().any(|record| record.migration == name) {
                continue;
            }

            info!(migration = %name, batch, "Migrating");
            let outcome = match migration.up(&self.schema).await {
                Ok(()) => self.record(name, batch).await,
                Err(error) => Err(error),
            };
            match outcome {
                Ok(()) => report.applied.push(name.to_string()),
                Err(error) => report.fail(name, error),
            }
        }

        info!(applied = report.applied.len(), failed = report.failed.len(), "Migration run finished");
        Ok(report)
    }

    /// Revert the latest batch, newest migration first.
    pub async fn rollback(&self) -> Result<MigrationReport> {
        let applied = self.applied().await?;
        let Some(latest) = applied.iter().map(|record| record.batch).max() else {
            return Ok(MigrationReport::default());
        };

        let batch: Vec<MigrationRecord> = applied
            .into_iter()
            .filter(|record| record.batch == latest)
            .collect();
        self.revert(batch).await
    }

    /// Revert every applied migration, newest first.
    pub async fn reset(&self) -> Result<MigrationReport> {
        let applied = self.applied().await?;
        self.revert(applied).await
    }

    async fn revert(&self, records: Vec<MigrationRecord>) -> Result<MigrationReport> {
        let mut report = MigrationReport::default();

        for record in records.iter().rev() {
            let name = record.migration.as_str();
            let Some(migration) = self.find(name) else {
                report.fail(
                    name,
                    ElastiqError::InvalidArgument(format!("unknown migration '{}'", name)),
                );
                continue;
            };

            info!(migration = %name, batch = record.batch, "Rolling back");
            let outcome = match migration.down(&self.schema).await {
                Ok(()) => self.forget(name).await,
                Err(error) => Err(error),
            };
            match outcome {
                Ok(()) => report.applied.push(name.to_string()),
                Err(error) => report.fail(name, error),
            }
        }

        info!(reverted = report.applied.len(), failed = report.failed.len(), "Rollback finished");
        Ok(report)
    }

    async fn ensure_index(&self) -> Result<()> {
        if self.schema.exists(&self.index).await? {
            return Ok(());
        }

        let mut mapping = Mapping::new(&self.index);
        mapping.keyword("migration");
        mapping.integer("batch");
        match self.schema.create(&mapping).await {
            Ok(_) => Ok(()),
            Err(error) if error.is_already_exists() => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn record(&self, name: &str, batch: u64) -> Result<()> {
        let record = MigrationRecord {
            migration: name.to_string(),
            batch,
        };
        self.store
            .create(
                StoreRequest::new(&self.index)
                    .id(name)
                    .body(serde_json::to_value(&record)?),
            )
            .await?;
        Ok(())
    }

    async fn forget(&self, name: &str) -> Result<()> {
        self.store
            .delete(StoreRequest::new(&self.index).id(name))
            .await?;
        Ok(())
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Migration>> {
        self.migrations
            .iter()
            .find(|migration| migration.name() == name)
    }

    fn position(&self, name: &str) -> usize {
        self.migrations
            .iter()
            .position(|migration| migration.name() == name)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Debug for Migrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.migrations.iter().map(|m| m.name()).collect();
        f.debug_struct("Migrator")
            .field("index", &self.index)
            .field("migrations", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryStore, StoreOperation};

    struct CreateIndex(&'static str);

    #[async_trait]
    impl Migration for CreateIndex {
        fn name(&self) -> &str {
            self.0
        }

        async fn up(&self, schema: &Schema) -> Result<()> {
            let mut mapping = Mapping::new(self.0);
            mapping.keyword("id");
            schema.create(&mapping).await.map(|_| ())
        }

        async fn down(&self, schema: &Schema) -> Result<()> {
            schema.drop(self.0).await.map(|_| ())
        }
    }

    struct Broken;

    #[async_trait]
    impl Migration for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn up(&self, _schema: &Schema) -> Result<()> {
            Err(ElastiqError::InvalidQuery("mapper_parsing_exception".to_string()))
        }

        async fn down(&self, _schema: &Schema) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_records_batch() {
        let store = Arc::new(MemoryStore::new());
        let migrator = Migrator::new(store.clone())
            .add(CreateIndex("users"))
            .add(CreateIndex("orders"));

        let report = migrator.run().await.unwrap();
        assert_eq!(report.applied, vec!["users", "orders"]);
        assert!(report.is_success());

        assert_eq!(
            migrator.applied().await.unwrap(),
            vec![
                MigrationRecord { migration: "users".to_string(), batch: 1 },
                MigrationRecord { migration: "orders".to_string(), batch: 1 },
            ]
        );
        assert!(migrator.pending().await.unwrap().is_empty());

        let again = migrator.run().await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let store = Arc::new(MemoryStore::new());
        let migrator = Migrator::new(store.clone())
            .add(Broken)
            .add(CreateIndex("users"));

        let report = migrator.run().await.unwrap();
        assert_eq!(report.applied, vec!["users"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "broken");
        assert!(report.failed[0].1.contains("mapper_parsing_exception"));
        assert_eq!(migrator.pending().await.unwrap(), vec!["broken"]);
    }

    #[tokio::test]
    async fn test_rollback_latest_batch_only() {
        let store = Arc::new(MemoryStore::new());
        Migrator::new(store.clone())
            .add(CreateIndex("users"))
            .run()
            .await
            .unwrap();

        let migrator = Migrator::new(store.clone())
            .add(CreateIndex("users"))
            .add(CreateIndex("orders"))
            .add(CreateIndex("carts"));
        migrator.run().await.unwrap();

        let report = migrator.rollback().await.unwrap();
        assert_eq!(report.applied, vec!["carts", "orders"]);
        assert!(store.index_definition("users").is_some());
        assert!(store.index_definition("orders").is_none());

        let report = migrator.reset().await.unwrap();
        assert_eq!(report.applied, vec!["users"]);
        assert!(migrator.applied().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rollback_unknown_migration() {
        let store = Arc::new(MemoryStore::new());
        Migrator::new(store.clone())
            .add(CreateIndex("users"))
            .run()
            .await
            .unwrap();

        let report = Migrator::new(store.clone()).rollback().await.unwrap();
        assert!(report.applied.is_empty());
        assert_eq!(report.failed[0].0, "users");
    }

    #[tokio::test]
    async fn test_record_failure_is_reported() {
        let store = Arc::new(MemoryStore::new());
        store.fail_next(StoreOperation::Create, "disk full");

        let report = Migrator::new(store.clone())
            .with_index("schema_log")
            .add(CreateIndex("users"))
            .run()
            .await
            .unwrap();

        assert_eq!(report.failed, vec![("users".to_string(), "Invalid query: disk full".to_string())]);
        assert!(store.index_definition("schema_log").is_some());
    }
}

//! Shared entry point handing out per-query builders.

use crate::builder::QueryBuilder;
use crate::client::OpenSearchStore;
use crate::config::ElasticConfig;
use crate::error::Result;
use crate::migration::Migrator;
use crate::operators::OperatorRegistry;
use crate::schema::Schema;
use crate::store::DocumentStore;
use std::fmt;
use std::sync::Arc;

/// Store handle plus operator registry.
///
/// Cheap to clone and safe to share. Each call to [`query`](Self::query) or
/// [`index`](Self::index) returns a fresh, independent builder.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn DocumentStore>,
    operators: Arc<OperatorRegistry>,
}

impl Repository {
    /// Repository over a store with the built-in operators.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            operators: Arc::new(OperatorRegistry::new()),
        }
    }

    /// Repository over an OpenSearch cluster.
    pub fn connect(config: ElasticConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(OpenSearchStore::new(config)?)))
    }

    /// Replace the operator registry.
    pub fn with_operators(mut self, operators: OperatorRegistry) -> Self {
        self.operators = Arc::new(operators);
        self
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Operator registry shared by every builder.
    pub fn operators(&self) -> &OperatorRegistry {
        &self.operators
    }

    /// Builder with no index selected.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.store.clone(), self.operators.clone())
    }

    /// Builder targeting `index`.
    pub fn index(&self, index: impl Into<String>) -> QueryBuilder {
        self.query().from(index)
    }

    /// Schema manager on the same store.
    pub fn schema(&self) -> Schema {
        Schema::new(self.store.clone())
    }

    /// Migrator on the same store, with no migrations registered.
    pub fn migrator(&self) -> Migrator {
        Migrator::new(self.store.clone())
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("operators", &self.operators)
            .finish_non_exhaustive()
    }
}

//! Index lifecycle from [`Mapping`] definitions.

use crate::builder::{
    CREATED_AT_FIELD, ID_FIELD, TIMESTAMP_FIELD, UPDATED_AT_FIELD, VERSION_FIELD,
};
use crate::context::DELETED_FIELD;
use crate::error::{ElastiqError, Result};
use crate::store::{DocumentStore, StoreRequest};
use elastiq_mapping::{Mapping, PropertyBuilder};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Creates, extends and drops indices.
#[derive(Clone)]
pub struct Schema {
    store: Arc<dyn DocumentStore>,
}

impl Schema {
    /// Schema manager over a store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create the index a mapping describes, plus the bookkeeping fields
    /// from [`with_document_fields`].
    ///
    /// Fails with `AlreadyExists` when the index is already there.
    pub async fn create(&self, mapping: &Mapping) -> Result<Value> {
        let mapping = with_document_fields(mapping);
        let name = mapping.name();
        if self.exists(name).await? {
            return Err(ElastiqError::AlreadyExists {
                index: name.to_string(),
                id: String::new(),
            });
        }

        info!(index = %name, "Creating index");
        let request = StoreRequest::from_json(mapping.body())?;
        debug!(index = %name, body = %request.body, "create_index");
        self.store.create_index(request).await
    }

    /// Add the mapping's properties to an existing index.
    pub async fn update(&self, mapping: &Mapping) -> Result<Value> {
        info!(index = %mapping.name(), "Updating index mapping");
        let request = StoreRequest::from_json(mapping.update_body())?;
        debug!(index = %mapping.name(), body = %request.body, "put_mapping");
        self.store.put_mapping(request).await
    }

    /// Whether an index exists.
    pub async fn exists(&self, name: &str) -> Result<bool> {
        self.store.index_exists(StoreRequest::new(name)).await
    }

    /// Delete an index; fails with `NotFound` when it is absent.
    pub async fn drop(&self, name: &str) -> Result<Value> {
        info!(index = %name, "Dropping index");
        self.store.delete_index(StoreRequest::new(name)).await
    }

    /// Delete an index if it exists. Returns whether anything was dropped.
    pub async fn drop_if_exists(&self, name: &str) -> Result<bool> {
        if !self.exists(name).await? {
            return Ok(false);
        }
        self.drop(name).await?;
        Ok(true)
    }
}

/// Copy of `mapping` that also maps the fields every written document
/// carries, so strict indices accept them.
///
/// Fields the mapping already declares keep their own definition.
pub fn with_document_fields(mapping: &Mapping) -> Mapping {
    let mut mapping = mapping.clone();
    let missing = |mapping: &Mapping, name: &str| mapping.properties().get(name).is_none();

    if missing(&mapping, ID_FIELD) {
        mapping.keyword(ID_FIELD);
    }
    if missing(&mapping, CREATED_AT_FIELD) {
        mapping.date(CREATED_AT_FIELD);
    }
    if missing(&mapping, UPDATED_AT_FIELD) {
        mapping.date(UPDATED_AT_FIELD);
    }
    if missing(&mapping, DELETED_FIELD) {
        mapping.boolean(DELETED_FIELD);
    }
    if missing(&mapping, VERSION_FIELD) {
        mapping.long(VERSION_FIELD);
    }
    if missing(&mapping, TIMESTAMP_FIELD) {
        mapping.date_nanos(TIMESTAMP_FIELD);
    }
    mapping
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").finish_non_exhaustive()
    }
}

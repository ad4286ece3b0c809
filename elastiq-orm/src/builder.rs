//! Fluent query builder and versioned document operations.
//!
//! A [`QueryBuilder`] is an owned value: every fluent call consumes it and
//! hands it back, and every terminal call (`execute`, `count`, `insert`, ...)
//! consumes it for good. Builders are obtained from a
//! [`Repository`](crate::Repository) per logical query and are never shared.
//!
//! ```no_run
//! # async fn run(repository: elastiq_orm::Repository) -> elastiq_orm::Result<()> {
//! use elastiq_orm::SortOrder;
//!
//! let open_orders = repository
//!     .index("orders")
//!     .where_op("status", "=", "open")
//!     .where_op("total", ">=", 100)
//!     .order_by("created_at", SortOrder::Desc)
//!     .limit(20)
//!     .execute()
//!     .await?;
//! # let _ = open_orders;
//! # Ok(())
//! # }
//! ```

use crate::context::{DELETED_FIELD, QueryContext};
use crate::error::{ElastiqError, Result};
use crate::operators::OperatorRegistry;
use crate::query::{Aggregation, Clause, Query, SortOrder};
use crate::store::{DocumentStore, StoreRequest};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Version counter every document carries, starting at 1.
pub const VERSION_FIELD: &str = "@version";
/// High-precision write timestamp.
pub const TIMESTAMP_FIELD: &str = "@timestamp";
/// Creation timestamp.
pub const CREATED_AT_FIELD: &str = "created_at";
/// Last update timestamp, `null` until the first update.
pub const UPDATED_AT_FIELD: &str = "updated_at";
/// Document identifier field.
pub const ID_FIELD: &str = "id";

/// How [`QueryBuilder::delete`] removes a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Flag the document as deleted through a versioned update.
    #[default]
    Logical,
    /// Remove the document from the store.
    Physical,
}

/// Fluent query builder bound to a document store.
pub struct QueryBuilder {
    store: Arc<dyn DocumentStore>,
    operators: Arc<OperatorRegistry>,
    context: QueryContext,
    error: Option<ElastiqError>,
}

impl QueryBuilder {
    /// Create a builder with no target index.
    pub fn new(store: Arc<dyn DocumentStore>, operators: Arc<OperatorRegistry>) -> Self {
        Self {
            store,
            operators,
            context: QueryContext::new(),
            error: None,
        }
    }

    /// Accumulated query state.
    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    /// First error recorded by a fluent call, if any.
    pub fn error(&self) -> Option<&ElastiqError> {
        self.error.as_ref()
    }

    /// Search payload the builder would send right now.
    pub fn to_json(&self) -> Value {
        self.context.to_json()
    }

    /// Restrict returned fields.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context
            .set_source(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set the primary index.
    pub fn from(mut self, index: impl Into<String>) -> Self {
        self.context.set_index(index);
        self
    }

    /// Search an additional index.
    pub fn also_from(mut self, index: impl Into<String>) -> Self {
        self.context.add_index(index);
        self
    }

    /// Exact match on `field`, in the `must` clause.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context
            .add_condition(Query::term(field, value), Clause::Must);
        self
    }

    /// Operator condition in the `must` clause.
    pub fn where_op(self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.where_clause(field, operator, value, Clause::Must)
    }

    /// Operator condition in an explicit clause.
    ///
    /// Unknown operators and bad operands are recorded and returned by the
    /// terminal call.
    pub fn where_clause(
        mut self,
        field: &str,
        operator: &str,
        value: impl Into<Value>,
        clause: Clause,
    ) -> Self {
        match self.operators.build(field, operator, &value.into()) {
            Ok(condition) => self.context.add_condition(condition, clause),
            Err(error) => self.fail(error),
        }
        self
    }

    /// Same as [`where_op`](Self::where_op).
    pub fn and_where(self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.where_clause(field, operator, value, Clause::Must)
    }

    /// Operator condition in the `should` clause.
    pub fn or_where(self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.where_clause(field, operator, value, Clause::Should)
    }

    /// Operator condition in the `must_not` clause.
    pub fn where_not(self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.where_clause(field, operator, value, Clause::MustNot)
    }

    /// Operator condition in the `filter` clause.
    pub fn filter_where(self, field: &str, operator: &str, value: impl Into<Value>) -> Self {
        self.where_clause(field, operator, value, Clause::Filter)
    }

    /// Add a prebuilt query to a clause.
    pub fn condition(mut self, query: impl Into<Query>, clause: Clause) -> Self {
        self.context.add_condition(query.into(), clause);
        self
    }

    /// Compose a sub-query and add it to `must` as a `bool` query.
    pub fn where_must<F>(self, compose: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        self.fold(compose, |sub| sub, Clause::Must)
    }

    /// Compose a sub-query and add it to `should` as a `bool` query.
    pub fn where_should<F>(self, compose: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        self.fold(compose, |sub| sub, Clause::Should)
    }

    /// Compose a sub-query over the nested objects at `path`.
    pub fn where_nested<F>(self, path: impl Into<String>, compose: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let path = path.into();
        self.fold(compose, move |sub| Query::nested(path, sub), Clause::Must)
    }

    /// Maximum number of hits.
    pub fn limit(mut self, size: u64) -> Self {
        self.context.set_size(size);
        self
    }

    /// Number of hits to skip.
    pub fn offset(mut self, from: u64) -> Self {
        self.context.set_from(from);
        self
    }

    /// Sort by `field`.
    pub fn order_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.context.add_sort(field, order);
        self
    }

    /// Keep documents whose `field` lies within `distance` of a point.
    pub fn geo_distance(
        mut self,
        field: impl Into<String>,
        lat: f64,
        lon: f64,
        distance: impl Into<String>,
    ) -> Self {
        self.context.add_condition(
            Query::geo_distance(field, lat, lon, distance),
            Clause::Filter,
        );
        self
    }

    /// Add or replace a named aggregation.
    pub fn aggregate(mut self, name: impl Into<String>, aggregation: Aggregation) -> Self {
        self.context.add_aggregation(name, aggregation);
        self
    }

    /// Drop conditions, body parameters and aggregations; keep the index.
    pub fn reset(mut self) -> Self {
        self.context.reset();
        self.error = None;
        self
    }

    /// Run the search and return each hit's `_source`.
    pub async fn execute(mut self) -> Result<Vec<Value>> {
        self.target()?;
        let request = StoreRequest::from_json(self.context.to_json())?;
        debug!(index = %request.index, body = %request.body, "search");

        let response = self.store.search(request).await?;
        Ok(sources(response))
    }

    /// Run the search and deserialize each hit.
    pub async fn execute_as<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        self.execute()
            .await?
            .into_iter()
            .map(|source| serde_json::from_value(source).map_err(ElastiqError::from))
            .collect()
    }

    /// First hit, if any.
    pub async fn first(self) -> Result<Option<Value>> {
        Ok(self.limit(1).execute().await?.into_iter().next())
    }

    /// Number of matching documents.
    pub async fn count(mut self) -> Result<u64> {
        self.target()?;
        let request = StoreRequest::from_json(self.context.count_json())?;
        debug!(index = %request.index, body = %request.body, "count");

        let response = self.store.count(request).await?;
        response["count"].as_u64().ok_or_else(|| {
            ElastiqError::InvalidQuery(format!("count response without a count: {}", response))
        })
    }

    /// Whether a document with this ID exists in the index.
    pub async fn exists(mut self, id: &str) -> Result<bool> {
        let index = self.target()?;
        debug!(index = %index, id = %id, "exists");
        self.store.exists(StoreRequest::new(index).id(id)).await
    }

    /// Non-deleted document with this ID.
    pub async fn find(mut self, id: &str) -> Result<Option<Value>> {
        self.target()?;
        self.scoped().where_eq(ID_FIELD, id).first().await
    }

    /// Current version of a non-deleted document.
    ///
    /// A missing index reads as a missing document.
    pub async fn get_document_version(&self, id: &str) -> Result<Option<i64>> {
        let hit = self
            .scoped()
            .where_eq(ID_FIELD, id)
            .select([VERSION_FIELD])
            .first()
            .await;

        match hit {
            Ok(hit) => Ok(hit.and_then(|source| source[VERSION_FIELD].as_i64())),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Create a document at version 1 and return it as stored.
    ///
    /// A missing or null `data.id` gets a fresh UUID. A numeric `id` is
    /// stored as its decimal string, since document IDs are strings; any
    /// other non-string `id` fails with `InvalidArgument`.
    ///
    /// Fails with `AlreadyExists` when `data.id` already has a version, in
    /// which case the store's create endpoint is not called.
    pub async fn insert(mut self, data: Value) -> Result<Value> {
        let index = self.target()?;
        let Value::Object(mut document) = data else {
            return Err(ElastiqError::InvalidArgument(
                "insert expects a JSON object".to_string(),
            ));
        };

        let id = match document.get(ID_FIELD) {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            Some(other) => {
                return Err(ElastiqError::InvalidArgument(format!(
                    "document id must be a string or number, got {}",
                    other
                )));
            }
        };
        if self.get_document_version(&id).await?.is_some() {
            return Err(ElastiqError::AlreadyExists { index, id });
        }

        let now = Utc::now();
        document.insert(ID_FIELD.to_string(), json!(id));
        document.insert(
            CREATED_AT_FIELD.to_string(),
            json!(now.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        document.insert(UPDATED_AT_FIELD.to_string(), Value::Null);
        document.insert(DELETED_FIELD.to_string(), json!(false));
        document.insert(VERSION_FIELD.to_string(), json!(1));
        document.insert(
            TIMESTAMP_FIELD.to_string(),
            json!(now.to_rfc3339_opts(SecondsFormat::Nanos, true)),
        );

        let document = Value::Object(document);
        debug!(index = %index, id = %id, "insert");
        self.store
            .create(StoreRequest::new(index).id(id).body(document.clone()))
            .await?;
        Ok(document)
    }

    /// Apply a partial update and bump the version by one.
    ///
    /// Client-supplied `@version` and `@timestamp` are ignored.
    pub async fn update(mut self, id: &str, data: Value) -> Result<Value> {
        let index = self.target()?;
        let Value::Object(mut doc) = data else {
            return Err(ElastiqError::InvalidArgument(
                "update expects a JSON object".to_string(),
            ));
        };

        let current = self
            .get_document_version(id)
            .await?
            .ok_or_else(|| ElastiqError::NotFound {
                index: index.clone(),
                id: id.to_string(),
            })?;

        doc.remove(VERSION_FIELD);
        doc.remove(TIMESTAMP_FIELD);
        doc.insert(VERSION_FIELD.to_string(), json!(current + 1));
        doc.insert(
            UPDATED_AT_FIELD.to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)),
        );

        let doc = Value::Object(doc);
        debug!(index = %index, id = %id, version = current + 1, "update");
        self.store
            .update(
                StoreRequest::new(index)
                    .id(id)
                    .body(json!({ "doc": doc })),
            )
            .await?;
        Ok(doc)
    }

    /// Delete a document.
    ///
    /// `Logical` goes through [`update`](Self::update) with `deleted: true`
    /// and returns the applied change; `Physical` returns the store's
    /// response.
    pub async fn delete(mut self, id: &str, mode: DeleteMode) -> Result<Value> {
        match mode {
            DeleteMode::Logical => {
                let mut flag = Map::new();
                flag.insert(DELETED_FIELD.to_string(), json!(true));
                self.update(id, Value::Object(flag)).await
            }
            DeleteMode::Physical => {
                let index = self.target()?;
                debug!(index = %index, id = %id, "delete");
                self.store.delete(StoreRequest::new(index).id(id)).await
            }
        }
    }

    fn fail(&mut self, error: ElastiqError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Surface a recorded error, then the primary index.
    fn target(&mut self) -> Result<String> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.context
            .index()
            .map(str::to_string)
            .ok_or(ElastiqError::MissingIndex)
    }

    /// Empty builder on the same store and primary index.
    fn scoped(&self) -> QueryBuilder {
        let mut builder = QueryBuilder::new(self.store.clone(), self.operators.clone());
        if let Some(index) = self.context.index() {
            builder.context.set_index(index);
        }
        builder
    }

    fn fold<F, W>(mut self, compose: F, wrap: W, clause: Clause) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
        W: FnOnce(Query) -> Query,
    {
        let sub = compose(self.scoped());
        if let Some(error) = sub.error {
            self.fail(error);
            return self;
        }

        let query = sub.context.bool_query().clone();
        if !query.is_empty() {
            self.context.add_condition(wrap(Query::Bool(query)), clause);
        }
        self
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("context", &self.context)
            .field("error", &self.error)
            .finish()
    }
}

fn sources(response: Value) -> Vec<Value> {
    let Value::Object(mut response) = response else {
        return Vec::new();
    };
    let hits = response
        .remove("hits")
        .and_then(|mut hits| hits.get_mut("hits").map(Value::take));

    match hits {
        Some(Value::Array(hits)) => hits
            .into_iter()
            .filter_map(|mut hit| hit.get_mut("_source").map(Value::take))
            .collect(),
        _ => Vec::new(),
    }
}

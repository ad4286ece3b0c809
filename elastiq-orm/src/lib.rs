//! Fluent query building and versioned document operations for
//! Elasticsearch and OpenSearch.
//!
//! This crate provides:
//! - A typed query DSL and a boolean-query accumulator that always carries
//!   the soft-delete filter
//! - A pluggable operator registry (`=`, `>=`, `between`, `in`, `like`, ...)
//! - An owned, fluent [`QueryBuilder`] with nested sub-queries and versioned
//!   insert, update and delete
//! - A narrow [`DocumentStore`] trait with an OpenSearch-backed and an
//!   in-memory implementation
//! - Schema management and batched migrations driven by
//!   [`elastiq_mapping::Mapping`]
//!
//! # Example
//!
//! ```rust
//! use elastiq_orm::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let repository = Repository::new(Arc::new(MemoryStore::new()));
//!
//! let order = repository
//!     .index("orders")
//!     .insert(json!({ "id": "abc", "status": "open", "total": 120 }))
//!     .await?;
//! assert_eq!(order["@version"], 1);
//!
//! repository
//!     .index("orders")
//!     .update("abc", json!({ "status": "paid" }))
//!     .await?;
//!
//! let paid = repository
//!     .index("orders")
//!     .where_op("status", "=", "paid")
//!     .where_op("total", ">", 100)
//!     .execute()
//!     .await?;
//! assert_eq!(paid[0]["@version"], 2);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod client;
mod config;
mod context;
mod error;
mod migration;
mod operators;
mod query;
mod repository;
mod response;
mod schema;
mod store;

pub mod memory;

pub use builder::{
    CREATED_AT_FIELD, DeleteMode, ID_FIELD, QueryBuilder, TIMESTAMP_FIELD, UPDATED_AT_FIELD,
    VERSION_FIELD,
};
pub use client::OpenSearchStore;
pub use config::ElasticConfig;
pub use context::{DELETED_FIELD, QueryContext, not_deleted};
pub use error::{ElastiqError, Result};
pub use memory::MemoryStore;
pub use migration::{MIGRATIONS_INDEX, Migration, MigrationRecord, MigrationReport, Migrator};
pub use operators::{
    BetweenStrategy, ComparisonStrategy, EqualityStrategy, ExistenceStrategy, FullTextStrategy,
    InequalityStrategy, MembershipStrategy, OperatorRegistry, OperatorStrategy, PatternStrategy,
    PrefixStrategy, normalize,
};
pub use query::{
    Aggregation, BoolQuery, Clause, NestedQuery, Query, RangeBucket, RangeQuery, SortOrder,
};
pub use repository::Repository;
pub use response::{Outcome, Response};
pub use schema::{Schema, with_document_fields};
pub use store::{DocumentStore, StoreRequest};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Aggregation, Clause, DeleteMode, DocumentStore, ElasticConfig, ElastiqError, MemoryStore,
        Migration, Migrator, OpenSearchStore, Query, QueryBuilder, Repository, Response, Result,
        Schema, SortOrder,
    };
}

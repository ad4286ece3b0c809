//! Elastiq - typed mappings and fluent queries for Elasticsearch and OpenSearch.
//!
//! This crate bundles the workspace members:
//! - [`mapping`] (`elastiq-mapping`): field types, property trees and index mappings
//! - [`orm`] (`elastiq-orm`): query builder, document stores, schema and migrations
//! - [`logging`]: `tracing` subscriber setup
//!
//! # Example
//!
//! ```rust
//! use elastiq::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> elastiq::orm::Result<()> {
//! let repository = Repository::new(Arc::new(MemoryStore::new()));
//!
//! let mut mapping = Mapping::new("users");
//! mapping.keyword("email");
//! mapping.nested("addresses").keyword("city");
//! repository.schema().create(&mapping).await?;
//!
//! repository
//!     .index("users")
//!     .insert(json!({ "email": "ada@example.com", "addresses": [{ "city": "NYC" }] }))
//!     .await?;
//!
//! let in_nyc = repository
//!     .index("users")
//!     .where_nested("addresses", |q| q.where_eq("city", "NYC"))
//!     .count()
//!     .await?;
//! assert_eq!(in_nyc, 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod logging;

pub use elastiq_mapping as mapping;
pub use elastiq_orm as orm;

/// Prelude for common imports.
pub mod prelude {
    pub use elastiq_mapping::prelude::*;
    pub use elastiq_orm::prelude::*;
}

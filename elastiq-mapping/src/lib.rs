//! Typed mapping DSL for Elasticsearch and OpenSearch indices.
//!
//! This crate provides:
//! - One typed struct per field family, exposing only the parameters valid
//!   for that type
//! - Property trees with object and nested fields
//! - Index mappings producing create and update payloads
//!
//! # Example
//!
//! ```rust
//! use elastiq_mapping::prelude::*;
//!
//! let mut mapping = Mapping::new("products");
//! mapping.shards(1);
//! mapping.text("name").analyzer("english");
//! mapping.keyword("sku").ignore_above(64);
//! mapping.scaled_float("price", 100.0);
//! mapping.dense_vector("embedding", 384).similarity(VectorSimilarity::Cosine);
//!
//! let reviews = mapping.nested("reviews");
//! reviews.integer("stars");
//! reviews.text("comment");
//!
//! let body = mapping.body();
//! assert_eq!(body["body"]["mappings"]["properties"]["price"]["scaling_factor"], 100.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod field;
mod field_type;
mod mapping;
mod properties;
pub mod types;

pub use error::{MappingError, Result};
pub use field::Field;
pub use field_type::FieldType;
pub use mapping::Mapping;
pub use properties::{Properties, PropertyBuilder};
pub use types::{Dynamic, FieldDefinition, FieldKind};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::error::{MappingError, Result};
    pub use crate::field::Field;
    pub use crate::field_type::FieldType;
    pub use crate::mapping::Mapping;
    pub use crate::properties::{Properties, PropertyBuilder};
    pub use crate::types::*;
}

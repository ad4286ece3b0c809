//! Document store abstraction.

use crate::error::{ElastiqError, Result};
use async_trait::async_trait;
use serde_json::{Map, Value, json};

/// One request to the store: `{index, id?, body}`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreRequest {
    /// Target index, possibly a comma-separated list for searches.
    pub index: String,
    /// Document ID.
    pub id: Option<String>,
    /// Request body.
    pub body: Value,
}

impl StoreRequest {
    /// Request against `index` with an empty body.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: None,
            body: Value::Object(Map::new()),
        }
    }

    /// Set the document ID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Parse a `{index, id?, body?}` payload.
    pub fn from_json(payload: Value) -> Result<Self> {
        let Value::Object(mut payload) = payload else {
            return Err(ElastiqError::InvalidArgument(
                "store payload must be an object".to_string(),
            ));
        };

        let index = match payload.remove("index") {
            Some(Value::String(index)) if !index.is_empty() => index,
            _ => return Err(ElastiqError::MissingIndex),
        };
        let id = match payload.remove("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id),
            Some(other) => Some(other.to_string()),
        };
        let body = payload
            .remove("body")
            .unwrap_or_else(|| Value::Object(Map::new()));

        Ok(Self { index, id, body })
    }

    /// Payload form: `{index, id?, body}`.
    pub fn to_json(&self) -> Value {
        match &self.id {
            Some(id) => json!({ "index": self.index, "id": id, "body": self.body }),
            None => json!({ "index": self.index, "body": self.body }),
        }
    }

    /// Index names, split on commas.
    pub fn indices(&self) -> Vec<&str> {
        self.index
            .split(',')
            .map(str::trim)
            .filter(|index| !index.is_empty())
            .collect()
    }

    /// Document ID, or an error naming the operation that needed it.
    pub fn require_id(&self, operation: &str) -> Result<&str> {
        self.id.as_deref().ok_or_else(|| {
            ElastiqError::InvalidArgument(format!("{} requires a document id", operation))
        })
    }
}

/// Narrow surface of a document store client.
///
/// Every method takes a [`StoreRequest`] and answers with the store's JSON
/// response. `search` responses carry hits under `hits.hits[]._source`;
/// `count` responses carry `count`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document; fails with `AlreadyExists` if the ID is taken.
    async fn create(&self, request: StoreRequest) -> Result<Value>;

    /// Apply a partial update `{doc: {...}}`; fails with `NotFound`.
    async fn update(&self, request: StoreRequest) -> Result<Value>;

    /// Delete a document; fails with `NotFound`.
    async fn delete(&self, request: StoreRequest) -> Result<Value>;

    /// Run a search.
    async fn search(&self, request: StoreRequest) -> Result<Value>;

    /// Count matching documents.
    async fn count(&self, request: StoreRequest) -> Result<Value>;

    /// Whether a document exists.
    async fn exists(&self, request: StoreRequest) -> Result<bool>;

    /// Create an index with `{settings, mappings}`.
    async fn create_index(&self, request: StoreRequest) -> Result<Value>;

    /// Add properties to an index mapping.
    async fn put_mapping(&self, request: StoreRequest) -> Result<Value>;

    /// Whether an index exists.
    async fn index_exists(&self, request: StoreRequest) -> Result<bool>;

    /// Delete an index.
    async fn delete_index(&self, request: StoreRequest) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_payload() {
        let payload = json!({ "index": "orders", "id": "abc", "body": { "doc": { "a": 1 } } });
        let request = StoreRequest::from_json(payload.clone()).unwrap();
        assert_eq!(request.id.as_deref(), Some("abc"));
        assert_eq!(request.to_json(), payload);
    }

    #[test]
    fn test_missing_index() {
        assert!(matches!(
            StoreRequest::from_json(json!({ "index": null, "body": {} })),
            Err(ElastiqError::MissingIndex)
        ));
    }

    #[test]
    fn test_indices_split() {
        let request = StoreRequest::new("a, b,,c");
        assert_eq!(request.indices(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_require_id() {
        let request = StoreRequest::new("a");
        assert!(request.require_id("delete").is_err());
        assert_eq!(request.id("1").require_id("delete").unwrap(), "1");
    }
}

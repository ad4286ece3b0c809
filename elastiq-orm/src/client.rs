//! Document store backed by the `opensearch` client.

use crate::config::ElasticConfig;
use crate::error::{ElastiqError, Result};
use crate::store::{DocumentStore, StoreRequest};
use async_trait::async_trait;
use opensearch::http::response::Response;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::params::Refresh;
use opensearch::indices::{
    IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesPutMappingParts,
};
use opensearch::{
    CountParts, CreateParts, DeleteParts, ExistsParts, OpenSearch, SearchParts, UpdateParts,
};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// [`DocumentStore`] over an Elasticsearch/OpenSearch cluster.
#[derive(Clone)]
pub struct OpenSearchStore {
    client: Arc<OpenSearch>,
    config: Arc<ElasticConfig>,
}

impl OpenSearchStore {
    /// Connect to the first configured node.
    pub fn new(config: ElasticConfig) -> Result<Self> {
        info!("Initializing OpenSearch store for: {:?}", config.urls);

        let url = config
            .urls
            .first()
            .ok_or_else(|| ElastiqError::Config("No URLs provided".to_string()))?;

        let url = opensearch::http::Url::parse(url)
            .map_err(|e| ElastiqError::Config(format!("Invalid URL '{}': {}", url, e)))?;

        let mut builder = TransportBuilder::new(SingleNodeConnectionPool::new(url))
            .timeout(config.request_timeout)
            .disable_proxy();

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.auth(opensearch::auth::Credentials::Basic(
                user.clone(),
                pass.clone(),
            ));
        }

        let transport = builder
            .build()
            .map_err(|e| ElastiqError::Transport(e.to_string()))?;

        debug!("OpenSearch store initialized");

        Ok(Self {
            client: Arc::new(OpenSearch::new(transport)),
            config: Arc::new(config),
        })
    }

    /// Connect using `ELASTIQ_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ElasticConfig::from_env()?)
    }

    /// Get the underlying client.
    pub fn inner(&self) -> &OpenSearch {
        &self.client
    }

    /// Get the configuration.
    pub fn config(&self) -> &ElasticConfig {
        &self.config
    }

    /// Send a request, retrying transport failures up to `max_retries` times.
    async fn send<F, Fut>(&self, operation: &str, mut send: F) -> Result<Response>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<Response, opensearch::Error>>,
    {
        let mut attempt = 0;
        loop {
            match send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(operation, attempt, error = %e, "Retrying store request");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Read a response body, mapping failure statuses to errors.
async fn read(response: Response, request: &StoreRequest) -> Result<Value> {
    let status = response.status_code().as_u16();
    let text = response.text().await?;
    check(status, &text, request)
}

/// Map a status and raw body to the response JSON or an error.
///
/// `404` is `NotFound`, `409` and `resource_already_exists_exception` are
/// `AlreadyExists`; other failures carry the store's `error.reason`, or the
/// raw body when it has none.
pub(crate) fn check(status: u16, text: &str, request: &StoreRequest) -> Result<Value> {
    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    };

    if (200..300).contains(&status) {
        return Ok(body);
    }

    let index = request.index.clone();
    let id = request.id.clone().unwrap_or_default();
    let error_type = body["error"]["type"].as_str().unwrap_or("");

    match status {
        404 => Err(ElastiqError::NotFound { index, id }),
        409 => Err(ElastiqError::AlreadyExists { index, id }),
        400 if error_type == "resource_already_exists_exception" => {
            Err(ElastiqError::AlreadyExists { index, id })
        }
        _ => {
            let reason = body["error"]["reason"]
                .as_str()
                .or_else(|| body["error"].as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("status {}: {}", status, text));
            Err(ElastiqError::InvalidQuery(reason))
        }
    }
}

async fn found(response: Response, request: &StoreRequest) -> Result<bool> {
    let status = response.status_code().as_u16();
    if status == 404 {
        return Ok(false);
    }
    let text = response.text().await?;
    check(status, &text, request).map(|_| true)
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    async fn create(&self, request: StoreRequest) -> Result<Value> {
        let id = request.require_id("create")?;
        debug!(index = %request.index, id, body = %request.body, "Creating document");

        let response = self
            .send("create", || {
                self.client
                    .create(CreateParts::IndexId(&request.index, id))
                    .refresh(Refresh::WaitFor)
                    .body(request.body.clone())
                    .send()
            })
            .await?;
        read(response, &request).await
    }

    async fn update(&self, request: StoreRequest) -> Result<Value> {
        let id = request.require_id("update")?;
        debug!(index = %request.index, id, body = %request.body, "Updating document");

        let response = self
            .send("update", || {
                self.client
                    .update(UpdateParts::IndexId(&request.index, id))
                    .refresh(Refresh::WaitFor)
                    .body(request.body.clone())
                    .send()
            })
            .await?;
        read(response, &request).await
    }

    async fn delete(&self, request: StoreRequest) -> Result<Value> {
        let id = request.require_id("delete")?;
        debug!(index = %request.index, id, "Deleting document");

        let response = self
            .send("delete", || {
                self.client
                    .delete(DeleteParts::IndexId(&request.index, id))
                    .refresh(Refresh::WaitFor)
                    .send()
            })
            .await?;
        read(response, &request).await
    }

    async fn search(&self, request: StoreRequest) -> Result<Value> {
        let indices = request.indices();
        debug!(index = %request.index, body = %request.body, "Searching");

        let response = self
            .send("search", || {
                self.client
                    .search(SearchParts::Index(&indices))
                    .body(request.body.clone())
                    .send()
            })
            .await?;
        read(response, &request).await
    }

    async fn count(&self, request: StoreRequest) -> Result<Value> {
        let indices = request.indices();
        debug!(index = %request.index, body = %request.body, "Counting");

        let response = self
            .send("count", || {
                self.client
                    .count(CountParts::Index(&indices))
                    .body(request.body.clone())
                    .send()
            })
            .await?;
        read(response, &request).await
    }

    async fn exists(&self, request: StoreRequest) -> Result<bool> {
        let id = request.require_id("exists")?;
        debug!(index = %request.index, id, "Checking document existence");

        let response = self
            .send("exists", || {
                self.client
                    .exists(ExistsParts::IndexId(&request.index, id))
                    .send()
            })
            .await?;
        found(response, &request).await
    }

    async fn create_index(&self, request: StoreRequest) -> Result<Value> {
        info!(index = %request.index, "Creating index");

        let indices_api = self.client.indices();
        let response = self
            .send("create_index", || {
                indices_api
                    .create(IndicesCreateParts::Index(&request.index))
                    .body(request.body.clone())
                    .send()
            })
            .await?;
        read(response, &request).await
    }

    async fn put_mapping(&self, request: StoreRequest) -> Result<Value> {
        info!(index = %request.index, "Updating mapping");

        let indices = request.indices();
        let indices_api = self.client.indices();
        let response = self
            .send("put_mapping", || {
                indices_api
                    .put_mapping(IndicesPutMappingParts::Index(&indices))
                    .body(request.body.clone())
                    .send()
            })
            .await?;
        read(response, &request).await
    }

    async fn index_exists(&self, request: StoreRequest) -> Result<bool> {
        debug!(index = %request.index, "Checking index existence");

        let indices = request.indices();
        let indices_api = self.client.indices();
        let response = self
            .send("index_exists", || {
                indices_api
                    .exists(IndicesExistsParts::Index(&indices))
                    .send()
            })
            .await?;
        found(response, &request).await
    }

    async fn delete_index(&self, request: StoreRequest) -> Result<Value> {
        info!(index = %request.index, "Deleting index");

        let indices = request.indices();
        let indices_api = self.client.indices();
        let response = self
            .send("delete_index", || {
                indices_api
                    .delete(IndicesDeleteParts::Index(&indices))
                    .send()
            })
            .await?;
        read(response, &request).await
    }
}

impl std::fmt::Debug for OpenSearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenSearchStore")
            .field("urls", &self.config.urls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> StoreRequest {
        StoreRequest::new("orders").id("abc")
    }

    #[test]
    fn test_check_success() {
        let body = check(200, r#"{"result":"created"}"#, &request()).unwrap();
        assert_eq!(body["result"], "created");
        assert_eq!(check(200, "", &request()).unwrap(), Value::Null);
    }

    #[test]
    fn test_check_status_mapping() {
        match check(404, "{}", &request()) {
            Err(ElastiqError::NotFound { index, id }) => {
                assert_eq!(index, "orders");
                assert_eq!(id, "abc");
            }
            other => panic!("unexpected: {other:?}"),
        }

        assert!(matches!(
            check(409, "{}", &request()),
            Err(ElastiqError::AlreadyExists { .. })
        ));

        let exists = r#"{"error":{"type":"resource_already_exists_exception","reason":"index [orders] already exists"}}"#;
        assert!(matches!(
            check(400, exists, &StoreRequest::new("orders")),
            Err(ElastiqError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_check_reason_extraction() {
        let parse = r#"{"error":{"type":"parsing_exception","reason":"unknown query [trm]"},"status":400}"#;
        match check(400, parse, &request()) {
            Err(ElastiqError::InvalidQuery(reason)) => assert_eq!(reason, "unknown query [trm]"),
            other => panic!("unexpected: {other:?}"),
        }

        match check(500, "gateway exploded", &request()) {
            Err(ElastiqError::InvalidQuery(reason)) => {
                assert_eq!(reason, "status 500: gateway exploded")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(matches!(
            OpenSearchStore::new(ElasticConfig::cluster(vec![])),
            Err(ElastiqError::Config(_))
        ));
        assert!(matches!(
            OpenSearchStore::new(ElasticConfig::new("not a url")),
            Err(ElastiqError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let server = MockServer::start().await;
        Mock::given(path("/orders/_create/abc"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": { "type": "version_conflict_engine_exception", "reason": "document already exists" },
                "status": 409
            })))
            .mount(&server)
            .await;

        let store = OpenSearchStore::new(ElasticConfig::new(server.uri())).unwrap();
        let err = store
            .create(request().body(json!({ "id": "abc" })))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_writes_wait_for_refresh() {
        let server = MockServer::start().await;
        for (route, result) in [
            ("/orders/_create/abc", "created"),
            ("/orders/_update/abc", "updated"),
            ("/orders/_doc/abc", "deleted"),
        ] {
            Mock::given(path(route))
                .and(query_param("refresh", "wait_for"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": result })))
                .expect(1)
                .mount(&server)
                .await;
        }

        let store = OpenSearchStore::new(ElasticConfig::new(server.uri())).unwrap();
        let created = store
            .create(request().body(json!({ "id": "abc" })))
            .await
            .unwrap();
        assert_eq!(created["result"], "created");

        let updated = store
            .update(request().body(json!({ "doc": { "n": 1 } })))
            .await
            .unwrap();
        assert_eq!(updated["result"], "updated");

        let deleted = store.delete(request()).await.unwrap();
        assert_eq!(deleted["result"], "deleted");
    }

    #[tokio::test]
    async fn test_search_returns_response() {
        let server = MockServer::start().await;
        Mock::given(path("/orders/_search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": { "total": { "value": 1 }, "hits": [{ "_id": "abc", "_source": { "id": "abc" } }] }
            })))
            .mount(&server)
            .await;

        let store = OpenSearchStore::new(ElasticConfig::new(server.uri())).unwrap();
        let response = store
            .search(StoreRequest::new("orders").body(json!({ "query": { "match_all": {} } })))
            .await
            .unwrap();
        assert_eq!(response["hits"]["hits"][0]["_source"]["id"], "abc");
    }

    #[tokio::test]
    async fn test_delete_missing_document() {
        let server = MockServer::start().await;
        Mock::given(path("/orders/_doc/abc"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "result": "not_found" })))
            .mount(&server)
            .await;

        let store = OpenSearchStore::new(ElasticConfig::new(server.uri())).unwrap();
        let err = store.delete(request()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires a running cluster at ELASTIQ_URL"]
    async fn test_live_index_lifecycle() {
        let store = OpenSearchStore::from_env().unwrap();
        let request = StoreRequest::new("elastiq-live-test");

        let _ = store.delete_index(request.clone()).await;
        store
            .create_index(request.clone().body(json!({ "settings": {}, "mappings": {} })))
            .await
            .unwrap();
        assert!(store.index_exists(request.clone()).await.unwrap());
        store.delete_index(request.clone()).await.unwrap();
        assert!(!store.index_exists(request).await.unwrap());
    }
}

//! In-process document store.
//!
//! [`MemoryStore`] keeps indices and documents in memory, records every call
//! it receives and evaluates the subset of the query DSL the builder emits.
//! It is meant for tests, both in this crate and downstream.

use crate::error::{ElastiqError, Result};
use crate::store::{DocumentStore, StoreRequest};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value, json};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Store operation names, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// `create`
    Create,
    /// `update`
    Update,
    /// `delete`
    Delete,
    /// `search`
    Search,
    /// `count`
    Count,
    /// `exists`
    Exists,
    /// `indices.create`
    CreateIndex,
    /// `indices.putMapping`
    PutMapping,
    /// `indices.exists`
    IndexExists,
    /// `indices.delete`
    DeleteIndex,
}

impl StoreOperation {
    /// Operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreOperation::Create => "create",
            StoreOperation::Update => "update",
            StoreOperation::Delete => "delete",
            StoreOperation::Search => "search",
            StoreOperation::Count => "count",
            StoreOperation::Exists => "exists",
            StoreOperation::CreateIndex => "create_index",
            StoreOperation::PutMapping => "put_mapping",
            StoreOperation::IndexExists => "index_exists",
            StoreOperation::DeleteIndex => "delete_index",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCall {
    /// Operation invoked.
    pub operation: StoreOperation,
    /// Request it was invoked with.
    pub request: StoreRequest,
}

#[derive(Debug, Default)]
struct MemoryIndex {
    definition: Value,
    documents: Vec<(String, Value)>,
}

impl MemoryIndex {
    fn position(&self, id: &str) -> Option<usize> {
        self.documents.iter().position(|(doc_id, _)| doc_id == id)
    }
}

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryStore {
    indices: RwLock<HashMap<String, MemoryIndex>>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<Vec<(StoreOperation, String)>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Recorded calls of one operation.
    pub fn calls_to(&self, operation: StoreOperation) -> Vec<StoreRequest> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.operation == operation)
            .map(|call| call.request.clone())
            .collect()
    }

    /// Whether an operation was called at least once.
    pub fn was_called(&self, operation: StoreOperation) -> bool {
        self.calls
            .lock()
            .iter()
            .any(|call| call.operation == operation)
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Make the next call of `operation` fail with `InvalidQuery(reason)`.
    pub fn fail_next(&self, operation: StoreOperation, reason: impl Into<String>) {
        self.failures.lock().push((operation, reason.into()));
    }

    /// Stored document, without going through the call log.
    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        let indices = self.indices.read();
        let index = indices.get(index)?;
        index
            .position(id)
            .map(|position| index.documents[position].1.clone())
    }

    /// Number of documents in an index.
    pub fn len(&self, index: &str) -> usize {
        self.indices
            .read()
            .get(index)
            .map_or(0, |index| index.documents.len())
    }

    /// Whether an index holds no documents.
    pub fn is_empty(&self, index: &str) -> bool {
        self.len(index) == 0
    }

    /// Index definition as it was created and later extended.
    pub fn index_definition(&self, index: &str) -> Option<Value> {
        self.indices
            .read()
            .get(index)
            .map(|index| index.definition.clone())
    }

    fn record(&self, operation: StoreOperation, request: &StoreRequest) -> Result<()> {
        self.calls.lock().push(StoreCall {
            operation,
            request: request.clone(),
        });

        let mut failures = self.failures.lock();
        if let Some(position) = failures.iter().position(|(op, _)| *op == operation) {
            let (_, reason) = failures.remove(position);
            return Err(ElastiqError::InvalidQuery(reason));
        }
        Ok(())
    }

    fn not_found(request: &StoreRequest) -> ElastiqError {
        ElastiqError::NotFound {
            index: request.index.clone(),
            id: request.id.clone().unwrap_or_default(),
        }
    }

    fn matching(&self, request: &StoreRequest) -> Result<Vec<(String, String, Value)>> {
        let query = request
            .body
            .get("query")
            .cloned()
            .unwrap_or_else(|| json!({ "match_all": {} }));

        let indices = self.indices.read();
        let mut hits = Vec::new();
        for name in request.indices() {
            let index = indices.get(name).ok_or_else(|| ElastiqError::NotFound {
                index: name.to_string(),
                id: String::new(),
            })?;
            for (id, document) in &index.documents {
                if matches(&query, document, "")? {
                    hits.push((name.to_string(), id.clone(), document.clone()));
                }
            }
        }
        Ok(hits)
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices = self.indices.read();
        let mut names: Vec<&String> = indices.keys().collect();
        names.sort();
        f.debug_struct("MemoryStore")
            .field("indices", &names)
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::Create, &request)?;
        let id = request.require_id("create")?.to_string();

        let mut indices = self.indices.write();
        let index = indices.entry(request.index.clone()).or_default();
        if index.position(&id).is_some() {
            return Err(ElastiqError::AlreadyExists {
                index: request.index.clone(),
                id,
            });
        }
        if let Some(document) = request.body.as_object() {
            check_strict(&index.definition, document)?;
        }
        index.documents.push((id.clone(), request.body.clone()));

        Ok(json!({ "_index": request.index, "_id": id, "_version": 1, "result": "created" }))
    }

    async fn update(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::Update, &request)?;
        let id = request.require_id("update")?;
        let doc = request.body.get("doc").and_then(Value::as_object).ok_or_else(|| {
            ElastiqError::InvalidQuery("update body must contain a doc object".to_string())
        })?;

        let mut indices = self.indices.write();
        let index = indices
            .get_mut(&request.index)
            .ok_or_else(|| Self::not_found(&request))?;
        let position = index.position(id).ok_or_else(|| Self::not_found(&request))?;
        check_strict(&index.definition, doc)?;
        merge(&mut index.documents[position].1, doc);

        Ok(json!({ "_index": request.index, "_id": id, "result": "updated" }))
    }

    async fn delete(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::Delete, &request)?;
        let id = request.require_id("delete")?;

        let mut indices = self.indices.write();
        let index = indices
            .get_mut(&request.index)
            .ok_or_else(|| Self::not_found(&request))?;
        let position = index.position(id).ok_or_else(|| Self::not_found(&request))?;
        index.documents.remove(position);

        Ok(json!({ "_index": request.index, "_id": id, "result": "deleted" }))
    }

    async fn search(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::Search, &request)?;
        let mut hits = self.matching(&request)?;
        let total = hits.len();

        if let Some(sort) = request.body.get("sort").and_then(Value::as_array) {
            let keys = sort_keys(sort);
            hits.sort_by(|(_, _, a), (_, _, b)| compare_documents(a, b, &keys));
        }

        let from = request.body["from"].as_u64().unwrap_or(0) as usize;
        let size = request.body["size"].as_u64().unwrap_or(10) as usize;

        let hits: Vec<Value> = hits
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(index, id, document)| {
                json!({
                    "_index": index,
                    "_id": id,
                    "_source": project(&document, request.body.get("_source")),
                })
            })
            .collect();

        Ok(json!({
            "hits": {
                "total": { "value": total, "relation": "eq" },
                "hits": hits,
            }
        }))
    }

    async fn count(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::Count, &request)?;
        let count = self.matching(&request)?.len();
        Ok(json!({ "count": count }))
    }

    async fn exists(&self, request: StoreRequest) -> Result<bool> {
        self.record(StoreOperation::Exists, &request)?;
        let id = request.require_id("exists")?;
        Ok(self.document(&request.index, id).is_some())
    }

    async fn create_index(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::CreateIndex, &request)?;

        let mut indices = self.indices.write();
        if indices.contains_key(&request.index) {
            return Err(ElastiqError::AlreadyExists {
                index: request.index.clone(),
                id: String::new(),
            });
        }
        indices.insert(
            request.index.clone(),
            MemoryIndex {
                definition: request.body.clone(),
                documents: Vec::new(),
            },
        );

        Ok(json!({ "acknowledged": true, "index": request.index }))
    }

    async fn put_mapping(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::PutMapping, &request)?;

        let mut indices = self.indices.write();
        let index = indices
            .get_mut(&request.index)
            .ok_or_else(|| Self::not_found(&request))?;

        if !index.definition.is_object() {
            index.definition = json!({});
        }
        let mappings = index.definition["mappings"].take();
        let mut mappings = match mappings {
            Value::Object(mappings) => Value::Object(mappings),
            _ => json!({}),
        };
        if let Some(properties) = request.body.get("properties").and_then(Value::as_object) {
            if !mappings["properties"].is_object() {
                mappings["properties"] = json!({});
            }
            merge(&mut mappings["properties"], properties);
        }
        index.definition["mappings"] = mappings;

        Ok(json!({ "acknowledged": true }))
    }

    async fn index_exists(&self, request: StoreRequest) -> Result<bool> {
        self.record(StoreOperation::IndexExists, &request)?;
        let indices = self.indices.read();
        Ok(request.indices().iter().all(|name| indices.contains_key(*name)))
    }

    async fn delete_index(&self, request: StoreRequest) -> Result<Value> {
        self.record(StoreOperation::DeleteIndex, &request)?;

        let mut indices = self.indices.write();
        for name in request.indices() {
            if indices.remove(name).is_none() {
                return Err(ElastiqError::NotFound {
                    index: name.to_string(),
                    id: String::new(),
                });
            }
        }
        Ok(json!({ "acknowledged": true }))
    }
}

/// Reject root keys a `dynamic: strict` index does not map.
fn check_strict(definition: &Value, document: &Map<String, Value>) -> Result<()> {
    let mappings = &definition["mappings"];
    if mappings["dynamic"] != "strict" {
        return Ok(());
    }
    let properties = &mappings["properties"];
    match document.keys().find(|key| properties.get(key.as_str()).is_none()) {
        Some(key) => Err(ElastiqError::InvalidQuery(format!(
            "strict_dynamic_mapping_exception: mapping set to strict, dynamic introduction of [{}] within [_doc] is not allowed",
            key
        ))),
        None => Ok(()),
    }
}

/// Recursive merge of `patch` into `target`, as partial updates apply.
fn merge(target: &mut Value, patch: &Map<String, Value>) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(target) = target {
        for (key, value) in patch {
            match (target.get_mut(key), value) {
                (Some(existing @ Value::Object(_)), Value::Object(inner)) => merge(existing, inner),
                _ => {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// All values at a dotted path, arrays flattened.
fn lookup<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![document];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(found) = map.get(segment) {
                        next.push(found);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Some(found) = item.get(segment) {
                            next.push(found);
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }

    current
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

fn field_values<'a>(document: &'a Value, field: &str, scope: &str) -> Vec<&'a Value> {
    lookup(document, field.strip_prefix(scope).unwrap_or(field))
}

fn single_entry<'a>(query: &'a Value, kind: &str) -> Result<(&'a String, &'a Value)> {
    query
        .as_object()
        .and_then(|map| map.iter().next())
        .ok_or_else(|| ElastiqError::InvalidQuery(format!("malformed [{}] query", kind)))
}

/// Evaluate a query against one document.
///
/// `scope` is the `path.` prefix stripped from field names inside a nested
/// query.
fn matches(query: &Value, document: &Value, scope: &str) -> Result<bool> {
    let (kind, body) = single_entry(query, "query")?;

    match kind.as_str() {
        "match_all" => Ok(true),
        "term" => {
            let (field, expected) = single_entry(body, kind)?;
            let expected = expected.get("value").unwrap_or(expected);
            Ok(field_values(document, field, scope)
                .into_iter()
                .any(|value| value == expected))
        }
        "terms" => {
            let (field, expected) = single_entry(body, kind)?;
            let expected = expected.as_array().ok_or_else(|| {
                ElastiqError::InvalidQuery("[terms] expects an array".to_string())
            })?;
            Ok(field_values(document, field, scope)
                .into_iter()
                .any(|value| expected.contains(value)))
        }
        "range" => {
            let (field, bounds) = single_entry(body, kind)?;
            Ok(field_values(document, field, scope)
                .into_iter()
                .any(|value| in_range(value, bounds)))
        }
        "exists" => {
            let field = body["field"].as_str().ok_or_else(|| {
                ElastiqError::InvalidQuery("[exists] expects a field".to_string())
            })?;
            Ok(field_values(document, field, scope)
                .into_iter()
                .any(|value| !value.is_null()))
        }
        "prefix" => {
            let (field, prefix) = single_entry(body, kind)?;
            let prefix = prefix.get("value").unwrap_or(prefix).as_str().unwrap_or("");
            Ok(strings(document, field, scope).any(|value| value.starts_with(prefix)))
        }
        "wildcard" => {
            let (field, pattern) = single_entry(body, kind)?;
            let pattern = pattern.get("value").unwrap_or(pattern).as_str().unwrap_or("");
            Ok(strings(document, field, scope).any(|value| glob(pattern, value)))
        }
        "match" => {
            let (field, text) = single_entry(body, kind)?;
            let text = text.get("query").unwrap_or(text);
            let wanted = tokens(&text_of(text));
            Ok(field_values(document, field, scope).into_iter().any(|value| {
                let have = tokens(&text_of(value));
                wanted.iter().any(|token| have.contains(token))
            }))
        }
        "match_phrase" => {
            let (field, text) = single_entry(body, kind)?;
            let text = text.get("query").unwrap_or(text);
            let phrase = text_of(text).to_lowercase();
            Ok(field_values(document, field, scope)
                .into_iter()
                .any(|value| text_of(value).to_lowercase().contains(&phrase)))
        }
        "nested" => {
            let path = body["path"].as_str().ok_or_else(|| {
                ElastiqError::InvalidQuery("[nested] expects a path".to_string())
            })?;
            let inner = body.get("query").ok_or_else(|| {
                ElastiqError::InvalidQuery("[nested] expects a query".to_string())
            })?;
            let inner_scope = format!("{}.", path);
            for element in field_values(document, path, scope) {
                if matches(inner, element, &inner_scope)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        "geo_distance" => geo_distance(body, document, scope),
        "bool" => {
            let must = clauses(body, "must");
            let filter = clauses(body, "filter");
            for clause in must.iter().chain(filter.iter()) {
                if !matches(clause, document, scope)? {
                    return Ok(false);
                }
            }
            for clause in clauses(body, "must_not") {
                if matches(clause, document, scope)? {
                    return Ok(false);
                }
            }

            // With must or filter present, should clauses only score.
            let should = clauses(body, "should");
            let required = match body.get("minimum_should_match").and_then(Value::as_u64) {
                Some(min) => min as usize,
                None if must.is_empty() && filter.is_empty() => usize::from(!should.is_empty()),
                None => 0,
            };
            let mut satisfied = 0;
            for clause in should {
                if matches(clause, document, scope)? {
                    satisfied += 1;
                }
            }
            Ok(satisfied >= required)
        }
        other => Err(ElastiqError::InvalidQuery(format!(
            "unsupported query [{}]",
            other
        ))),
    }
}

fn clauses<'a>(body: &'a Value, name: &str) -> Vec<&'a Value> {
    match body.get(name) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    }
}

fn strings<'a>(document: &'a Value, field: &str, scope: &str) -> impl Iterator<Item = &'a str> {
    field_values(document, field, scope)
        .into_iter()
        .filter_map(Value::as_str)
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[derive(Clone, Copy, PartialEq)]
enum GlobToken {
    Any,
    One,
    Literal(char),
}

/// Wildcard match: `*` any run, `?` one character, `\` escapes the next.
fn glob(pattern: &str, value: &str) -> bool {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '*' => GlobToken::Any,
            '?' => GlobToken::One,
            '\\' => GlobToken::Literal(chars.next().unwrap_or('\\')),
            other => GlobToken::Literal(other),
        });
    }

    let value: Vec<char> = value.chars().collect();
    let (mut p, mut v) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while v < value.len() {
        let token = tokens.get(p).copied();
        if token == Some(GlobToken::One) || token == Some(GlobToken::Literal(value[v])) {
            p += 1;
            v += 1;
        } else if token == Some(GlobToken::Any) {
            backtrack = Some((p, v));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            v = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    tokens[p..].iter().all(|&token| token == GlobToken::Any)
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn in_range(value: &Value, bounds: &Value) -> bool {
    let check = |key: &str, accept: fn(Ordering) -> bool| match bounds.get(key) {
        Some(bound) => compare(value, bound).is_some_and(accept),
        None => true,
    };

    check("gt", |o| o == Ordering::Greater)
        && check("gte", |o| o != Ordering::Less)
        && check("lt", |o| o == Ordering::Less)
        && check("lte", |o| o != Ordering::Greater)
}

fn geo_distance(body: &Value, document: &Value, scope: &str) -> Result<bool> {
    let distance = body["distance"]
        .as_str()
        .and_then(parse_distance)
        .ok_or_else(|| ElastiqError::InvalidQuery("[geo_distance] bad distance".to_string()))?;

    let Some((field, origin)) = body
        .as_object()
        .and_then(|map| map.iter().find(|(key, _)| key.as_str() != "distance"))
    else {
        return Err(ElastiqError::InvalidQuery(
            "[geo_distance] expects a field".to_string(),
        ));
    };
    let origin = point(origin)
        .ok_or_else(|| ElastiqError::InvalidQuery("[geo_distance] bad origin".to_string()))?;

    Ok(field_values(document, field, scope)
        .into_iter()
        .filter_map(point)
        .any(|location| haversine(origin, location) <= distance))
}

fn point(value: &Value) -> Option<(f64, f64)> {
    Some((value["lat"].as_f64()?, value["lon"].as_f64()?))
}

/// Distance in metres.
fn parse_distance(distance: &str) -> Option<f64> {
    let distance = distance.trim();
    let split = distance
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(distance.len());
    let (amount, unit) = distance.split_at(split);
    let amount: f64 = amount.trim().parse().ok()?;
    let factor = match unit.trim() {
        "" | "m" => 1.0,
        "km" => 1000.0,
        "mi" => 1609.344,
        "yd" => 0.9144,
        "ft" => 0.3048,
        _ => return None,
    };
    Some(amount * factor)
}

fn haversine((lat1, lon1): (f64, f64), (lat2, lon2): (f64, f64)) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_008.8;
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}

fn sort_keys(sort: &[Value]) -> Vec<(String, bool)> {
    sort.iter()
        .filter_map(|clause| match clause {
            Value::String(field) => Some((field.clone(), false)),
            Value::Object(map) => map.iter().next().map(|(field, options)| {
                let order = options.get("order").and_then(Value::as_str).or(options.as_str());
                (field.clone(), order == Some("desc"))
            }),
            _ => None,
        })
        .collect()
}

fn compare_documents(a: &Value, b: &Value, keys: &[(String, bool)]) -> Ordering {
    for (field, descending) in keys {
        let left = lookup(a, field).into_iter().next();
        let right = lookup(b, field).into_iter().next();
        let ordering = match (left, right) {
            (Some(l), Some(r)) => {
                let ordering = compare(l, r).unwrap_or(Ordering::Equal);
                if *descending { ordering.reverse() } else { ordering }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Apply `_source` filtering: a field list keeps only those paths.
fn project(document: &Value, source: Option<&Value>) -> Value {
    let fields: Vec<&str> = match source {
        Some(Value::Array(fields)) => fields.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(field)) => vec![field.as_str()],
        _ => return document.clone(),
    };

    let mut projected = Value::Object(Map::new());
    for field in fields {
        let mut value = document;
        let mut found = true;
        for segment in field.split('.') {
            match value.get(segment) {
                Some(next) => value = next,
                None => {
                    found = false;
                    break;
                }
            }
        }
        if !found {
            continue;
        }

        let mut target = &mut projected;
        let segments: Vec<&str> = field.split('.').collect();
        for segment in &segments[..segments.len() - 1] {
            if !target[*segment].is_object() {
                target[*segment] = Value::Object(Map::new());
            }
            target = &mut target[*segment];
        }
        target[segments[segments.len() - 1]] = value.clone();
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        json!({
            "id": "1",
            "name": "Quick brown fox",
            "age": 30,
            "tags": ["a", "b"],
            "deleted": false,
            "location": { "lat": 40.7128, "lon": -74.0060 },
            "addresses": [
                { "city": "NYC", "zip": "10001" },
                { "city": "LA", "zip": "90001" }
            ]
        })
    }

    fn eval(query: Value) -> bool {
        matches(&query, &doc(), "").unwrap()
    }

    #[test]
    fn test_term_and_terms() {
        assert!(eval(json!({ "term": { "id": "1" } })));
        assert!(eval(json!({ "term": { "tags": "b" } })));
        assert!(!eval(json!({ "term": { "deleted": true } })));
        assert!(eval(json!({ "terms": { "age": [1, 30] } })));
        assert!(!eval(json!({ "term": { "missing": false } })));
    }

    #[test]
    fn test_range_and_exists() {
        assert!(eval(json!({ "range": { "age": { "gte": 30, "lt": 31 } } })));
        assert!(!eval(json!({ "range": { "age": { "gt": 30 } } })));
        assert!(eval(json!({ "exists": { "field": "location.lat" } })));
        assert!(!eval(json!({ "exists": { "field": "email" } })));
    }

    #[test]
    fn test_text_queries() {
        assert!(eval(json!({ "match": { "name": "slow FOX" } })));
        assert!(eval(json!({ "match_phrase": { "name": "brown fox" } })));
        assert!(eval(json!({ "prefix": { "name": "Quick" } })));
        assert!(eval(json!({ "wildcard": { "name": "Qu*k?brown*" } })));
        assert!(!eval(json!({ "wildcard": { "name": "*cat*" } })));
    }

    #[test]
    fn test_glob_escapes() {
        assert!(glob(r"50\*", "50*"));
        assert!(!glob(r"50\*", "500"));
        assert!(glob(r"what\?*", "what? now"));
        assert!(!glob(r"what\?", "whats"));
        assert!(glob(r"C:\\*", r"C:\tmp"));
    }

    #[test]
    fn test_bool_semantics() {
        assert!(eval(json!({ "bool": { "filter": [{ "term": { "deleted": false } }] } })));
        assert!(eval(json!({ "bool": { "should": [{ "term": { "id": "2" } }, { "term": { "id": "1" } }] } })));
        assert!(!eval(json!({ "bool": { "should": [{ "term": { "id": "2" } }] } })));
        assert!(eval(json!({ "bool": { "must": [{ "term": { "id": "1" } }], "should": [{ "term": { "id": "2" } }] } })));
        assert!(!eval(json!({ "bool": { "must_not": [{ "term": { "id": "1" } }] } })));
    }

    #[test]
    fn test_nested_scope() {
        assert!(eval(json!({
            "nested": { "path": "addresses", "query": { "bool": { "must": [
                { "term": { "city": "LA" } },
                { "term": { "addresses.zip": "90001" } }
            ] } } }
        })));
        assert!(!eval(json!({
            "nested": { "path": "addresses", "query": { "bool": { "must": [
                { "term": { "city": "LA" } },
                { "term": { "zip": "10001" } }
            ] } } }
        })));
    }

    #[test]
    fn test_geo_distance() {
        assert!(eval(json!({ "geo_distance": { "distance": "5km", "location": { "lat": 40.73, "lon": -74.0 } } })));
        assert!(!eval(json!({ "geo_distance": { "distance": "5km", "location": { "lat": 34.05, "lon": -118.24 } } })));
    }

    #[test]
    fn test_unsupported_query() {
        assert!(matches(&json!({ "fuzzy": { "name": "fox" } }), &doc(), "").is_err());
    }

    #[test]
    fn test_projection() {
        assert_eq!(
            project(&doc(), Some(&json!(["id", "location.lat", "nope"]))),
            json!({ "id": "1", "location": { "lat": 40.7128 } })
        );
        assert_eq!(project(&doc(), None), doc());
    }

    #[test]
    fn test_merge_is_recursive() {
        let mut target = json!({ "a": { "x": 1, "y": 2 }, "b": 1 });
        let patch = json!({ "a": { "y": 3 }, "c": null });
        merge(&mut target, patch.as_object().unwrap());
        assert_eq!(target, json!({ "a": { "x": 1, "y": 3 }, "b": 1, "c": null }));
    }

    #[tokio::test]
    async fn test_document_lifecycle() {
        let store = MemoryStore::new();
        let request = StoreRequest::new("t").id("1");

        store.create(request.clone().body(json!({ "n": 1 }))).await.unwrap();
        assert!(store.create(request.clone().body(json!({}))).await.unwrap_err().is_already_exists());

        store
            .update(request.clone().body(json!({ "doc": { "n": 2 } })))
            .await
            .unwrap();
        assert_eq!(store.document("t", "1"), Some(json!({ "n": 2 })));
        assert!(store.exists(request.clone()).await.unwrap());

        store.delete(request.clone()).await.unwrap();
        assert!(store.delete(request.clone()).await.unwrap_err().is_not_found());
        assert!(store.is_empty("t"));

        assert_eq!(store.calls().len(), 6);
        assert_eq!(store.calls_to(StoreOperation::Delete).len(), 2);
    }

    #[tokio::test]
    async fn test_search_paging_and_sort() {
        let store = MemoryStore::new();
        for n in 1..=5 {
            store
                .create(StoreRequest::new("t").id(n.to_string()).body(json!({ "n": n })))
                .await
                .unwrap();
        }

        let response = store
            .search(StoreRequest::new("t").body(json!({
                "sort": [{ "n": { "order": "desc" } }],
                "size": 2,
                "from": 1,
                "query": { "range": { "n": { "gte": 2 } } }
            })))
            .await
            .unwrap();

        assert_eq!(response["hits"]["total"]["value"], 4);
        let ns: Vec<i64> = response["hits"]["hits"]
            .as_array()
            .unwrap()
            .iter()
            .map(|hit| hit["_source"]["n"].as_i64().unwrap())
            .collect();
        assert_eq!(ns, vec![4, 3]);
    }

    #[tokio::test]
    async fn test_fail_next() {
        let store = MemoryStore::new();
        store.fail_next(StoreOperation::CreateIndex, "disk full");

        let request = StoreRequest::new("t").body(json!({}));
        assert!(matches!(
            store.create_index(request.clone()).await,
            Err(ElastiqError::InvalidQuery(reason)) if reason == "disk full"
        ));
        store.create_index(request).await.unwrap();
    }

    #[tokio::test]
    async fn test_put_mapping_merges_properties() {
        let store = MemoryStore::new();
        store
            .create_index(StoreRequest::new("t").body(json!({
                "settings": {},
                "mappings": { "dynamic": "strict", "properties": { "a": { "type": "keyword" } } }
            })))
            .await
            .unwrap();
        store
            .put_mapping(StoreRequest::new("t").body(json!({ "properties": { "b": { "type": "long" } } })))
            .await
            .unwrap();

        assert_eq!(
            store.index_definition("t").unwrap()["mappings"]["properties"],
            json!({ "a": { "type": "keyword" }, "b": { "type": "long" } })
        );
    }

    #[tokio::test]
    async fn test_strict_mapping_rejects_unmapped_keys() {
        let store = MemoryStore::new();
        store
            .create_index(StoreRequest::new("t").body(json!({
                "settings": {},
                "mappings": { "dynamic": "strict", "properties": { "a": { "type": "keyword" } } }
            })))
            .await
            .unwrap();

        let request = StoreRequest::new("t").id("1");
        let err = store
            .create(request.clone().body(json!({ "a": "x", "b": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, ElastiqError::InvalidQuery(reason) if reason.contains("[b]")));
        assert!(store.is_empty("t"));

        store.create(request.clone().body(json!({ "a": "x" }))).await.unwrap();
        assert!(store
            .update(request.clone().body(json!({ "doc": { "c": true } })))
            .await
            .is_err());
        assert_eq!(store.document("t", "1"), Some(json!({ "a": "x" })));

        store
            .create(StoreRequest::new("loose").id("1").body(json!({ "anything": 1 })))
            .await
            .unwrap();
    }
}

//! Accumulator for one query in progress.

use crate::query::{Aggregation, BoolQuery, Clause, Query, SortOrder};
use serde_json::{Map, Value, json};

/// Name of the soft-delete flag every document carries.
pub const DELETED_FIELD: &str = "deleted";

/// Boolean-query tree, body parameters and aggregations for one search.
///
/// Serialization is non-destructive: [`to_json`](Self::to_json) can be
/// called any number of times and always reflects the current state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryContext {
    index: Option<String>,
    additional_indices: Vec<String>,
    query: BoolQuery,
    source: Option<Vec<String>>,
    sort: Vec<Value>,
    size: Option<u64>,
    from: Option<u64>,
    aggs: Vec<(String, Aggregation)>,
}

impl QueryContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty context targeting `index`.
    pub fn for_index(index: impl Into<String>) -> Self {
        Self {
            index: Some(index.into()),
            ..Self::default()
        }
    }

    /// Set the primary index.
    pub fn set_index(&mut self, index: impl Into<String>) {
        self.index = Some(index.into());
    }

    /// Primary index.
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Search an additional index alongside the primary one.
    pub fn add_index(&mut self, index: impl Into<String>) {
        let index = index.into();
        if !self.additional_indices.contains(&index) {
            self.additional_indices.push(index);
        }
    }

    /// Additional indices, in the order they were added.
    pub fn additional_indices(&self) -> &[String] {
        &self.additional_indices
    }

    /// Index parameter: the primary index, comma-joined with any additional ones.
    pub fn index_param(&self) -> Option<String> {
        let primary = self.index.as_deref()?;
        if self.additional_indices.is_empty() {
            return Some(primary.to_string());
        }
        let mut indices = vec![primary];
        indices.extend(self.additional_indices.iter().map(String::as_str));
        Some(indices.join(","))
    }

    /// Append a condition to one bool clause.
    pub fn add_condition(&mut self, condition: Query, clause: Clause) {
        self.query.push(clause, condition);
    }

    /// Accumulated bool query, without the soft-delete filter.
    pub fn bool_query(&self) -> &BoolQuery {
        &self.query
    }

    /// Restrict `_source` to `fields`.
    pub fn set_source(&mut self, fields: Vec<String>) {
        self.source = Some(fields);
    }

    /// Append a sort clause.
    pub fn add_sort(&mut self, field: impl Into<String>, order: SortOrder) {
        let mut clause = Map::new();
        clause.insert(field.into(), json!({ "order": order.as_str() }));
        self.sort.push(Value::Object(clause));
    }

    /// Maximum number of hits.
    pub fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    /// Number of hits to skip.
    pub fn set_from(&mut self, from: u64) {
        self.from = Some(from);
    }

    /// Add or replace a named aggregation.
    pub fn add_aggregation(&mut self, name: impl Into<String>, aggregation: Aggregation) {
        let name = name.into();
        match self.aggs.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = aggregation,
            None => self.aggs.push((name, aggregation)),
        }
    }

    /// Whether any aggregation was requested.
    pub fn has_aggregations(&self) -> bool {
        !self.aggs.is_empty()
    }

    /// Search payload: `{index, body: {_source?, sort?, size?, from?, query, aggs?}}`.
    ///
    /// The `filter` clause always holds exactly one `{term: {deleted: false}}`
    /// next to the caller's filters, deduplicated by value, first occurrence
    /// kept.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();

        if let Some(source) = &self.source {
            body.insert("_source".to_string(), json!(source));
        }
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), Value::Array(self.sort.clone()));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        body.insert("query".to_string(), self.query_json());

        if !self.aggs.is_empty() {
            let aggs: Map<String, Value> = self
                .aggs
                .iter()
                .map(|(name, aggregation)| (name.clone(), aggregation.to_json()))
                .collect();
            body.insert("aggs".to_string(), Value::Object(aggs));
        }

        json!({ "index": self.index_param(), "body": body })
    }

    /// Count payload: `{index, body: {query}}`.
    pub fn count_json(&self) -> Value {
        json!({ "index": self.index_param(), "body": { "query": self.query_json() } })
    }

    fn query_json(&self) -> Value {
        let mut bool_query = match self.query.to_json() {
            Value::Object(mut wrapper) => match wrapper.remove("bool") {
                Some(Value::Object(inner)) => inner,
                _ => Map::new(),
            },
            _ => Map::new(),
        };

        let mut filter: Vec<Value> = Vec::with_capacity(self.query.filter.len() + 1);
        let candidates = self
            .query
            .filter
            .iter()
            .map(Query::to_json)
            .chain(std::iter::once(not_deleted()));
        for condition in candidates {
            if !filter.contains(&condition) {
                filter.push(condition);
            }
        }
        bool_query.insert("filter".to_string(), Value::Array(filter));

        json!({ "bool": bool_query })
    }

    /// Clear query, body parameters and aggregations; keep the indices.
    pub fn reset(&mut self) {
        self.query = BoolQuery::new();
        self.source = None;
        self.sort.clear();
        self.size = None;
        self.from = None;
        self.aggs.clear();
    }

    /// Clear everything, indices included.
    pub fn reset_all(&mut self) {
        *self = Self::default();
    }
}

/// The implicit soft-delete filter.
pub fn not_deleted() -> Value {
    json!({ "term": { DELETED_FIELD: false } })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(payload: &Value) -> &Vec<Value> {
        payload["body"]["query"]["bool"]["filter"].as_array().unwrap()
    }

    #[test]
    fn test_empty_context_has_soft_delete_filter() {
        let context = QueryContext::for_index("orders");
        assert_eq!(
            context.to_json(),
            json!({
                "index": "orders",
                "body": { "query": { "bool": { "filter": [{ "term": { "deleted": false } }] } } }
            })
        );
    }

    #[test]
    fn test_to_json_is_idempotent() {
        let mut context = QueryContext::for_index("orders");
        context.add_condition(Query::term("status", "open"), Clause::Filter);
        let first = context.to_json();
        let second = context.to_json();
        assert_eq!(first, second);
        assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
        assert_eq!(filters(&second).len(), 2);
    }

    #[test]
    fn test_manual_deleted_filter_is_deduplicated() {
        let mut context = QueryContext::for_index("orders");
        context.add_condition(Query::term("deleted", false), Clause::Filter);
        context.add_condition(Query::Raw(not_deleted()), Clause::Filter);
        context.add_condition(Query::term("status", "open"), Clause::Filter);
        context.add_condition(Query::term("status", "open"), Clause::Filter);

        let payload = context.to_json();
        assert_eq!(
            filters(&payload),
            &vec![
                json!({ "term": { "deleted": false } }),
                json!({ "term": { "status": "open" } }),
            ]
        );
    }

    #[test]
    fn test_condition_order_is_kept() {
        let mut context = QueryContext::for_index("t");
        context.add_condition(Query::term("a", 1), Clause::Must);
        context.add_condition(Query::term("b", 2), Clause::Must);

        assert_eq!(
            context.to_json()["body"]["query"]["bool"]["must"],
            json!([{ "term": { "a": 1 } }, { "term": { "b": 2 } }])
        );
    }

    #[test]
    fn test_body_parameter_order() {
        let mut context = QueryContext::for_index("t");
        context.add_aggregation("by_status", Aggregation::terms("status"));
        context.set_from(20);
        context.set_size(10);
        context.add_sort("created_at", SortOrder::Desc);
        context.set_source(vec!["id".to_string()]);

        let payload = context.to_json();
        let keys: Vec<&String> = payload["body"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["_source", "sort", "size", "from", "query", "aggs"]);
        assert_eq!(payload["body"]["sort"], json!([{ "created_at": { "order": "desc" } }]));
        assert_eq!(
            payload["body"]["aggs"],
            json!({ "by_status": { "terms": { "field": "status" } } })
        );
    }

    #[test]
    fn test_additional_indices() {
        let mut context = QueryContext::for_index("logs-2024");
        context.add_index("logs-2025");
        context.add_index("logs-2025");
        assert_eq!(context.to_json()["index"], "logs-2024,logs-2025");
    }

    #[test]
    fn test_count_json_has_only_query() {
        let mut context = QueryContext::for_index("t");
        context.set_size(5);
        context.add_sort("x", SortOrder::Asc);
        context.add_aggregation("n", Aggregation::sum("x"));

        let payload = context.count_json();
        let keys: Vec<&String> = payload["body"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["query"]);
    }

    #[test]
    fn test_reset_keeps_index() {
        let mut context = QueryContext::for_index("t");
        context.add_index("u");
        context.add_condition(Query::term("a", 1), Clause::Must);
        context.set_size(1);

        context.reset();
        assert_eq!(context.to_json(), {
            let mut fresh = QueryContext::for_index("t");
            fresh.add_index("u");
            fresh.to_json()
        });

        context.reset_all();
        assert_eq!(context, QueryContext::new());
        assert!(context.index().is_none());
    }
}

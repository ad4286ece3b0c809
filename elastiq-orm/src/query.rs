//! Query DSL fragments.

use crate::error::ElastiqError;
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;

/// A single query clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Match all documents.
    MatchAll,
    /// Exact value match.
    Term {
        /// Field name.
        field: String,
        /// Exact value to match.
        value: Value,
    },
    /// Match any of several exact values.
    Terms {
        /// Field name.
        field: String,
        /// Values to match.
        values: Vec<Value>,
    },
    /// Numeric or date range.
    Range(RangeQuery),
    /// Full-text match.
    Match {
        /// Field to search.
        field: String,
        /// Search query.
        query: Value,
    },
    /// Full-text phrase match.
    MatchPhrase {
        /// Field to search.
        field: String,
        /// Phrase.
        query: Value,
    },
    /// Prefix match.
    Prefix {
        /// Field name.
        field: String,
        /// Prefix value.
        value: String,
    },
    /// Wildcard pattern (`*`, `?`).
    Wildcard {
        /// Field name.
        field: String,
        /// Wildcard pattern.
        value: String,
    },
    /// Field has a value.
    Exists {
        /// Field name.
        field: String,
    },
    /// Query against nested documents.
    Nested(NestedQuery),
    /// Points within a distance of a location.
    GeoDistance {
        /// Geo point field.
        field: String,
        /// Latitude of the origin.
        lat: f64,
        /// Longitude of the origin.
        lon: f64,
        /// Radius, e.g. `"10km"`.
        distance: String,
    },
    /// Boolean combination of clauses.
    Bool(BoolQuery),
    /// Raw JSON query.
    Raw(Value),
}

impl Query {
    /// Term query.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Terms query.
    pub fn terms(field: impl Into<String>, values: Vec<Value>) -> Self {
        Query::Terms {
            field: field.into(),
            values,
        }
    }

    /// Match query.
    pub fn matches(field: impl Into<String>, query: impl Into<Value>) -> Self {
        Query::Match {
            field: field.into(),
            query: query.into(),
        }
    }

    /// Match phrase query.
    pub fn match_phrase(field: impl Into<String>, query: impl Into<Value>) -> Self {
        Query::MatchPhrase {
            field: field.into(),
            query: query.into(),
        }
    }

    /// Prefix query.
    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Prefix {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wildcard query.
    pub fn wildcard(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Wildcard {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Exists query.
    pub fn exists(field: impl Into<String>) -> Self {
        Query::Exists {
            field: field.into(),
        }
    }

    /// Nested query over `path`.
    pub fn nested(path: impl Into<String>, query: Query) -> Self {
        Query::Nested(NestedQuery::new(path, query))
    }

    /// Geo distance query.
    pub fn geo_distance(
        field: impl Into<String>,
        lat: f64,
        lon: f64,
        distance: impl Into<String>,
    ) -> Self {
        Query::GeoDistance {
            field: field.into(),
            lat,
            lon,
            distance: distance.into(),
        }
    }

    /// Convert query to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Term { field, value } => json!({ "term": { field: value } }),
            Query::Terms { field, values } => json!({ "terms": { field: values } }),
            Query::Range(r) => r.to_json(),
            Query::Match { field, query } => json!({ "match": { field: query } }),
            Query::MatchPhrase { field, query } => json!({ "match_phrase": { field: query } }),
            Query::Prefix { field, value } => json!({ "prefix": { field: value } }),
            Query::Wildcard { field, value } => json!({ "wildcard": { field: value } }),
            Query::Exists { field } => json!({ "exists": { "field": field } }),
            Query::Nested(n) => n.to_json(),
            Query::GeoDistance {
                field,
                lat,
                lon,
                distance,
            } => json!({
                "geo_distance": {
                    "distance": distance,
                    field: { "lat": lat, "lon": lon }
                }
            }),
            Query::Bool(b) => b.to_json(),
            Query::Raw(v) => v.clone(),
        }
    }
}

/// Range query for numeric/date ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    /// Field name.
    pub field: String,
    /// Greater than.
    pub gt: Option<Value>,
    /// Greater than or equal.
    pub gte: Option<Value>,
    /// Less than.
    pub lt: Option<Value>,
    /// Less than or equal.
    pub lte: Option<Value>,
    /// Date format (for date fields).
    pub format: Option<String>,
}

impl RangeQuery {
    /// Create an unbounded range query.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            gt: None,
            gte: None,
            lt: None,
            lte: None,
            format: None,
        }
    }

    /// Set greater than.
    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.gt = Some(value.into());
        self
    }

    /// Set greater than or equal.
    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.gte = Some(value.into());
        self
    }

    /// Set less than.
    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// Set less than or equal.
    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.lte = Some(value.into());
        self
    }

    /// Set date format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut range = Map::new();

        if let Some(v) = &self.gt {
            range.insert("gt".to_string(), v.clone());
        }
        if let Some(v) = &self.gte {
            range.insert("gte".to_string(), v.clone());
        }
        if let Some(v) = &self.lt {
            range.insert("lt".to_string(), v.clone());
        }
        if let Some(v) = &self.lte {
            range.insert("lte".to_string(), v.clone());
        }
        if let Some(v) = &self.format {
            range.insert("format".to_string(), json!(v));
        }

        json!({ "range": { &self.field: range } })
    }
}

impl From<RangeQuery> for Query {
    fn from(range: RangeQuery) -> Self {
        Query::Range(range)
    }
}

/// Nested query.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedQuery {
    /// Path to nested field.
    pub path: String,
    /// Inner query.
    pub query: Box<Query>,
    /// Score mode.
    pub score_mode: Option<String>,
}

impl NestedQuery {
    /// Query `path` documents with `query`.
    pub fn new(path: impl Into<String>, query: Query) -> Self {
        Self {
            path: path.into(),
            query: Box::new(query),
            score_mode: None,
        }
    }

    fn to_json(&self) -> Value {
        let mut nested = json!({
            "path": self.path,
            "query": self.query.to_json()
        });

        if let Some(mode) = &self.score_mode {
            nested["score_mode"] = json!(mode);
        }

        json!({ "nested": nested })
    }
}

/// Occurrence type of a clause inside a bool query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Clause {
    /// Must match, contributes to score.
    #[default]
    Must,
    /// Should match.
    Should,
    /// Must not match.
    MustNot,
    /// Must match, no scoring.
    Filter,
}

impl Clause {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Clause::Must => "must",
            Clause::Should => "should",
            Clause::MustNot => "must_not",
            Clause::Filter => "filter",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Clause {
    type Err = ElastiqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "must" => Ok(Clause::Must),
            "should" => Ok(Clause::Should),
            "must_not" => Ok(Clause::MustNot),
            "filter" => Ok(Clause::Filter),
            other => Err(ElastiqError::InvalidArgument(format!(
                "unknown bool clause '{}'",
                other
            ))),
        }
    }
}

/// Bool query for combining multiple queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// Must match (AND).
    pub must: Vec<Query>,
    /// Should match (OR).
    pub should: Vec<Query>,
    /// Must not match (NOT).
    pub must_not: Vec<Query>,
    /// Filter (non-scoring).
    pub filter: Vec<Query>,
    /// Minimum should match.
    pub minimum_should_match: Option<i32>,
}

impl BoolQuery {
    /// Create a new bool query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `query` to `clause`, keeping insertion order.
    pub fn push(&mut self, clause: Clause, query: Query) {
        self.clause_mut(clause).push(query);
    }

    /// Clauses of one occurrence type.
    pub fn clause(&self, clause: Clause) -> &[Query] {
        match clause {
            Clause::Must => &self.must,
            Clause::Should => &self.should,
            Clause::MustNot => &self.must_not,
            Clause::Filter => &self.filter,
        }
    }

    fn clause_mut(&mut self, clause: Clause) -> &mut Vec<Query> {
        match clause {
            Clause::Must => &mut self.must,
            Clause::Should => &mut self.should,
            Clause::MustNot => &mut self.must_not,
            Clause::Filter => &mut self.filter,
        }
    }

    /// Whether no clause has been added.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.must_not.is_empty()
            && self.filter.is_empty()
    }

    /// Convert to `{bool: {...}}`, omitting empty clause lists.
    pub fn to_json(&self) -> Value {
        let mut bool_query = Map::new();

        for clause in [Clause::Must, Clause::Should, Clause::MustNot, Clause::Filter] {
            let queries = self.clause(clause);
            if !queries.is_empty() {
                bool_query.insert(
                    clause.as_str().to_string(),
                    Value::Array(queries.iter().map(|q| q.to_json()).collect()),
                );
            }
        }
        if let Some(min) = self.minimum_should_match {
            bool_query.insert("minimum_should_match".to_string(), json!(min));
        }

        json!({ "bool": bool_query })
    }
}

impl From<BoolQuery> for Query {
    fn from(bool_query: BoolQuery) -> Self {
        Query::Bool(bool_query)
    }
}

/// Sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = ElastiqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ElastiqError::InvalidArgument(format!(
                "unknown sort order '{}'",
                other
            ))),
        }
    }
}

/// Aggregation types.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Terms aggregation.
    Terms {
        /// Field to aggregate on.
        field: String,
        /// Maximum number of buckets.
        size: Option<i64>,
    },
    /// Date histogram aggregation.
    DateHistogram {
        /// Field containing dates.
        field: String,
        /// Calendar interval (day, week, month, etc.).
        calendar_interval: Option<String>,
        /// Fixed interval (1d, 1h, etc.).
        fixed_interval: Option<String>,
    },
    /// Histogram aggregation.
    Histogram {
        /// Field to aggregate on.
        field: String,
        /// Bucket interval.
        interval: f64,
    },
    /// Range aggregation.
    Range {
        /// Field to aggregate on.
        field: String,
        /// Range definitions.
        ranges: Vec<RangeBucket>,
    },
    /// Avg aggregation.
    Avg {
        /// Field to average.
        field: String,
    },
    /// Sum aggregation.
    Sum {
        /// Field to sum.
        field: String,
    },
    /// Min aggregation.
    Min {
        /// Field to find minimum.
        field: String,
    },
    /// Max aggregation.
    Max {
        /// Field to find maximum.
        field: String,
    },
    /// Cardinality (unique count) aggregation.
    Cardinality {
        /// Field to count unique values.
        field: String,
    },
    /// Number of values extracted.
    ValueCount {
        /// Field to count.
        field: String,
    },
    /// Raw aggregation JSON.
    Raw(Value),
}

impl Aggregation {
    /// Create a terms aggregation.
    pub fn terms(field: impl Into<String>) -> Self {
        Aggregation::Terms {
            field: field.into(),
            size: None,
        }
    }

    /// Create a calendar-interval date histogram.
    pub fn date_histogram(field: impl Into<String>, calendar_interval: impl Into<String>) -> Self {
        Aggregation::DateHistogram {
            field: field.into(),
            calendar_interval: Some(calendar_interval.into()),
            fixed_interval: None,
        }
    }

    /// Create a histogram aggregation.
    pub fn histogram(field: impl Into<String>, interval: f64) -> Self {
        Aggregation::Histogram {
            field: field.into(),
            interval,
        }
    }

    /// Create a range aggregation.
    pub fn range(field: impl Into<String>, ranges: Vec<RangeBucket>) -> Self {
        Aggregation::Range {
            field: field.into(),
            ranges,
        }
    }

    /// Create an average aggregation.
    pub fn avg(field: impl Into<String>) -> Self {
        Aggregation::Avg {
            field: field.into(),
        }
    }

    /// Create a sum aggregation.
    pub fn sum(field: impl Into<String>) -> Self {
        Aggregation::Sum {
            field: field.into(),
        }
    }

    /// Create a min aggregation.
    pub fn min(field: impl Into<String>) -> Self {
        Aggregation::Min {
            field: field.into(),
        }
    }

    /// Create a max aggregation.
    pub fn max(field: impl Into<String>) -> Self {
        Aggregation::Max {
            field: field.into(),
        }
    }

    /// Create a cardinality aggregation.
    pub fn cardinality(field: impl Into<String>) -> Self {
        Aggregation::Cardinality {
            field: field.into(),
        }
    }

    /// Create a value count aggregation.
    pub fn value_count(field: impl Into<String>) -> Self {
        Aggregation::ValueCount {
            field: field.into(),
        }
    }

    /// Convert to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Aggregation::Terms { field, size } => {
                let mut terms = json!({ "field": field });
                if let Some(s) = size {
                    terms["size"] = json!(s);
                }
                json!({ "terms": terms })
            }
            Aggregation::DateHistogram {
                field,
                calendar_interval,
                fixed_interval,
            } => {
                let mut dh = json!({ "field": field });
                if let Some(ci) = calendar_interval {
                    dh["calendar_interval"] = json!(ci);
                }
                if let Some(fi) = fixed_interval {
                    dh["fixed_interval"] = json!(fi);
                }
                json!({ "date_histogram": dh })
            }
            Aggregation::Histogram { field, interval } => {
                json!({ "histogram": { "field": field, "interval": interval } })
            }
            Aggregation::Range { field, ranges } => {
                let ranges: Vec<Value> = ranges.iter().map(|r| r.to_json()).collect();
                json!({ "range": { "field": field, "ranges": ranges } })
            }
            Aggregation::Avg { field } => json!({ "avg": { "field": field } }),
            Aggregation::Sum { field } => json!({ "sum": { "field": field } }),
            Aggregation::Min { field } => json!({ "min": { "field": field } }),
            Aggregation::Max { field } => json!({ "max": { "field": field } }),
            Aggregation::Cardinality { field } => json!({ "cardinality": { "field": field } }),
            Aggregation::ValueCount { field } => json!({ "value_count": { "field": field } }),
            Aggregation::Raw(v) => v.clone(),
        }
    }
}

/// Range bucket definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBucket {
    /// Optional key.
    pub key: Option<String>,
    /// From value (inclusive).
    pub from: Option<f64>,
    /// To value (exclusive).
    pub to: Option<f64>,
}

impl RangeBucket {
    /// Bucket covering `[from, to)`.
    pub fn between(from: f64, to: f64) -> Self {
        Self {
            key: None,
            from: Some(from),
            to: Some(to),
        }
    }

    /// Name the bucket.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut bucket = Map::new();
        if let Some(k) = &self.key {
            bucket.insert("key".to_string(), json!(k));
        }
        if let Some(f) = self.from {
            bucket.insert("from".to_string(), json!(f));
        }
        if let Some(t) = self.to {
            bucket.insert("to".to_string(), json!(t));
        }
        Value::Object(bucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_queries() {
        assert_eq!(Query::term("id", "abc").to_json(), json!({ "term": { "id": "abc" } }));
        assert_eq!(
            Query::terms("tag", vec![json!("a"), json!("b")]).to_json(),
            json!({ "terms": { "tag": ["a", "b"] } })
        );
        assert_eq!(
            Query::exists("email").to_json(),
            json!({ "exists": { "field": "email" } })
        );
        assert_eq!(
            Query::match_phrase("title", "quick fox").to_json(),
            json!({ "match_phrase": { "title": "quick fox" } })
        );
    }

    #[test]
    fn test_range_only_set_bounds() {
        let range = RangeQuery::new("age").gte(18).lt(65);
        assert_eq!(
            Query::from(range).to_json(),
            json!({ "range": { "age": { "gte": 18, "lt": 65 } } })
        );
    }

    #[test]
    fn test_geo_distance() {
        assert_eq!(
            Query::geo_distance("location", 40.7, -74.0, "5km").to_json(),
            json!({
                "geo_distance": {
                    "distance": "5km",
                    "location": { "lat": 40.7, "lon": -74.0 }
                }
            })
        );
    }

    #[test]
    fn test_bool_omits_empty_clauses() {
        let mut bool_query = BoolQuery::new();
        assert!(bool_query.is_empty());
        assert_eq!(bool_query.to_json(), json!({ "bool": {} }));

        bool_query.push(Clause::Should, Query::term("a", 1));
        bool_query.push(Clause::Should, Query::term("b", 2));
        assert_eq!(
            bool_query.to_json(),
            json!({ "bool": { "should": [{ "term": { "a": 1 } }, { "term": { "b": 2 } }] } })
        );
    }

    #[test]
    fn test_nested_wraps_bool() {
        let mut inner = BoolQuery::new();
        inner.push(Clause::Must, Query::term("city", "NYC"));

        assert_eq!(
            Query::nested("addresses", inner.into()).to_json(),
            json!({
                "nested": {
                    "path": "addresses",
                    "query": { "bool": { "must": [{ "term": { "city": "NYC" } }] } }
                }
            })
        );
    }

    #[test]
    fn test_clause_parse() {
        assert_eq!("must_not".parse::<Clause>().unwrap(), Clause::MustNot);
        assert!("mustnt".parse::<Clause>().is_err());
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
    }

    #[test]
    fn test_aggregations() {
        assert_eq!(
            Aggregation::terms("status").to_json(),
            json!({ "terms": { "field": "status" } })
        );
        assert_eq!(
            Aggregation::date_histogram("created_at", "day").to_json(),
            json!({ "date_histogram": { "field": "created_at", "calendar_interval": "day" } })
        );
        assert_eq!(
            Aggregation::range("price", vec![RangeBucket::between(0.0, 10.0).key("cheap")])
                .to_json(),
            json!({
                "range": {
                    "field": "price",
                    "ranges": [{ "key": "cheap", "from": 0.0, "to": 10.0 }]
                }
            })
        );
        assert_eq!(
            Aggregation::value_count("id").to_json(),
            json!({ "value_count": { "field": "id" } })
        );
    }
}

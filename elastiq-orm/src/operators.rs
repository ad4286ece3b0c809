//! Comparison operator strategies.
//!
//! A `where` call names an operator token (`=`, `>=`, `like`, ...). The
//! [`OperatorRegistry`] maps each normalised token to exactly one
//! [`OperatorStrategy`], which turns `(field, operator, value)` into a
//! [`Query`].

use crate::error::{ElastiqError, Result};
use crate::query::{BoolQuery, Clause, Query, RangeQuery};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a query clause for the operators it claims.
pub trait OperatorStrategy: Send + Sync {
    /// Operator tokens handled by this strategy, lowercase.
    fn operators(&self) -> &[&'static str];

    /// Build the clause for `field <operator> value`.
    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query>;
}

/// Normalise an operator token for lookup.
pub fn normalize(operator: &str) -> String {
    operator
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// `=`, `==`: term, or terms when the value is an array.
#[derive(Debug, Default)]
pub struct EqualityStrategy;

impl OperatorStrategy for EqualityStrategy {
    fn operators(&self) -> &[&'static str] {
        &["=", "=="]
    }

    fn build(&self, field: &str, _operator: &str, value: &Value) -> Result<Query> {
        Ok(match value {
            Value::Array(values) => Query::terms(field, values.clone()),
            other => Query::term(field, other.clone()),
        })
    }
}

/// `!=`, `<>`: negated term.
#[derive(Debug, Default)]
pub struct InequalityStrategy;

impl OperatorStrategy for InequalityStrategy {
    fn operators(&self) -> &[&'static str] {
        &["!=", "<>"]
    }

    fn build(&self, field: &str, _operator: &str, value: &Value) -> Result<Query> {
        Ok(negate(Query::term(field, value.clone())))
    }
}

/// `>`, `>=`, `<`, `<=`: one-sided range.
#[derive(Debug, Default)]
pub struct ComparisonStrategy;

impl OperatorStrategy for ComparisonStrategy {
    fn operators(&self) -> &[&'static str] {
        &[">", ">=", "<", "<="]
    }

    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        scalar(operator, value)?;
        let range = RangeQuery::new(field);
        let range = match operator {
            ">" => range.gt(value.clone()),
            ">=" => range.gte(value.clone()),
            "<" => range.lt(value.clone()),
            "<=" => range.lte(value.clone()),
            other => return Err(ElastiqError::UnsupportedOperator(other.to_string())),
        };
        Ok(range.into())
    }
}

/// `between`: inclusive range from a `[low, high]` pair.
#[derive(Debug, Default)]
pub struct BetweenStrategy;

impl OperatorStrategy for BetweenStrategy {
    fn operators(&self) -> &[&'static str] {
        &["between"]
    }

    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        match value.as_array().map(Vec::as_slice) {
            Some([low, high]) => Ok(RangeQuery::new(field)
                .gte(low.clone())
                .lte(high.clone())
                .into()),
            _ => Err(ElastiqError::InvalidArgument(format!(
                "'{}' expects a [low, high] pair, got {}",
                operator, value
            ))),
        }
    }
}

/// `in`, `not in`: membership in a list.
#[derive(Debug, Default)]
pub struct MembershipStrategy;

impl OperatorStrategy for MembershipStrategy {
    fn operators(&self) -> &[&'static str] {
        &["in", "not in"]
    }

    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        let values = match value {
            Value::Array(values) => values.clone(),
            _ => {
                return Err(ElastiqError::InvalidArgument(format!(
                    "'{}' expects an array, got {}",
                    operator, value
                )));
            }
        };
        let query = Query::terms(field, values);
        Ok(if operator == "not in" {
            negate(query)
        } else {
            query
        })
    }
}

/// `like`, `not like`: SQL pattern as a wildcard query.
#[derive(Debug, Default)]
pub struct PatternStrategy;

impl PatternStrategy {
    /// Translate `%` and `_` into `*` and `?`. Literal `*`, `?` and `\`
    /// are escaped first.
    pub fn to_wildcard(pattern: &str) -> String {
        let mut wildcard = String::with_capacity(pattern.len());
        for c in pattern.chars() {
            match c {
                '%' => wildcard.push('*'),
                '_' => wildcard.push('?'),
                '*' | '?' | '\\' => {
                    wildcard.push('\\');
                    wildcard.push(c);
                }
                other => wildcard.push(other),
            }
        }
        wildcard
    }
}

impl OperatorStrategy for PatternStrategy {
    fn operators(&self) -> &[&'static str] {
        &["like", "not like"]
    }

    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        let pattern = string(operator, value)?;
        let query = Query::wildcard(field, Self::to_wildcard(pattern));
        Ok(if operator == "not like" {
            negate(query)
        } else {
            query
        })
    }
}

/// `match`, `match_phrase`: full-text queries.
#[derive(Debug, Default)]
pub struct FullTextStrategy;

impl OperatorStrategy for FullTextStrategy {
    fn operators(&self) -> &[&'static str] {
        &["match", "match_phrase"]
    }

    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        scalar(operator, value)?;
        Ok(if operator == "match_phrase" {
            Query::match_phrase(field, value.clone())
        } else {
            Query::matches(field, value.clone())
        })
    }
}

/// `prefix`.
#[derive(Debug, Default)]
pub struct PrefixStrategy;

impl OperatorStrategy for PrefixStrategy {
    fn operators(&self) -> &[&'static str] {
        &["prefix"]
    }

    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        Ok(Query::prefix(field, string(operator, value)?))
    }
}

/// `exists`: `true` for present, `false` for missing.
#[derive(Debug, Default)]
pub struct ExistenceStrategy;

impl OperatorStrategy for ExistenceStrategy {
    fn operators(&self) -> &[&'static str] {
        &["exists"]
    }

    fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        match value {
            Value::Bool(true) => Ok(Query::exists(field)),
            Value::Bool(false) => Ok(negate(Query::exists(field))),
            _ => Err(ElastiqError::InvalidArgument(format!(
                "'{}' expects a boolean, got {}",
                operator, value
            ))),
        }
    }
}

fn negate(query: Query) -> Query {
    let mut bool_query = BoolQuery::new();
    bool_query.push(Clause::MustNot, query);
    Query::Bool(bool_query)
}

fn scalar(operator: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Null => Err(ElastiqError::InvalidArgument(
            format!("'{}' expects a scalar, got {}", operator, value),
        )),
        _ => Ok(()),
    }
}

fn string<'a>(operator: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        ElastiqError::InvalidArgument(format!("'{}' expects a string, got {}", operator, value))
    })
}

/// Token to strategy dictionary.
///
/// Every token maps to exactly one strategy; registering a strategy that
/// claims a token already taken fails and leaves the registry unchanged.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
    strategies: HashMap<String, Arc<dyn OperatorStrategy>>,
}

impl OperatorRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in strategies.
    pub fn new() -> Self {
        let builtins: [Arc<dyn OperatorStrategy>; 9] = [
            Arc::new(EqualityStrategy),
            Arc::new(InequalityStrategy),
            Arc::new(ComparisonStrategy),
            Arc::new(BetweenStrategy),
            Arc::new(MembershipStrategy),
            Arc::new(PatternStrategy),
            Arc::new(FullTextStrategy),
            Arc::new(PrefixStrategy),
            Arc::new(ExistenceStrategy),
        ];

        let mut registry = Self::empty();
        for strategy in builtins {
            for operator in strategy.operators() {
                registry
                    .strategies
                    .insert(normalize(operator), Arc::clone(&strategy));
            }
        }
        registry
    }

    /// Register a strategy for all tokens it claims.
    pub fn register(&mut self, strategy: Arc<dyn OperatorStrategy>) -> Result<()> {
        let operators: Vec<String> = strategy.operators().iter().map(|op| normalize(op)).collect();

        for (i, operator) in operators.iter().enumerate() {
            if self.strategies.contains_key(operator) || operators[..i].contains(operator) {
                return Err(ElastiqError::ConflictingOperator(operator.clone()));
            }
        }

        for operator in operators {
            self.strategies.insert(operator, Arc::clone(&strategy));
        }
        Ok(())
    }

    /// Whether a strategy handles `operator`.
    pub fn supports(&self, operator: &str) -> bool {
        self.strategies.contains_key(&normalize(operator))
    }

    /// Registered tokens, sorted.
    pub fn operators(&self) -> Vec<&str> {
        let mut operators: Vec<&str> = self.strategies.keys().map(String::as_str).collect();
        operators.sort_unstable();
        operators
    }

    /// Build the clause for `field <operator> value`.
    pub fn build(&self, field: &str, operator: &str, value: &Value) -> Result<Query> {
        let token = normalize(operator);
        let strategy = self
            .strategies
            .get(&token)
            .ok_or_else(|| ElastiqError::UnsupportedOperator(operator.to_string()))?;
        strategy.build(field, &token, value)
    }
}

impl fmt::Debug for OperatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("operators", &self.operators())
            .finish()
    }
}

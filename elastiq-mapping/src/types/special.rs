//! Alias, join and parameterless field types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `alias` field pointing at another field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AliasField {
    path: String,
}

impl AliasField {
    /// Alias for the field at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Target path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// `join` field defining parent/child relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinField {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    relations: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eager_global_ordinals: Option<bool>,
}

impl JoinField {
    /// Declare `parent` as the parent of `children`.
    pub fn relation<I, S>(&mut self, parent: impl Into<String>, children: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let children = children
            .into_iter()
            .map(|child| Value::String(child.into()))
            .collect();
        self.relations.insert(parent.into(), Value::Array(children));
        self
    }

    option_setters! {
        /// Load global ordinals on refresh.
        eager_global_ordinals: bool;
    }
}

/// `percolator` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PercolatorField {}

/// `histogram` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistogramField {}

/// `version` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionField {}

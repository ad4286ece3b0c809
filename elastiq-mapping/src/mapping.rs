//! Index mapping definitions.

use crate::properties::{Properties, PropertyBuilder};
use crate::types::Dynamic;
use serde_json::{Map, Value, json};

/// Root definition of one index: settings plus a property tree.
///
/// ```rust
/// use elastiq_mapping::{Mapping, PropertyBuilder};
/// use serde_json::json;
///
/// let mut mapping = Mapping::new("users");
/// mapping.shards(1).replicas(0);
/// mapping.keyword("email");
/// mapping.nested("addresses").keyword("city");
///
/// let body = mapping.body();
/// assert_eq!(body["index"], "users");
/// assert_eq!(body["body"]["mappings"]["dynamic"], "strict");
/// assert_eq!(
///     body["body"]["mappings"]["properties"]["addresses"],
///     json!({ "type": "nested", "properties": { "city": { "type": "keyword" } } })
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Mapping {
    name: String,
    settings: Map<String, Value>,
    dynamic: Dynamic,
    properties: Properties,
}

impl Mapping {
    /// Create an empty mapping for index `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: Map::new(),
            dynamic: Dynamic::Strict,
            properties: Properties::new(),
        }
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index settings.
    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// Root properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Handling of unmapped fields at the root.
    pub fn dynamic(&mut self, dynamic: Dynamic) -> &mut Self {
        self.dynamic = dynamic;
        self
    }

    /// Set an arbitrary index setting.
    pub fn setting(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Number of primary shards.
    pub fn shards(&mut self, shards: u32) -> &mut Self {
        self.setting("number_of_shards", shards)
    }

    /// Number of replicas per shard.
    pub fn replicas(&mut self, replicas: u32) -> &mut Self {
        self.setting("number_of_replicas", replicas)
    }

    /// Refresh interval, e.g. `"1s"` or `"-1"`.
    pub fn refresh_interval(&mut self, interval: impl Into<String>) -> &mut Self {
        self.setting("refresh_interval", interval.into())
    }

    /// Analysis settings (analyzers, tokenizers, filters).
    pub fn analysis(&mut self, analysis: Value) -> &mut Self {
        self.setting("analysis", analysis)
    }

    /// Property map as sent to the store.
    pub fn get_properties(&self) -> Value {
        self.properties.to_json()
    }

    /// Index creation payload.
    pub fn body(&self) -> Value {
        json!({
            "index": self.name,
            "body": {
                "settings": self.settings,
                "mappings": {
                    "dynamic": self.dynamic,
                    "properties": self.get_properties(),
                }
            }
        })
    }

    /// Mapping update payload: properties only.
    pub fn update_body(&self) -> Value {
        json!({
            "index": self.name,
            "body": {
                "properties": self.get_properties(),
            }
        })
    }
}

impl PropertyBuilder for Mapping {
    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

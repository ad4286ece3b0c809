//! Property sets and the factory methods that grow them.

use crate::error::{MappingError, Result};
use crate::field::Field;
use crate::field_type::FieldType;
use crate::types::*;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Insertion-ordered set of uniquely named fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    fields: Vec<Field>,
}

impl Properties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the set has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Look up a field by name for modification.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name() == name)
    }

    /// Remove a field by name.
    pub fn remove(&mut self, name: &str) -> Option<Field> {
        let index = self.position(name)?;
        Some(self.fields.remove(index))
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Add a field, replacing any field of the same name in place.
    pub fn push(&mut self, field: Field) -> &mut Field {
        let index = match self.position(field.name()) {
            Some(index) => {
                self.fields[index] = field;
                index
            }
            None => {
                self.fields.push(field);
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }

    /// Add a typed definition under `name` and return it for configuration.
    pub fn insert<T: FieldDefinition>(&mut self, name: impl Into<String>, definition: T) -> &mut T {
        let field = self.push(Field::new(name, definition));
        match T::from_kind_mut(field.kind_mut()) {
            Some(definition) => definition,
            None => unreachable!("field kind changed during insertion"),
        }
    }

    /// Wire property map: `{name: {type, ...options}}`.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|field| (field.name().to_string(), field.to_json()))
                .collect(),
        )
    }

    /// Parse a wire property map.
    pub fn from_json(properties: &Value) -> Result<Self> {
        match properties {
            Value::Object(map) => Self::from_map(map),
            other => Err(MappingError::InvalidDefinition {
                field: "properties".to_string(),
                reason: format!("expected an object, found {}", other),
            }),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self> {
        let mut properties = Self::new();
        for (name, definition) in map {
            properties.push(Field::from_json(name.as_str(), definition)?);
        }
        Ok(properties)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name() == name)
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name(), &field.to_json())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_map(&map).map_err(D::Error::custom)
    }
}

/// Typed factory methods shared by every node that owns properties.
///
/// Each factory appends a field and returns it, so its parameters (or, for
/// object and nested fields, its own children) can be set in the same
/// expression.
pub trait PropertyBuilder {
    /// The property set factories write into.
    fn properties_mut(&mut self) -> &mut Properties;

    /// Add an already built field.
    fn field(&mut self, field: Field) -> &mut Field {
        self.properties_mut().push(field)
    }

    /// Add a field by wire type name with default parameters.
    ///
    /// Types with required parameters (`scaled_float`, `dense_vector`,
    /// `alias`, `token_count`) fail here; use [`property`](Self::property).
    fn add_field(&mut self, type_name: &str, name: impl Into<String>) -> Result<&mut Field> {
        let field_type = type_name.parse::<FieldType>()?;
        self.property(name, field_type, Map::new())
    }

    /// Add a field of `field_type` from wire-format options.
    fn property(
        &mut self,
        name: impl Into<String>,
        field_type: FieldType,
        options: Map<String, Value>,
    ) -> Result<&mut Field> {
        let name = name.into();
        let kind = FieldKind::from_options(&name, field_type, options)?;
        Ok(self.properties_mut().push(Field::new(name, kind)))
    }

    /// Add a `text` field.
    fn text(&mut self, name: impl Into<String>) -> &mut TextField {
        self.properties_mut().insert(name, TextField::default())
    }

    /// Add a `match_only_text` field.
    fn match_only_text(&mut self, name: impl Into<String>) -> &mut MatchOnlyTextField {
        self.properties_mut().insert(name, MatchOnlyTextField::default())
    }

    /// Add a `keyword` field.
    fn keyword(&mut self, name: impl Into<String>) -> &mut KeywordField {
        self.properties_mut().insert(name, KeywordField::default())
    }

    /// Add a `constant_keyword` field.
    fn constant_keyword(&mut self, name: impl Into<String>) -> &mut ConstantKeywordField {
        self.properties_mut().insert(name, ConstantKeywordField::default())
    }

    /// Add a `wildcard` field.
    fn wildcard(&mut self, name: impl Into<String>) -> &mut WildcardField {
        self.properties_mut().insert(name, WildcardField::default())
    }

    /// Add a numeric field of the given width.
    fn numeric(&mut self, name: impl Into<String>, kind: NumericKind) -> &mut NumericField {
        self.properties_mut().insert(name, NumericField::new(kind))
    }

    /// Add a `long` field.
    fn long(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::Long)
    }

    /// Add an `integer` field.
    fn integer(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::Integer)
    }

    /// Add a `short` field.
    fn short(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::Short)
    }

    /// Add a `byte` field.
    fn byte(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::Byte)
    }

    /// Add a `double` field.
    fn double(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::Double)
    }

    /// Add a `float` field.
    fn float(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::Float)
    }

    /// Add a `half_float` field.
    fn half_float(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::HalfFloat)
    }

    /// Add an `unsigned_long` field.
    fn unsigned_long(&mut self, name: impl Into<String>) -> &mut NumericField {
        self.numeric(name, NumericKind::UnsignedLong)
    }

    /// Add a `scaled_float` field.
    fn scaled_float(&mut self, name: impl Into<String>, scaling_factor: f64) -> &mut ScaledFloatField {
        self.properties_mut()
            .insert(name, ScaledFloatField::new(scaling_factor))
    }

    /// Add a `boolean` field.
    fn boolean(&mut self, name: impl Into<String>) -> &mut BooleanField {
        self.properties_mut().insert(name, BooleanField::default())
    }

    /// Add a `date` field.
    fn date(&mut self, name: impl Into<String>) -> &mut DateField {
        self.properties_mut().insert(name, DateField::new(DateKind::Date))
    }

    /// Add a `date_nanos` field.
    fn date_nanos(&mut self, name: impl Into<String>) -> &mut DateField {
        self.properties_mut()
            .insert(name, DateField::new(DateKind::DateNanos))
    }

    /// Add a `binary` field.
    fn binary(&mut self, name: impl Into<String>) -> &mut BinaryField {
        self.properties_mut().insert(name, BinaryField::default())
    }

    /// Add a range field of the given element type.
    fn range(&mut self, name: impl Into<String>, kind: RangeKind) -> &mut RangeField {
        self.properties_mut().insert(name, RangeField::new(kind))
    }

    /// Add an `integer_range` field.
    fn integer_range(&mut self, name: impl Into<String>) -> &mut RangeField {
        self.range(name, RangeKind::Integer)
    }

    /// Add a `float_range` field.
    fn float_range(&mut self, name: impl Into<String>) -> &mut RangeField {
        self.range(name, RangeKind::Float)
    }

    /// Add a `long_range` field.
    fn long_range(&mut self, name: impl Into<String>) -> &mut RangeField {
        self.range(name, RangeKind::Long)
    }

    /// Add a `double_range` field.
    fn double_range(&mut self, name: impl Into<String>) -> &mut RangeField {
        self.range(name, RangeKind::Double)
    }

    /// Add a `date_range` field.
    fn date_range(&mut self, name: impl Into<String>) -> &mut RangeField {
        self.range(name, RangeKind::Date)
    }

    /// Add an `ip_range` field.
    fn ip_range(&mut self, name: impl Into<String>) -> &mut RangeField {
        self.range(name, RangeKind::Ip)
    }

    /// Add an `ip` field.
    fn ip(&mut self, name: impl Into<String>) -> &mut IpField {
        self.properties_mut().insert(name, IpField::default())
    }

    /// Add a `completion` field.
    fn completion(&mut self, name: impl Into<String>) -> &mut CompletionField {
        self.properties_mut().insert(name, CompletionField::default())
    }

    /// Add a `geo_point` field.
    fn geo_point(&mut self, name: impl Into<String>) -> &mut GeoPointField {
        self.properties_mut()
            .insert(name, GeoPointField::new(PointKind::Geo))
    }

    /// Add a `point` field.
    fn point(&mut self, name: impl Into<String>) -> &mut GeoPointField {
        self.properties_mut()
            .insert(name, GeoPointField::new(PointKind::Cartesian))
    }

    /// Add a `geo_shape` field.
    fn geo_shape(&mut self, name: impl Into<String>) -> &mut GeoShapeField {
        self.properties_mut()
            .insert(name, GeoShapeField::new(ShapeKind::Geo))
    }

    /// Add a `shape` field.
    fn shape(&mut self, name: impl Into<String>) -> &mut GeoShapeField {
        self.properties_mut()
            .insert(name, GeoShapeField::new(ShapeKind::Cartesian))
    }

    /// Add a `token_count` field.
    fn token_count(&mut self, name: impl Into<String>, analyzer: impl Into<String>) -> &mut TokenCountField {
        self.properties_mut()
            .insert(name, TokenCountField::new(analyzer))
    }

    /// Add a `dense_vector` field.
    fn dense_vector(&mut self, name: impl Into<String>, dims: u32) -> &mut DenseVectorField {
        self.properties_mut().insert(name, DenseVectorField::new(dims))
    }

    /// Add a `sparse_vector` field.
    fn sparse_vector(&mut self, name: impl Into<String>) -> &mut SparseVectorField {
        self.properties_mut().insert(name, SparseVectorField::default())
    }

    /// Add a `rank_feature` field.
    fn rank_feature(&mut self, name: impl Into<String>) -> &mut RankFeatureField {
        self.properties_mut().insert(name, RankFeatureField::default())
    }

    /// Add a `rank_features` field.
    fn rank_features(&mut self, name: impl Into<String>) -> &mut RankFeaturesField {
        self.properties_mut().insert(name, RankFeaturesField::default())
    }

    /// Add a `flattened` field.
    fn flattened(&mut self, name: impl Into<String>) -> &mut FlattenedField {
        self.properties_mut().insert(name, FlattenedField::default())
    }

    /// Add a `search_as_you_type` field.
    fn search_as_you_type(&mut self, name: impl Into<String>) -> &mut SearchAsYouTypeField {
        self.properties_mut()
            .insert(name, SearchAsYouTypeField::default())
    }

    /// Add an `alias` field.
    fn alias(&mut self, name: impl Into<String>, path: impl Into<String>) -> &mut AliasField {
        self.properties_mut().insert(name, AliasField::new(path))
    }

    /// Add a `join` field.
    fn join(&mut self, name: impl Into<String>) -> &mut JoinField {
        self.properties_mut().insert(name, JoinField::default())
    }

    /// Add a `percolator` field.
    fn percolator(&mut self, name: impl Into<String>) -> &mut PercolatorField {
        self.properties_mut().insert(name, PercolatorField::default())
    }

    /// Add a `histogram` field.
    fn histogram(&mut self, name: impl Into<String>) -> &mut HistogramField {
        self.properties_mut().insert(name, HistogramField::default())
    }

    /// Add a `version` field.
    fn version(&mut self, name: impl Into<String>) -> &mut VersionField {
        self.properties_mut().insert(name, VersionField::default())
    }

    /// Add an `object` field.
    fn object(&mut self, name: impl Into<String>) -> &mut ObjectField {
        self.properties_mut().insert(name, ObjectField::default())
    }

    /// Add a `nested` field.
    fn nested(&mut self, name: impl Into<String>) -> &mut NestedField {
        self.properties_mut().insert(name, NestedField::default())
    }
}

impl PropertyBuilder for Properties {
    fn properties_mut(&mut self) -> &mut Properties {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insertion_order_is_kept() {
        let mut properties = Properties::new();
        properties.keyword("b");
        properties.keyword("a");
        properties.keyword("c");

        let names: Vec<&str> = properties.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let mut properties = Properties::new();
        properties.keyword("id");
        properties.text("title");
        properties.long("id");

        assert_eq!(properties.len(), 2);
        assert_eq!(properties.iter().next().unwrap().field_type(), FieldType::Long);
    }

    #[test]
    fn test_add_field_by_wire_name() {
        let mut properties = Properties::new();
        properties.add_field("geo_point", "location").unwrap();
        properties.add_field("search_as_you_type", "title").unwrap();

        assert_eq!(
            properties.to_json(),
            json!({
                "location": { "type": "geo_point" },
                "title": { "type": "search_as_you_type" }
            })
        );
    }

    #[test]
    fn test_add_field_unknown_type() {
        let mut properties = Properties::new();
        let err = properties.add_field("geopoint", "location").unwrap_err();
        assert!(matches!(err, MappingError::UnknownFieldType(name) if name == "geopoint"));
        assert!(properties.is_empty());
    }

    #[test]
    fn test_add_field_missing_required_parameter() {
        let mut properties = Properties::new();
        assert!(properties.add_field("scaled_float", "price").is_err());
    }

    #[test]
    fn test_property_with_options() {
        let mut properties = Properties::new();
        let options = match json!({ "scaling_factor": 100, "doc_values": true }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        properties
            .property("price", FieldType::ScaledFloat, options)
            .unwrap();

        assert_eq!(
            properties.to_json(),
            json!({ "price": { "type": "scaled_float", "scaling_factor": 100.0, "doc_values": true } })
        );
    }

    #[test]
    fn test_nested_children_chain() {
        let mut properties = Properties::new();
        let addresses = properties.nested("addresses");
        addresses.keyword("city");
        addresses.object("geo").geo_point("location");

        assert_eq!(
            properties.to_json(),
            json!({
                "addresses": {
                    "type": "nested",
                    "properties": {
                        "city": { "type": "keyword" },
                        "geo": {
                            "type": "object",
                            "properties": { "location": { "type": "geo_point" } }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let mut properties = Properties::new();
        properties.text("title").analyzer("english");
        properties.dense_vector("embedding", 3);

        let json = serde_json::to_value(&properties).unwrap();
        let parsed: Properties = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(parsed, properties);
        assert_eq!(parsed.to_json(), json);
    }

    #[test]
    fn test_remove() {
        let mut properties = Properties::new();
        properties.keyword("a");
        assert!(properties.remove("a").is_some());
        assert!(properties.remove("a").is_none());
        assert!(properties.get("a").is_none());
    }
}

//! Typed field definitions.
//!
//! Every mapping field type is a struct whose members are the mapping
//! parameters valid for that type. Unset parameters are `None` and never
//! reach the wire. Setters take `&mut self` and return `&mut Self`, so a
//! field returned by a [`PropertyBuilder`](crate::PropertyBuilder) factory
//! can be configured in one chain:
//!
//! ```rust
//! use elastiq_mapping::{Mapping, PropertyBuilder};
//!
//! let mut mapping = Mapping::new("articles");
//! mapping.text("title").analyzer("english").boost(2.0);
//! mapping.keyword("slug").ignore_above(256);
//! ```

use crate::error::{MappingError, Result};
use crate::field_type::FieldType;
use crate::properties::{Properties, PropertyBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

macro_rules! option_setters {
    ($($(#[$doc:meta])* $name:ident: $ty:ty;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, value: $ty) -> &mut Self {
                self.$name = Some(value);
                self
            }
        )+
    };
}

macro_rules! string_setters {
    ($($(#[$doc:meta])* $name:ident;)+) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, value: impl Into<String>) -> &mut Self {
                self.$name = Some(value.into());
                self
            }
        )+
    };
}

macro_rules! meta_setter {
    () => {
        /// Attach a metadata entry to the field.
        pub fn meta(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
            self.meta
                .insert(key.into(), serde_json::Value::String(value.into()));
            self
        }
    };
}

macro_rules! copy_to_setter {
    () => {
        /// Copy the field's values into another field.
        pub fn copy_to(&mut self, target: impl Into<String>) -> &mut Self {
            self.copy_to.push(target.into());
            self
        }
    };
}

macro_rules! multi_fields {
    () => {
        /// Multi-fields indexing the same value in other ways.
        pub fn fields(&mut self) -> &mut $crate::properties::Properties {
            &mut self.fields
        }
    };
}

mod numeric;
mod object;
mod special;
mod spatial;
mod text;
mod vector;

pub use numeric::{
    BinaryField, BooleanField, DateField, DateKind, IpField, NumericField, NumericKind,
    RangeField, RangeKind, ScaledFloatField,
};
pub use object::{NestedField, ObjectField};
pub use spatial::{GeoPointField, GeoShapeField, Orientation, PointKind, ShapeKind};
pub use special::{AliasField, HistogramField, JoinField, PercolatorField, VersionField};
pub use text::{
    CompletionField, ConstantKeywordField, FlattenedField, IndexPrefixes, KeywordField,
    MatchOnlyTextField, SearchAsYouTypeField, TextField, TokenCountField, WildcardField,
};
pub use vector::{
    DenseVectorField, ElementType, RankFeatureField, RankFeaturesField, SparseVectorField,
    VectorIndexOptions, VectorSimilarity,
};

/// How much information is indexed for search and highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexOptions {
    /// Only document numbers.
    Docs,
    /// Document numbers and term frequencies.
    Freqs,
    /// Adds term positions.
    Positions,
    /// Adds character offsets.
    Offsets,
}

/// Term vector storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermVector {
    /// No term vectors.
    No,
    /// Terms only.
    Yes,
    /// Terms and positions.
    WithPositions,
    /// Terms and character offsets.
    WithOffsets,
    /// Terms, positions and offsets.
    WithPositionsOffsets,
    /// Terms, positions and payloads.
    WithPositionsPayloads,
    /// Terms, positions, offsets and payloads.
    WithPositionsOffsetsPayloads,
}

/// Handling of unmapped fields in an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dynamic {
    /// New fields are added to the mapping.
    True,
    /// New fields are ignored.
    False,
    /// New fields are rejected.
    #[default]
    Strict,
    /// New fields are added as runtime fields.
    Runtime,
}

/// Definition of one field, by family.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// `text`
    Text(TextField),
    /// `match_only_text`
    MatchOnlyText(MatchOnlyTextField),
    /// `keyword`
    Keyword(KeywordField),
    /// `constant_keyword`
    ConstantKeyword(ConstantKeywordField),
    /// `wildcard`
    Wildcard(WildcardField),
    /// `long`, `integer`, `short`, `byte`, `double`, `float`, `half_float`, `unsigned_long`
    Numeric(NumericField),
    /// `scaled_float`
    ScaledFloat(ScaledFloatField),
    /// `boolean`
    Boolean(BooleanField),
    /// `date`, `date_nanos`
    Date(DateField),
    /// `binary`
    Binary(BinaryField),
    /// `*_range`
    Range(RangeField),
    /// `ip`
    Ip(IpField),
    /// `completion`
    Completion(CompletionField),
    /// `geo_point`, `point`
    GeoPoint(GeoPointField),
    /// `geo_shape`, `shape`
    GeoShape(GeoShapeField),
    /// `token_count`
    TokenCount(TokenCountField),
    /// `dense_vector`
    DenseVector(DenseVectorField),
    /// `sparse_vector`
    SparseVector(SparseVectorField),
    /// `rank_feature`
    RankFeature(RankFeatureField),
    /// `rank_features`
    RankFeatures(RankFeaturesField),
    /// `flattened`
    Flattened(FlattenedField),
    /// `search_as_you_type`
    SearchAsYouType(SearchAsYouTypeField),
    /// `alias`
    Alias(AliasField),
    /// `join`
    Join(JoinField),
    /// `percolator`
    Percolator(PercolatorField),
    /// `histogram`
    Histogram(HistogramField),
    /// `version`
    Version(VersionField),
    /// `object`
    Object(ObjectField),
    /// `nested`
    Nested(NestedField),
}

/// A struct that is one variant of [`FieldKind`].
pub trait FieldDefinition: Into<FieldKind> {
    /// Borrow the definition back out of a kind holding it.
    fn from_kind_mut(kind: &mut FieldKind) -> Option<&mut Self>;
}

macro_rules! field_definitions {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for FieldKind {
                fn from(definition: $ty) -> Self {
                    FieldKind::$variant(definition)
                }
            }

            impl FieldDefinition for $ty {
                fn from_kind_mut(kind: &mut FieldKind) -> Option<&mut Self> {
                    match kind {
                        FieldKind::$variant(definition) => Some(definition),
                        _ => None,
                    }
                }
            }
        )+

        impl FieldKind {
            /// Mapping parameters that are set, keyed by wire name.
            pub fn options(&self) -> Map<String, Value> {
                match self {
                    $(FieldKind::$variant(definition) => to_options(definition),)+
                }
            }
        }
    };
}

field_definitions! {
    Text(TextField),
    MatchOnlyText(MatchOnlyTextField),
    Keyword(KeywordField),
    ConstantKeyword(ConstantKeywordField),
    Wildcard(WildcardField),
    Numeric(NumericField),
    ScaledFloat(ScaledFloatField),
    Boolean(BooleanField),
    Date(DateField),
    Binary(BinaryField),
    Range(RangeField),
    Ip(IpField),
    Completion(CompletionField),
    GeoPoint(GeoPointField),
    GeoShape(GeoShapeField),
    TokenCount(TokenCountField),
    DenseVector(DenseVectorField),
    SparseVector(SparseVectorField),
    RankFeature(RankFeatureField),
    RankFeatures(RankFeaturesField),
    Flattened(FlattenedField),
    SearchAsYouType(SearchAsYouTypeField),
    Alias(AliasField),
    Join(JoinField),
    Percolator(PercolatorField),
    Histogram(HistogramField),
    Version(VersionField),
    Object(ObjectField),
    Nested(NestedField),
}

impl FieldKind {
    /// Wire type of the definition.
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text(_) => FieldType::Text,
            FieldKind::MatchOnlyText(_) => FieldType::MatchOnlyText,
            FieldKind::Keyword(_) => FieldType::Keyword,
            FieldKind::ConstantKeyword(_) => FieldType::ConstantKeyword,
            FieldKind::Wildcard(_) => FieldType::Wildcard,
            FieldKind::Numeric(f) => f.kind().field_type(),
            FieldKind::ScaledFloat(_) => FieldType::ScaledFloat,
            FieldKind::Boolean(_) => FieldType::Boolean,
            FieldKind::Date(f) => f.kind().field_type(),
            FieldKind::Binary(_) => FieldType::Binary,
            FieldKind::Range(f) => f.kind().field_type(),
            FieldKind::Ip(_) => FieldType::Ip,
            FieldKind::Completion(_) => FieldType::Completion,
            FieldKind::GeoPoint(f) => f.kind().field_type(),
            FieldKind::GeoShape(f) => f.kind().field_type(),
            FieldKind::TokenCount(_) => FieldType::TokenCount,
            FieldKind::DenseVector(_) => FieldType::DenseVector,
            FieldKind::SparseVector(_) => FieldType::SparseVector,
            FieldKind::RankFeature(_) => FieldType::RankFeature,
            FieldKind::RankFeatures(_) => FieldType::RankFeatures,
            FieldKind::Flattened(_) => FieldType::Flattened,
            FieldKind::SearchAsYouType(_) => FieldType::SearchAsYouType,
            FieldKind::Alias(_) => FieldType::Alias,
            FieldKind::Join(_) => FieldType::Join,
            FieldKind::Percolator(_) => FieldType::Percolator,
            FieldKind::Histogram(_) => FieldType::Histogram,
            FieldKind::Version(_) => FieldType::Version,
            FieldKind::Object(_) => FieldType::Object,
            FieldKind::Nested(_) => FieldType::Nested,
        }
    }

    /// Child properties of a composite (object or nested) definition.
    pub fn children(&self) -> Option<&Properties> {
        match self {
            FieldKind::Object(object) => Some(object.properties()),
            FieldKind::Nested(nested) => Some(nested.properties()),
            _ => None,
        }
    }

    /// Mutable child properties of a composite definition.
    pub fn children_mut(&mut self) -> Option<&mut Properties> {
        match self {
            FieldKind::Object(object) => Some(object.properties_mut()),
            FieldKind::Nested(nested) => Some(nested.properties_mut()),
            _ => None,
        }
    }

    /// Build a definition of `field_type` from wire-format options.
    ///
    /// Keys that are not parameters of the type are rejected.
    pub fn from_options(
        field: &str,
        field_type: FieldType,
        options: Map<String, Value>,
    ) -> Result<Self> {
        let parser = Parser {
            field,
            field_type,
            options,
        };

        Ok(match field_type {
            FieldType::Text => FieldKind::Text(parser.parse()?),
            FieldType::MatchOnlyText => FieldKind::MatchOnlyText(parser.parse()?),
            FieldType::Keyword => FieldKind::Keyword(parser.parse()?),
            FieldType::ConstantKeyword => FieldKind::ConstantKeyword(parser.parse()?),
            FieldType::Wildcard => FieldKind::Wildcard(parser.parse()?),
            FieldType::Long
            | FieldType::Integer
            | FieldType::Short
            | FieldType::Byte
            | FieldType::Double
            | FieldType::Float
            | FieldType::HalfFloat
            | FieldType::UnsignedLong => {
                let mut numeric: NumericField = parser.parse()?;
                numeric.set_kind(NumericKind::from_field_type(field_type));
                FieldKind::Numeric(numeric)
            }
            FieldType::ScaledFloat => FieldKind::ScaledFloat(parser.parse()?),
            FieldType::Boolean => FieldKind::Boolean(parser.parse()?),
            FieldType::Date | FieldType::DateNanos => {
                let mut date: DateField = parser.parse()?;
                if field_type == FieldType::DateNanos {
                    date.set_kind(DateKind::DateNanos);
                }
                FieldKind::Date(date)
            }
            FieldType::Binary => FieldKind::Binary(parser.parse()?),
            FieldType::IntegerRange
            | FieldType::FloatRange
            | FieldType::LongRange
            | FieldType::DoubleRange
            | FieldType::DateRange
            | FieldType::IpRange => {
                let mut range: RangeField = parser.parse()?;
                range.set_kind(RangeKind::from_field_type(field_type));
                FieldKind::Range(range)
            }
            FieldType::Ip => FieldKind::Ip(parser.parse()?),
            FieldType::Completion => FieldKind::Completion(parser.parse()?),
            FieldType::GeoPoint | FieldType::Point => {
                let mut point: GeoPointField = parser.parse()?;
                if field_type == FieldType::Point {
                    point.set_kind(PointKind::Cartesian);
                }
                FieldKind::GeoPoint(point)
            }
            FieldType::GeoShape | FieldType::Shape => {
                let mut shape: GeoShapeField = parser.parse()?;
                if field_type == FieldType::Shape {
                    shape.set_kind(ShapeKind::Cartesian);
                }
                FieldKind::GeoShape(shape)
            }
            FieldType::TokenCount => FieldKind::TokenCount(parser.parse()?),
            FieldType::DenseVector => FieldKind::DenseVector(parser.parse()?),
            FieldType::SparseVector => FieldKind::SparseVector(parser.parse()?),
            FieldType::RankFeature => FieldKind::RankFeature(parser.parse()?),
            FieldType::RankFeatures => FieldKind::RankFeatures(parser.parse()?),
            FieldType::Flattened => FieldKind::Flattened(parser.parse()?),
            FieldType::SearchAsYouType => FieldKind::SearchAsYouType(parser.parse()?),
            FieldType::Alias => FieldKind::Alias(parser.parse()?),
            FieldType::Join => FieldKind::Join(parser.parse()?),
            FieldType::Percolator => FieldKind::Percolator(parser.parse()?),
            FieldType::Histogram => FieldKind::Histogram(parser.parse()?),
            FieldType::Version => FieldKind::Version(parser.parse()?),
            FieldType::Object => FieldKind::Object(parser.parse()?),
            FieldType::Nested => FieldKind::Nested(parser.parse()?),
        })
    }
}

struct Parser<'a> {
    field: &'a str,
    field_type: FieldType,
    options: Map<String, Value>,
}

impl Parser<'_> {
    fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.options.clone())).map_err(|e| {
            MappingError::InvalidOptions {
                field: self.field.to_string(),
                field_type: self.field_type,
                reason: e.to_string(),
            }
        })
    }
}

fn to_options<T: Serialize>(definition: &T) -> Map<String, Value> {
    match serde_json::to_value(definition) {
        Ok(Value::Object(options)) => options,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_from_options_keeps_subtype() {
        let kind = FieldKind::from_options("n", FieldType::HalfFloat, Map::new()).unwrap();
        assert_eq!(kind.field_type(), FieldType::HalfFloat);

        let kind = FieldKind::from_options("d", FieldType::DateNanos, Map::new()).unwrap();
        assert_eq!(kind.field_type(), FieldType::DateNanos);

        let kind = FieldKind::from_options("r", FieldType::IpRange, Map::new()).unwrap();
        assert_eq!(kind.field_type(), FieldType::IpRange);

        let kind = FieldKind::from_options("p", FieldType::Point, Map::new()).unwrap();
        assert_eq!(kind.field_type(), FieldType::Point);

        let kind = FieldKind::from_options("s", FieldType::Shape, Map::new()).unwrap();
        assert_eq!(kind.field_type(), FieldType::Shape);
    }

    #[test]
    fn test_from_options_rejects_foreign_keys() {
        let err = FieldKind::from_options(
            "price",
            FieldType::Keyword,
            options(json!({ "scaling_factor": 100 })),
        )
        .unwrap_err();

        match err {
            MappingError::InvalidOptions {
                field, field_type, ..
            } => {
                assert_eq!(field, "price");
                assert_eq!(field_type, FieldType::Keyword);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_options_requires_structural_parameters() {
        assert!(FieldKind::from_options("v", FieldType::DenseVector, Map::new()).is_err());

        let kind = FieldKind::from_options(
            "v",
            FieldType::DenseVector,
            options(json!({ "dims": 3, "similarity": "cosine" })),
        )
        .unwrap();
        assert_eq!(
            Value::Object(kind.options()),
            json!({ "dims": 3, "similarity": "cosine" })
        );
    }

    #[test]
    fn test_children_only_for_composites() {
        let object = FieldKind::from(ObjectField::default());
        assert!(object.children().is_some());

        let text = FieldKind::from(TextField::default());
        assert!(text.children().is_none());
    }
}

//! Wire names of every mapping field type.

use crate::error::MappingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field types understood by the store's mapping format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Full-text searchable field.
    Text,
    /// Space-optimised text without scoring.
    MatchOnlyText,
    /// Exact match keyword field.
    Keyword,
    /// Keyword holding the same value in every document.
    ConstantKeyword,
    /// Keyword optimised for wildcard and regexp queries.
    Wildcard,
    /// 64-bit integer.
    Long,
    /// 32-bit integer.
    Integer,
    /// 16-bit integer.
    Short,
    /// 8-bit integer.
    Byte,
    /// Double precision float.
    Double,
    /// Single precision float.
    Float,
    /// Half precision float.
    HalfFloat,
    /// Float stored as a scaled long.
    ScaledFloat,
    /// Unsigned 64-bit integer.
    UnsignedLong,
    /// Boolean.
    Boolean,
    /// Date with millisecond resolution.
    Date,
    /// Date with nanosecond resolution.
    DateNanos,
    /// Base64 encoded binary data.
    Binary,
    /// Integer range.
    IntegerRange,
    /// Float range.
    FloatRange,
    /// Long range.
    LongRange,
    /// Double range.
    DoubleRange,
    /// Date range.
    DateRange,
    /// IP address range.
    IpRange,
    /// IP address.
    Ip,
    /// Completion suggester.
    Completion,
    /// Geo point.
    GeoPoint,
    /// Geo shape.
    GeoShape,
    /// Cartesian point.
    Point,
    /// Cartesian shape.
    Shape,
    /// Token count.
    TokenCount,
    /// Dense vector.
    DenseVector,
    /// Sparse vector.
    SparseVector,
    /// Rank feature.
    RankFeature,
    /// Rank features.
    RankFeatures,
    /// Flattened object.
    Flattened,
    /// Search-as-you-type.
    SearchAsYouType,
    /// Alias to another field.
    Alias,
    /// Parent/child join.
    Join,
    /// Stored query.
    Percolator,
    /// Pre-aggregated histogram.
    Histogram,
    /// Software version.
    Version,
    /// Nested documents.
    Nested,
    /// Object.
    Object,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 44] = [
        FieldType::Text,
        FieldType::MatchOnlyText,
        FieldType::Keyword,
        FieldType::ConstantKeyword,
        FieldType::Wildcard,
        FieldType::Long,
        FieldType::Integer,
        FieldType::Short,
        FieldType::Byte,
        FieldType::Double,
        FieldType::Float,
        FieldType::HalfFloat,
        FieldType::ScaledFloat,
        FieldType::UnsignedLong,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::DateNanos,
        FieldType::Binary,
        FieldType::IntegerRange,
        FieldType::FloatRange,
        FieldType::LongRange,
        FieldType::DoubleRange,
        FieldType::DateRange,
        FieldType::IpRange,
        FieldType::Ip,
        FieldType::Completion,
        FieldType::GeoPoint,
        FieldType::GeoShape,
        FieldType::Point,
        FieldType::Shape,
        FieldType::TokenCount,
        FieldType::DenseVector,
        FieldType::SparseVector,
        FieldType::RankFeature,
        FieldType::RankFeatures,
        FieldType::Flattened,
        FieldType::SearchAsYouType,
        FieldType::Alias,
        FieldType::Join,
        FieldType::Percolator,
        FieldType::Histogram,
        FieldType::Version,
        FieldType::Nested,
        FieldType::Object,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::MatchOnlyText => "match_only_text",
            FieldType::Keyword => "keyword",
            FieldType::ConstantKeyword => "constant_keyword",
            FieldType::Wildcard => "wildcard",
            FieldType::Long => "long",
            FieldType::Integer => "integer",
            FieldType::Short => "short",
            FieldType::Byte => "byte",
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::HalfFloat => "half_float",
            FieldType::ScaledFloat => "scaled_float",
            FieldType::UnsignedLong => "unsigned_long",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateNanos => "date_nanos",
            FieldType::Binary => "binary",
            FieldType::IntegerRange => "integer_range",
            FieldType::FloatRange => "float_range",
            FieldType::LongRange => "long_range",
            FieldType::DoubleRange => "double_range",
            FieldType::DateRange => "date_range",
            FieldType::IpRange => "ip_range",
            FieldType::Ip => "ip",
            FieldType::Completion => "completion",
            FieldType::GeoPoint => "geo_point",
            FieldType::GeoShape => "geo_shape",
            FieldType::Point => "point",
            FieldType::Shape => "shape",
            FieldType::TokenCount => "token_count",
            FieldType::DenseVector => "dense_vector",
            FieldType::SparseVector => "sparse_vector",
            FieldType::RankFeature => "rank_feature",
            FieldType::RankFeatures => "rank_features",
            FieldType::Flattened => "flattened",
            FieldType::SearchAsYouType => "search_as_you_type",
            FieldType::Alias => "alias",
            FieldType::Join => "join",
            FieldType::Percolator => "percolator",
            FieldType::Histogram => "histogram",
            FieldType::Version => "version",
            FieldType::Nested => "nested",
            FieldType::Object => "object",
        }
    }

    /// Whether fields of this type own a child property set.
    pub fn is_composite(&self) -> bool {
        matches!(self, FieldType::Object | FieldType::Nested)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|field_type| field_type.as_str() == s)
            .ok_or_else(|| MappingError::UnknownFieldType(s.to_string()))
    }
}

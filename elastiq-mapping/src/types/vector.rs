//! Vector and rank feature field types.

use serde::{Deserialize, Serialize};

/// Element type of a dense vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// 4-byte floats.
    Float,
    /// 1-byte integers.
    Byte,
    /// Single bits.
    Bit,
}

/// Similarity metric for kNN search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorSimilarity {
    /// Euclidean distance.
    L2Norm,
    /// Dot product of unit vectors.
    DotProduct,
    /// Cosine similarity.
    Cosine,
    /// Maximum inner product.
    MaxInnerProduct,
}

/// kNN index structure parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VectorIndexOptions {
    /// Index structure, e.g. `hnsw` or `int8_hnsw`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Neighbours per node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m: Option<u32>,
    /// Candidates considered while building.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ef_construction: Option<u32>,
}

impl VectorIndexOptions {
    /// HNSW graph with the given parameters.
    pub fn hnsw(m: u32, ef_construction: u32) -> Self {
        Self {
            kind: "hnsw".to_string(),
            m: Some(m),
            ef_construction: Some(ef_construction),
        }
    }
}

/// `dense_vector` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DenseVectorField {
    dims: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    element_type: Option<ElementType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<VectorSimilarity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_options: Option<VectorIndexOptions>,
}

impl DenseVectorField {
    /// Vector of `dims` dimensions.
    pub fn new(dims: u32) -> Self {
        Self {
            dims,
            element_type: None,
            index: None,
            similarity: None,
            index_options: None,
        }
    }

    /// Number of dimensions.
    pub fn dims(&self) -> u32 {
        self.dims
    }

    option_setters! {
        /// Element type.
        element_type: ElementType;
        /// Build a kNN index.
        index: bool;
        /// Similarity metric.
        similarity: VectorSimilarity;
        /// kNN index structure.
        index_options: VectorIndexOptions;
    }
}

/// `sparse_vector` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SparseVectorField {}

/// `rank_feature` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RankFeatureField {
    #[serde(skip_serializing_if = "Option::is_none")]
    positive_score_impact: Option<bool>,
}

impl RankFeatureField {
    option_setters! {
        /// Whether larger values raise the score.
        positive_score_impact: bool;
    }
}

/// `rank_features` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RankFeaturesField {
    #[serde(skip_serializing_if = "Option::is_none")]
    positive_score_impact: Option<bool>,
}

impl RankFeaturesField {
    option_setters! {
        /// Whether larger values raise the score.
        positive_score_impact: bool;
    }
}

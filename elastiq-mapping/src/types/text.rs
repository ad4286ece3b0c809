//! String-valued field types.

use super::{IndexOptions, TermVector};
use crate::properties::Properties;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `text` field: analysed full-text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextField {
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_quote_analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eager_global_ordinals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fielddata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_options: Option<IndexOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_prefixes: Option<IndexPrefixes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_phrases: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    norms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position_increment_gap: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    term_vector: Option<TermVector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    copy_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    fields: Properties,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl TextField {
    string_setters! {
        /// Analyzer used at index time.
        analyzer;
        /// Analyzer used at search time.
        search_analyzer;
        /// Analyzer used for phrase queries.
        search_quote_analyzer;
        /// Scoring algorithm.
        similarity;
    }

    option_setters! {
        /// Query-time boost.
        boost: f64;
        /// Load global ordinals on refresh.
        eager_global_ordinals: bool;
        /// Allow in-memory fielddata for sorting and aggregations.
        fielddata: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Information stored in the inverted index.
        index_options: IndexOptions;
        /// Index two-term word combinations.
        index_phrases: bool;
        /// Store length normalisation factors.
        norms: bool;
        /// Fake gap between array elements.
        position_increment_gap: u32;
        /// Store the original value separately from `_source`.
        store: bool;
        /// Term vector storage.
        term_vector: TermVector;
    }

    /// Index prefixes of the given lengths for faster prefix queries.
    pub fn index_prefixes(&mut self, min_chars: u32, max_chars: u32) -> &mut Self {
        self.index_prefixes = Some(IndexPrefixes {
            min_chars,
            max_chars,
        });
        self
    }

    copy_to_setter!();
    multi_fields!();
    meta_setter!();
}

/// Prefix lengths indexed by a `text` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexPrefixes {
    /// Minimum prefix length.
    pub min_chars: u32,
    /// Maximum prefix length.
    pub max_chars: u32,
}

/// `match_only_text` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchOnlyTextField {
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    fields: Properties,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl MatchOnlyTextField {
    multi_fields!();
    meta_setter!();
}

/// `keyword` field: exact values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordField {
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eager_global_ordinals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_above: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_options: Option<IndexOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    norms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalizer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    split_queries_on_whitespace: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    copy_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    fields: Properties,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl KeywordField {
    string_setters! {
        /// Normalizer applied before indexing.
        normalizer;
        /// Value indexed in place of explicit nulls.
        null_value;
        /// Scoring algorithm.
        similarity;
    }

    option_setters! {
        /// Query-time boost.
        boost: f64;
        /// Store column-oriented values for sorting and aggregations.
        doc_values: bool;
        /// Load global ordinals on refresh.
        eager_global_ordinals: bool;
        /// Values longer than this are not indexed.
        ignore_above: u32;
        /// Whether the field is searchable.
        index: bool;
        /// Information stored in the inverted index.
        index_options: IndexOptions;
        /// Store length normalisation factors.
        norms: bool;
        /// Split full-text queries on whitespace.
        split_queries_on_whitespace: bool;
        /// Store the original value separately from `_source`.
        store: bool;
    }

    copy_to_setter!();
    multi_fields!();
    meta_setter!();
}

/// `constant_keyword` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantKeywordField {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl ConstantKeywordField {
    string_setters! {
        /// The value every document holds.
        value;
    }

    meta_setter!();
}

/// `wildcard` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WildcardField {
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_above: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<String>,
}

impl WildcardField {
    string_setters! {
        /// Value indexed in place of explicit nulls.
        null_value;
    }

    option_setters! {
        /// Values longer than this are not indexed.
        ignore_above: u32;
    }
}

/// `search_as_you_type` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchAsYouTypeField {
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_quote_analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_shingle_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_options: Option<IndexOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    norms: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    term_vector: Option<TermVector>,
}

impl SearchAsYouTypeField {
    string_setters! {
        /// Analyzer used at index time.
        analyzer;
        /// Analyzer used at search time.
        search_analyzer;
        /// Analyzer used for phrase queries.
        search_quote_analyzer;
        /// Scoring algorithm.
        similarity;
    }

    option_setters! {
        /// Largest shingle subfield, between 2 and 4.
        max_shingle_size: u32;
        /// Whether the field is searchable.
        index: bool;
        /// Information stored in the inverted index.
        index_options: IndexOptions;
        /// Store length normalisation factors.
        norms: bool;
        /// Store the original value separately from `_source`.
        store: bool;
        /// Term vector storage.
        term_vector: TermVector;
    }
}

/// `completion` suggester field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionField {
    #[serde(skip_serializing_if = "Option::is_none")]
    analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_analyzer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preserve_separators: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preserve_position_increments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_input_length: Option<u32>,
}

impl CompletionField {
    string_setters! {
        /// Analyzer used at index time.
        analyzer;
        /// Analyzer used at search time.
        search_analyzer;
    }

    option_setters! {
        /// Keep separators between tokens.
        preserve_separators: bool;
        /// Keep position increments.
        preserve_position_increments: bool;
        /// Longest input that is indexed.
        max_input_length: u32;
    }
}

/// `token_count` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenCountField {
    analyzer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    enable_position_increments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
}

impl TokenCountField {
    /// Count tokens produced by `analyzer`.
    pub fn new(analyzer: impl Into<String>) -> Self {
        Self {
            analyzer: analyzer.into(),
            enable_position_increments: None,
            doc_values: None,
            index: None,
            null_value: None,
            store: None,
        }
    }

    option_setters! {
        /// Count position increments.
        enable_position_increments: bool;
        /// Store column-oriented values.
        doc_values: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Value indexed in place of explicit nulls.
        null_value: i64;
        /// Store the value separately from `_source`.
        store: bool;
    }
}

/// `flattened` field: a whole object indexed as keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlattenedField {
    #[serde(skip_serializing_if = "Option::is_none")]
    depth_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eager_global_ordinals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_above: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_options: Option<IndexOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    split_queries_on_whitespace: Option<bool>,
}

impl FlattenedField {
    string_setters! {
        /// Value indexed in place of explicit nulls.
        null_value;
        /// Scoring algorithm.
        similarity;
    }

    option_setters! {
        /// Maximum nesting depth.
        depth_limit: u32;
        /// Store column-oriented values.
        doc_values: bool;
        /// Load global ordinals on refresh.
        eager_global_ordinals: bool;
        /// Leaf values longer than this are not indexed.
        ignore_above: u32;
        /// Whether the field is searchable.
        index: bool;
        /// Information stored in the inverted index.
        index_options: IndexOptions;
        /// Split full-text queries on whitespace.
        split_queries_on_whitespace: bool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;
    use crate::PropertyBuilder;
    use serde_json::json;

    #[test]
    fn test_text_setters_write_wire_keys() {
        let mut text = TextField::default();
        text.analyzer("english")
            .boost(1.5)
            .index_options(IndexOptions::Offsets)
            .index_prefixes(2, 5)
            .copy_to("all");

        assert_eq!(
            Value::Object(FieldKind::from(text).options()),
            json!({
                "analyzer": "english",
                "boost": 1.5,
                "index_options": "offsets",
                "index_prefixes": { "min_chars": 2, "max_chars": 5 },
                "copy_to": ["all"]
            })
        );
    }

    #[test]
    fn test_unset_options_are_omitted() {
        assert!(FieldKind::from(TextField::default()).options().is_empty());
        assert!(FieldKind::from(KeywordField::default()).options().is_empty());
        assert!(FieldKind::from(FlattenedField::default()).options().is_empty());
    }

    #[test]
    fn test_keyword_multi_fields() {
        let mut keyword = KeywordField::default();
        keyword.ignore_above(256);
        keyword.fields().text("search").analyzer("simple");

        assert_eq!(
            Value::Object(FieldKind::from(keyword).options()),
            json!({
                "ignore_above": 256,
                "fields": { "search": { "type": "text", "analyzer": "simple" } }
            })
        );
    }

    #[test]
    fn test_token_count_requires_analyzer() {
        let mut count = TokenCountField::new("standard");
        count.null_value(0);

        assert_eq!(
            Value::Object(FieldKind::from(count).options()),
            json!({ "analyzer": "standard", "null_value": 0 })
        );
    }

    #[test]
    fn test_meta_entries() {
        let mut text = MatchOnlyTextField::default();
        text.meta("unit", "words");

        assert_eq!(
            Value::Object(FieldKind::from(text).options()),
            json!({ "meta": { "unit": "words" } })
        );
    }
}

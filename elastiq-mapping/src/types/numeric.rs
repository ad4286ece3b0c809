//! Numeric, boolean, date, range, binary and IP field types.

use crate::field_type::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Numeric field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericKind {
    /// `long`
    #[default]
    Long,
    /// `integer`
    Integer,
    /// `short`
    Short,
    /// `byte`
    Byte,
    /// `double`
    Double,
    /// `float`
    Float,
    /// `half_float`
    HalfFloat,
    /// `unsigned_long`
    UnsignedLong,
}

impl NumericKind {
    /// Wire type for this width.
    pub fn field_type(&self) -> FieldType {
        match self {
            NumericKind::Long => FieldType::Long,
            NumericKind::Integer => FieldType::Integer,
            NumericKind::Short => FieldType::Short,
            NumericKind::Byte => FieldType::Byte,
            NumericKind::Double => FieldType::Double,
            NumericKind::Float => FieldType::Float,
            NumericKind::HalfFloat => FieldType::HalfFloat,
            NumericKind::UnsignedLong => FieldType::UnsignedLong,
        }
    }

    pub(crate) fn from_field_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Integer => NumericKind::Integer,
            FieldType::Short => NumericKind::Short,
            FieldType::Byte => NumericKind::Byte,
            FieldType::Double => NumericKind::Double,
            FieldType::Float => NumericKind::Float,
            FieldType::HalfFloat => NumericKind::HalfFloat,
            FieldType::UnsignedLong => NumericKind::UnsignedLong,
            _ => NumericKind::Long,
        }
    }
}

/// Numeric field (`long`, `integer`, `double`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumericField {
    #[serde(skip)]
    kind: NumericKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coerce: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_malformed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    copy_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl NumericField {
    /// Create a numeric field of the given width.
    pub fn new(kind: NumericKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Numeric width.
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: NumericKind) {
        self.kind = kind;
    }

    option_setters! {
        /// Query-time boost.
        boost: f64;
        /// Convert strings and truncate fractions.
        coerce: bool;
        /// Store column-oriented values.
        doc_values: bool;
        /// Skip malformed values instead of rejecting the document.
        ignore_malformed: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Store the value separately from `_source`.
        store: bool;
    }

    /// Value indexed in place of explicit nulls.
    ///
    /// `Value::Null` clears the option.
    pub fn null_value(&mut self, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        self.null_value = (!value.is_null()).then_some(value);
        self
    }

    copy_to_setter!();
    meta_setter!();
}

/// `scaled_float` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaledFloatField {
    scaling_factor: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    coerce: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_malformed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl ScaledFloatField {
    /// Store values multiplied by `scaling_factor`.
    pub fn new(scaling_factor: f64) -> Self {
        Self {
            scaling_factor,
            coerce: None,
            doc_values: None,
            ignore_malformed: None,
            index: None,
            null_value: None,
            store: None,
            meta: Map::new(),
        }
    }

    /// Replace the scaling factor.
    pub fn scaling_factor(&mut self, scaling_factor: f64) -> &mut Self {
        self.scaling_factor = scaling_factor;
        self
    }

    option_setters! {
        /// Convert strings and truncate fractions.
        coerce: bool;
        /// Store column-oriented values.
        doc_values: bool;
        /// Skip malformed values.
        ignore_malformed: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Value indexed in place of explicit nulls.
        null_value: f64;
        /// Store the value separately from `_source`.
        store: bool;
    }

    meta_setter!();
}

/// `boolean` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BooleanField {
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl BooleanField {
    option_setters! {
        /// Query-time boost.
        boost: f64;
        /// Store column-oriented values.
        doc_values: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Value indexed in place of explicit nulls.
        null_value: bool;
        /// Store the value separately from `_source`.
        store: bool;
    }

    meta_setter!();
}

/// Date resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateKind {
    /// `date`, millisecond resolution.
    #[default]
    Date,
    /// `date_nanos`, nanosecond resolution.
    DateNanos,
}

impl DateKind {
    /// Wire type for this resolution.
    pub fn field_type(&self) -> FieldType {
        match self {
            DateKind::Date => FieldType::Date,
            DateKind::DateNanos => FieldType::DateNanos,
        }
    }
}

/// `date` / `date_nanos` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateField {
    #[serde(skip)]
    kind: DateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_malformed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    copy_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    meta: Map<String, Value>,
}

impl DateField {
    /// Create a date field of the given resolution.
    pub fn new(kind: DateKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Date resolution.
    pub fn kind(&self) -> DateKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: DateKind) {
        self.kind = kind;
    }

    string_setters! {
        /// Accepted date formats, `||`-separated.
        format;
        /// Locale used to parse month and day names.
        locale;
        /// Value indexed in place of explicit nulls.
        null_value;
    }

    option_setters! {
        /// Query-time boost.
        boost: f64;
        /// Store column-oriented values.
        doc_values: bool;
        /// Skip malformed values.
        ignore_malformed: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Store the value separately from `_source`.
        store: bool;
    }

    copy_to_setter!();
    meta_setter!();
}

/// `binary` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinaryField {
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
}

impl BinaryField {
    option_setters! {
        /// Store column-oriented values.
        doc_values: bool;
        /// Store the value separately from `_source`.
        store: bool;
    }
}

/// Element type of a range field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeKind {
    /// `integer_range`
    #[default]
    Integer,
    /// `float_range`
    Float,
    /// `long_range`
    Long,
    /// `double_range`
    Double,
    /// `date_range`
    Date,
    /// `ip_range`
    Ip,
}

impl RangeKind {
    /// Wire type for this element type.
    pub fn field_type(&self) -> FieldType {
        match self {
            RangeKind::Integer => FieldType::IntegerRange,
            RangeKind::Float => FieldType::FloatRange,
            RangeKind::Long => FieldType::LongRange,
            RangeKind::Double => FieldType::DoubleRange,
            RangeKind::Date => FieldType::DateRange,
            RangeKind::Ip => FieldType::IpRange,
        }
    }

    pub(crate) fn from_field_type(field_type: FieldType) -> Self {
        match field_type {
            FieldType::FloatRange => RangeKind::Float,
            FieldType::LongRange => RangeKind::Long,
            FieldType::DoubleRange => RangeKind::Double,
            FieldType::DateRange => RangeKind::Date,
            FieldType::IpRange => RangeKind::Ip,
            _ => RangeKind::Integer,
        }
    }
}

/// Range field (`integer_range`, `date_range`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeField {
    #[serde(skip)]
    kind: RangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    boost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coerce: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
}

impl RangeField {
    /// Create a range field of the given element type.
    pub fn new(kind: RangeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Element type.
    pub fn kind(&self) -> RangeKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: RangeKind) {
        self.kind = kind;
    }

    string_setters! {
        /// Date format, for `date_range` only.
        format;
    }

    option_setters! {
        /// Query-time boost.
        boost: f64;
        /// Convert strings and truncate fractions.
        coerce: bool;
        /// Store column-oriented values.
        doc_values: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Store the value separately from `_source`.
        store: bool;
    }
}

/// `ip` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpField {
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_malformed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    store: Option<bool>,
}

impl IpField {
    string_setters! {
        /// Address indexed in place of explicit nulls.
        null_value;
    }

    option_setters! {
        /// Store column-oriented values.
        doc_values: bool;
        /// Skip malformed addresses.
        ignore_malformed: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Store the value separately from `_source`.
        store: bool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;
    use serde_json::json;

    #[test]
    fn test_numeric_kind_drives_wire_type() {
        let kind = FieldKind::from(NumericField::new(NumericKind::UnsignedLong));
        assert_eq!(kind.field_type(), FieldType::UnsignedLong);
        assert!(kind.options().is_empty());
    }

    #[test]
    fn test_numeric_null_value() {
        let mut field = NumericField::new(NumericKind::Integer);
        field.null_value(0).coerce(false);

        assert_eq!(
            Value::Object(FieldKind::from(field).options()),
            json!({ "coerce": false, "null_value": 0 })
        );
    }

    #[test]
    fn test_numeric_null_value_null_clears() {
        let mut field = NumericField::new(NumericKind::Long);
        field.null_value(7).null_value(Value::Null);

        assert_eq!(Value::Object(FieldKind::from(field).options()), json!({}));
    }

    #[test]
    fn test_scaled_float_always_carries_factor() {
        let field = ScaledFloatField::new(100.0);
        assert_eq!(
            Value::Object(FieldKind::from(field).options()),
            json!({ "scaling_factor": 100.0 })
        );
    }

    #[test]
    fn test_date_format() {
        let mut field = DateField::new(DateKind::DateNanos);
        field.format("strict_date_optional_time||epoch_millis");

        let kind = FieldKind::from(field);
        assert_eq!(kind.field_type(), FieldType::DateNanos);
        assert_eq!(
            Value::Object(kind.options()),
            json!({ "format": "strict_date_optional_time||epoch_millis" })
        );
    }

    #[test]
    fn test_range_kind_round_trip() {
        for kind in [
            RangeKind::Integer,
            RangeKind::Float,
            RangeKind::Long,
            RangeKind::Double,
            RangeKind::Date,
            RangeKind::Ip,
        ] {
            assert_eq!(RangeKind::from_field_type(kind.field_type()), kind);
        }
    }
}

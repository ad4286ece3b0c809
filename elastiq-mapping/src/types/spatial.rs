//! Point and shape field types.

use crate::field_type::FieldType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coordinate system of a point field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointKind {
    /// `geo_point`, latitude/longitude.
    #[default]
    Geo,
    /// `point`, cartesian x/y.
    Cartesian,
}

impl PointKind {
    /// Wire type for this coordinate system.
    pub fn field_type(&self) -> FieldType {
        match self {
            PointKind::Geo => FieldType::GeoPoint,
            PointKind::Cartesian => FieldType::Point,
        }
    }
}

/// `geo_point` / `point` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoPointField {
    #[serde(skip)]
    kind: PointKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_malformed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_z_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    null_value: Option<Value>,
}

impl GeoPointField {
    /// Create a point field in the given coordinate system.
    pub fn new(kind: PointKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Coordinate system.
    pub fn kind(&self) -> PointKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: PointKind) {
        self.kind = kind;
    }

    option_setters! {
        /// Store column-oriented values.
        doc_values: bool;
        /// Skip malformed points.
        ignore_malformed: bool;
        /// Accept and drop a third coordinate.
        ignore_z_value: bool;
        /// Whether the field is searchable.
        index: bool;
    }

    /// Point indexed in place of explicit nulls.
    ///
    /// `Value::Null` clears the option.
    pub fn null_value(&mut self, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        self.null_value = (!value.is_null()).then_some(value);
        self
    }
}

/// Coordinate system of a shape field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    /// `geo_shape`
    #[default]
    Geo,
    /// `shape`
    Cartesian,
}

impl ShapeKind {
    /// Wire type for this coordinate system.
    pub fn field_type(&self) -> FieldType {
        match self {
            ShapeKind::Geo => FieldType::GeoShape,
            ShapeKind::Cartesian => FieldType::Shape,
        }
    }
}

/// Vertex order of polygon outer rings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Counter-clockwise.
    Right,
    /// Clockwise.
    Left,
}

/// `geo_shape` / `shape` field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeoShapeField {
    #[serde(skip)]
    kind: ShapeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    coerce: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    doc_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_malformed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_z_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orientation: Option<Orientation>,
}

impl GeoShapeField {
    /// Create a shape field in the given coordinate system.
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Coordinate system.
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub(crate) fn set_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
    }

    option_setters! {
        /// Close unclosed polygons.
        coerce: bool;
        /// Store column-oriented values.
        doc_values: bool;
        /// Skip malformed shapes.
        ignore_malformed: bool;
        /// Accept and drop a third coordinate.
        ignore_z_value: bool;
        /// Whether the field is searchable.
        index: bool;
        /// Default polygon orientation.
        orientation: Orientation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;
    use serde_json::json;

    #[test]
    fn test_geo_point_null_value() {
        let mut point = GeoPointField::default();
        point.null_value(json!({ "lat": 0.0, "lon": 0.0 })).ignore_malformed(true);

        let kind = FieldKind::from(point);
        assert_eq!(kind.field_type(), FieldType::GeoPoint);
        assert_eq!(
            Value::Object(kind.options()),
            json!({ "ignore_malformed": true, "null_value": { "lat": 0.0, "lon": 0.0 } })
        );
    }

    #[test]
    fn test_shape_orientation() {
        let mut shape = GeoShapeField::new(ShapeKind::Cartesian);
        shape.orientation(Orientation::Left);

        let kind = FieldKind::from(shape);
        assert_eq!(kind.field_type(), FieldType::Shape);
        assert_eq!(Value::Object(kind.options()), json!({ "orientation": "left" }));
    }
}

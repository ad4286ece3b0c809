//! A named mapping field.

use crate::error::{MappingError, Result};
use crate::field_type::FieldType;
use crate::properties::Properties;
use crate::types::FieldKind;
use serde_json::{Map, Value};

/// One field of a property set: a name and a typed definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    kind: FieldKind,
}

impl Field {
    /// Create a field from any typed definition.
    pub fn new(name: impl Into<String>, kind: impl Into<FieldKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Typed definition.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Mutable typed definition.
    pub fn kind_mut(&mut self) -> &mut FieldKind {
        &mut self.kind
    }

    /// Wire type.
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Set mapping parameters, without the `type` key.
    pub fn options(&self) -> Map<String, Value> {
        self.kind.options()
    }

    /// Child fields, for object and nested fields.
    pub fn children(&self) -> Option<&Properties> {
        self.kind.children()
    }

    /// Wire definition: `{type, ...options}`.
    ///
    /// Object and nested fields carry their children under `properties`,
    /// which is absent when they have none.
    pub fn to_json(&self) -> Value {
        let mut definition = Map::new();
        definition.insert(
            "type".to_string(),
            Value::String(self.field_type().as_str().to_string()),
        );
        definition.extend(self.options());
        Value::Object(definition)
    }

    /// Parse a wire definition back into a typed field.
    ///
    /// A definition without `type` but with `properties` is an object, as
    /// the store reports it.
    pub fn from_json(name: impl Into<String>, definition: &Value) -> Result<Self> {
        let name = name.into();
        let mut options = match definition {
            Value::Object(options) => options.clone(),
            other => {
                return Err(MappingError::InvalidDefinition {
                    field: name,
                    reason: format!("expected an object, found {}", other),
                });
            }
        };

        let field_type = match options.remove("type") {
            Some(Value::String(type_name)) => type_name.parse::<FieldType>()?,
            Some(other) => {
                return Err(MappingError::InvalidDefinition {
                    field: name,
                    reason: format!("type must be a string, found {}", other),
                });
            }
            None if options.contains_key("properties") => FieldType::Object,
            None => {
                return Err(MappingError::InvalidDefinition {
                    field: name,
                    reason: "missing type".to_string(),
                });
            }
        };

        let kind = FieldKind::from_options(&name, field_type, options)?;
        Ok(Self { name, kind })
    }
}

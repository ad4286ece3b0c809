//! Composite field types that own child properties.

use super::Dynamic;
use crate::properties::{Properties, PropertyBuilder};
use serde::{Deserialize, Serialize};

/// `object` field: a single inner document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectField {
    #[serde(skip_serializing_if = "Option::is_none")]
    dynamic: Option<Dynamic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subobjects: Option<bool>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    properties: Properties,
}

impl ObjectField {
    option_setters! {
        /// Handling of unmapped inner fields.
        dynamic: Dynamic;
        /// Parse and index the object at all.
        enabled: bool;
        /// Allow dotted field names to expand into sub-objects.
        subobjects: bool;
    }

    /// Child fields.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl PropertyBuilder for ObjectField {
    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

/// `nested` field: an array of independently queryable documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NestedField {
    #[serde(skip_serializing_if = "Option::is_none")]
    dynamic: Option<Dynamic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_in_parent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_in_root: Option<bool>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    properties: Properties,
}

impl NestedField {
    option_setters! {
        /// Handling of unmapped inner fields.
        dynamic: Dynamic;
        /// Also index inner fields into the parent document.
        include_in_parent: bool;
        /// Also index inner fields into the root document.
        include_in_root: bool;
    }

    /// Child fields.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl PropertyBuilder for NestedField {
    fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldKind;
    use serde_json::{Value, json};

    #[test]
    fn test_empty_object_has_no_properties_key() {
        let object = FieldKind::from(ObjectField::default());
        assert!(!object.options().contains_key("properties"));
    }

    #[test]
    fn test_object_children() {
        let mut object = ObjectField::default();
        object.enabled(true);
        object.keyword("city");
        object.keyword("zip").ignore_above(10);

        assert_eq!(
            Value::Object(FieldKind::from(object).options()),
            json!({
                "enabled": true,
                "properties": {
                    "city": { "type": "keyword" },
                    "zip": { "type": "keyword", "ignore_above": 10 }
                }
            })
        );
    }

    #[test]
    fn test_nested_dynamic() {
        let mut nested = NestedField::default();
        nested.dynamic(Dynamic::False).include_in_parent(true);

        assert_eq!(
            Value::Object(FieldKind::from(nested).options()),
            json!({ "dynamic": "false", "include_in_parent": true })
        );
    }
}

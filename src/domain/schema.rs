//! Form schema model
//!
//! Passive description of a form as served by the insurance API: a tree of
//! field descriptors with type, label, requirement flag, static or
//! dynamically-fetched option lists, nested sub-fields and visibility
//! conditions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum nesting depth accepted for a form schema
pub const MAX_SCHEMA_DEPTH: usize = 32;

// ============================================================================
// Form
// ============================================================================

/// A form as returned by `GET /forms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub form_id: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

// ============================================================================
// Field
// ============================================================================

/// One node of the form tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_options: Option<DynamicOptions>,
    /// Nested fields rendered under this field, whatever its type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDescriptor>,
    /// Group members, only meaningful when `field_type` is `Group`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
}

impl FieldDescriptor {
    /// Minimal descriptor, mostly useful for building schemas in code
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            required: false,
            options: None,
            validation: None,
            conditional: None,
            dynamic_options: None,
            children: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<FieldOption>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn visible_when(mut self, field_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditional = Some(Condition {
            field_id: field_id.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_dynamic_options(mut self, depends_on: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.dynamic_options = Some(DynamicOptions {
            depends_on: depends_on.into(),
            endpoint: endpoint.into(),
            method: HttpMethod::Get,
        });
        self
    }

    pub fn with_children(mut self, children: Vec<FieldDescriptor>) -> Self {
        self.children = children;
        self
    }

    pub fn with_members(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.fields = fields;
        self
    }

    /// Group members when this is a group, otherwise nothing
    pub fn members(&self) -> &[FieldDescriptor] {
        if self.field_type == FieldType::Group {
            &self.fields
        } else {
            &[]
        }
    }

    /// Static options, empty when none were declared
    pub fn static_options(&self) -> &[FieldOption] {
        self.options.as_deref().unwrap_or_default()
    }

    /// True for a select whose option list has to be fetched
    pub fn has_dynamic_select(&self) -> bool {
        self.field_type == FieldType::Select && self.dynamic_options.is_some()
    }
}

// ============================================================================
// Field Type
// ============================================================================

/// Input kind of a field. Unknown tags are kept so the renderer can report them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Group,
    Unsupported(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Group => "group",
            FieldType::Unsupported(tag) => tag,
        }
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => FieldType::Text,
            "number" => FieldType::Number,
            "date" => FieldType::Date,
            "textarea" => FieldType::Textarea,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            "group" => FieldType::Group,
            _ => FieldType::Unsupported(tag),
        }
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Options
// ============================================================================

/// A selectable `{label, value}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawOption")]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for FieldOption {
    fn from(value: &str) -> Self {
        Self::new(value, value)
    }
}

impl From<String> for FieldOption {
    fn from(value: String) -> Self {
        Self::new(value.clone(), value)
    }
}

/// Wire shapes accepted for an option entry
#[derive(Deserialize)]
#[serde(untagged)]
enum RawOption {
    Pair {
        #[serde(default)]
        label: Option<Value>,
        value: Value,
    },
    Bare(Value),
}

impl From<RawOption> for FieldOption {
    fn from(raw: RawOption) -> Self {
        match raw {
            RawOption::Pair { label, value } => {
                let value = scalar_to_string(&value);
                let label = label
                    .as_ref()
                    .map(scalar_to_string)
                    .unwrap_or_else(|| value.clone());
                FieldOption { label, value }
            }
            RawOption::Bare(value) => FieldOption::from(scalar_to_string(&value)),
        }
    }
}

/// Strings unquoted, everything else in compact JSON form
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Validation / Conditions / Dynamic Options
// ============================================================================

/// Advisory constraints; carried to the render tree, not enforced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Field is visible only while `answers[field_id] == value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_id: String,
    pub value: String,
}

/// Remote option list keyed on another field's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicOptions {
    pub depends_on: String,
    pub endpoint: String,
    #[serde(default)]
    pub method: HttpMethod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_field_tree() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "id": "vehicle",
            "label": "Vehicle",
            "type": "group",
            "fields": [
                { "id": "make", "label": "Make", "type": "select", "options": ["Audi", "BMW"] },
                { "id": "year", "label": "Year", "type": "number", "validation": { "min": 1990, "max": 2025 } }
            ],
            "children": [
                {
                    "id": "model",
                    "label": "Model",
                    "type": "select",
                    "dynamicOptions": { "dependsOn": "make", "endpoint": "/models", "method": "POST" }
                }
            ]
        }))
        .unwrap();

        assert_eq!(field.field_type, FieldType::Group);
        assert_eq!(field.members().len(), 2);
        assert_eq!(field.fields[0].static_options()[1], FieldOption::new("BMW", "BMW"));
        assert_eq!(field.fields[1].validation.as_ref().and_then(|v| v.max), Some(2025.0));

        let model = &field.children[0];
        assert!(model.has_dynamic_select());
        assert_eq!(model.dynamic_options.as_ref().unwrap().method, HttpMethod::Post);
    }

    #[test]
    fn test_option_shapes() {
        let options: Vec<FieldOption> = serde_json::from_value(json!([
            { "label": "Yes", "value": "yes" },
            "plain",
            { "value": 3 },
            7
        ]))
        .unwrap();

        assert_eq!(options[0], FieldOption::new("Yes", "yes"));
        assert_eq!(options[1], FieldOption::new("plain", "plain"));
        assert_eq!(options[2], FieldOption::new("3", "3"));
        assert_eq!(options[3], FieldOption::new("7", "7"));
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let field: FieldDescriptor =
            serde_json::from_value(json!({ "id": "sig", "label": "Signature", "type": "signature" })).unwrap();
        assert_eq!(field.field_type, FieldType::Unsupported("signature".to_string()));
        assert_eq!(serde_json::to_value(&field).unwrap()["type"], "signature");
    }

    #[test]
    fn test_members_ignored_outside_groups() {
        let field = FieldDescriptor::new("a", "A", FieldType::Text)
            .with_members(vec![FieldDescriptor::new("b", "B", FieldType::Text)]);
        assert!(field.members().is_empty());
    }
}

//! Rendering-agnostic projection of a form
//!
//! Builds the tree of visible inputs from the schema, the current answers and
//! the dynamic option cache. Hosts turn [`RenderNode`]s into widgets and feed
//! user edits back as `(id, value)` pairs; nothing here holds answer state.

use serde::Serialize;

use crate::domain::{AnswerMap, AnswerValue, FieldDescriptor, FieldOption, FieldType, ValidationRules, MAX_SCHEMA_DEPTH};

use super::options::OptionResolver;
use super::visibility::is_visible;

/// Concrete input a host has to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Number,
    Date,
    Textarea,
    Select,
    Radio,
    /// Checkbox without options; a single boolean
    Toggle,
    /// Checkbox with options; a multi-select
    CheckboxGroup,
    /// Container rendering its members inline
    Group,
    /// Inline error marker in place of the input
    Error(String),
}

/// One visible field with everything needed to draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode {
    pub id: String,
    pub label: String,
    pub input: InputKind,
    pub required: bool,
    pub disabled: bool,
    pub value: AnswerValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    /// Group members, drawn inside the group container
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<RenderNode>,
    /// Nested fields, drawn indented below the input
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderNode>,
}

impl InputKind {
    pub fn name(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Number => "number",
            InputKind::Date => "date",
            InputKind::Textarea => "textarea",
            InputKind::Select => "select",
            InputKind::Radio => "radio",
            InputKind::Toggle => "toggle",
            InputKind::CheckboxGroup => "checkbox_group",
            InputKind::Group => "group",
            InputKind::Error(_) => "error",
        }
    }
}

impl RenderNode {
    /// True when the value is a member of the current multi-select answer
    pub fn is_checked(&self, option_value: &str) -> bool {
        match &self.value {
            AnswerValue::Choices(c) => c.iter().any(|v| v == option_value),
            AnswerValue::Text(s) => s == option_value,
            AnswerValue::Flag(b) => *b,
        }
    }
}

/// Builds render nodes for every visible top-level field
pub fn build_render_tree(fields: &[FieldDescriptor], answers: &AnswerMap, resolver: &OptionResolver) -> Vec<RenderNode> {
    build_level(fields, answers, resolver, 1)
}

fn build_level(
    fields: &[FieldDescriptor],
    answers: &AnswerMap,
    resolver: &OptionResolver,
    depth: usize,
) -> Vec<RenderNode> {
    fields
        .iter()
        .filter(|field| is_visible(field, answers))
        .map(|field| build_node(field, answers, resolver, depth))
        .collect()
}

fn build_node(field: &FieldDescriptor, answers: &AnswerMap, resolver: &OptionResolver, depth: usize) -> RenderNode {
    // Only selects fetch their options; other types keep the static list
    let options: Vec<FieldOption> = match (field.has_dynamic_select(), resolver.options(&field.id)) {
        (true, Some(resolved)) => resolved.to_vec(),
        (true, None) => Vec::new(),
        (false, _) => field.static_options().to_vec(),
    };

    let input = match &field.field_type {
        FieldType::Text => InputKind::Text,
        FieldType::Number => InputKind::Number,
        FieldType::Date => InputKind::Date,
        FieldType::Textarea => InputKind::Textarea,
        FieldType::Select => InputKind::Select,
        FieldType::Radio => InputKind::Radio,
        FieldType::Checkbox if options.is_empty() => InputKind::Toggle,
        FieldType::Checkbox => InputKind::CheckboxGroup,
        FieldType::Group => InputKind::Group,
        FieldType::Unsupported(tag) => InputKind::Error(format!("Unsupported field type: {}", tag)),
    };

    let value = answers
        .get(&field.id)
        .cloned()
        .unwrap_or_else(|| default_value(&input));

    let disabled = match (&field.field_type, &field.dynamic_options) {
        (FieldType::Select, Some(dynamic)) => !answers.is_answered(&dynamic.depends_on) || options.is_empty(),
        _ => false,
    };

    let mut node = RenderNode {
        id: field.id.clone(),
        label: field.label.clone(),
        input,
        required: field.required,
        disabled,
        value,
        options,
        validation: field.validation.clone(),
        members: Vec::new(),
        children: Vec::new(),
    };

    if depth >= MAX_SCHEMA_DEPTH {
        if !field.children.is_empty() || !field.members().is_empty() {
            node.children.push(depth_marker(field));
        }
        return node;
    }

    node.members = build_level(field.members(), answers, resolver, depth + 1);
    node.children = build_level(&field.children, answers, resolver, depth + 1);
    node
}

fn default_value(input: &InputKind) -> AnswerValue {
    match input {
        InputKind::Toggle => AnswerValue::Flag(false),
        InputKind::CheckboxGroup => AnswerValue::Choices(Vec::new()),
        _ => AnswerValue::Text(String::new()),
    }
}

fn depth_marker(field: &FieldDescriptor) -> RenderNode {
    RenderNode {
        id: format!("{}.__nested", field.id),
        label: String::new(),
        input: InputKind::Error(format!("Fields nested under '{}' exceed {} levels", field.id, MAX_SCHEMA_DEPTH)),
        required: false,
        disabled: true,
        value: AnswerValue::Text(String::new()),
        options: Vec::new(),
        validation: None,
        members: Vec::new(),
        children: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn country_state() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("country", "Country", FieldType::Select).with_options(["US", "CA"]),
            FieldDescriptor::new("state", "State", FieldType::Select)
                .with_options(["static"])
                .with_dynamic_options("country", "/states"),
        ]
    }

    #[test]
    fn test_defaults_per_input_kind() {
        let fields = vec![
            FieldDescriptor::new("name", "Name", FieldType::Text),
            FieldDescriptor::new("agree", "Agree", FieldType::Checkbox),
            FieldDescriptor::new("extras", "Extras", FieldType::Checkbox).with_options(["a", "b"]),
        ];
        let nodes = build_render_tree(&fields, &AnswerMap::new(), &OptionResolver::new());

        assert_eq!(nodes[0].value, AnswerValue::Text(String::new()));
        assert_eq!(nodes[1].input, InputKind::Toggle);
        assert_eq!(nodes[1].value, AnswerValue::Flag(false));
        assert_eq!(nodes[2].input, InputKind::CheckboxGroup);
        assert_eq!(nodes[2].value, AnswerValue::Choices(vec![]));
    }

    #[test]
    fn test_conditional_fields_follow_answers() {
        let fields = vec![
            FieldDescriptor::new("x", "X", FieldType::Radio).with_options(["yes", "no"]),
            FieldDescriptor::new("details", "Details", FieldType::Textarea)
                .visible_when("x", "yes")
                .with_children(vec![FieldDescriptor::new("more", "More", FieldType::Text)]),
        ];
        let resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();

        assert_eq!(build_render_tree(&fields, &answers, &resolver).len(), 1);

        answers.set("x", "no");
        assert_eq!(build_render_tree(&fields, &answers, &resolver).len(), 1);

        answers.set("x", "yes");
        let nodes = build_render_tree(&fields, &answers, &resolver);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].children[0].id, "more");
    }

    #[test]
    fn test_dynamic_select_disabled_until_resolved() {
        let fields = country_state();
        let mut resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();

        resolver.plan(&fields, &answers);
        let state = &build_render_tree(&fields, &answers, &resolver)[1];
        assert!(state.disabled);
        assert!(state.options.is_empty(), "dynamic list overrides static options");

        answers.set("country", "US");
        let request = resolver.plan(&fields, &answers).remove(0);
        assert!(build_render_tree(&fields, &answers, &resolver)[1].disabled);

        resolver.apply(&request, Ok(json!(["CA", "NY"])));
        let state = &build_render_tree(&fields, &answers, &resolver)[1];
        assert!(!state.disabled);
        assert_eq!(state.options, vec![FieldOption::from("CA"), FieldOption::from("NY")]);
    }

    #[test]
    fn test_dynamic_options_only_replace_select_lists() {
        let fields = vec![
            FieldDescriptor::new("country", "Country", FieldType::Select).with_options(["US", "CA"]),
            FieldDescriptor::new("plan", "Plan", FieldType::Radio)
                .with_options(["basic", "premium"])
                .with_dynamic_options("country", "/plans"),
            FieldDescriptor::new("extras", "Extras", FieldType::Checkbox)
                .with_options(["fire", "flood"])
                .with_dynamic_options("country", "/extras"),
        ];
        let mut resolver = OptionResolver::new();
        let mut answers = AnswerMap::new();
        answers.set("country", "US");

        assert!(resolver.plan(&fields, &answers).is_empty());

        let nodes = build_render_tree(&fields, &answers, &resolver);
        assert_eq!(nodes[1].options, vec![FieldOption::from("basic"), FieldOption::from("premium")]);
        assert!(!nodes[1].disabled);
        assert_eq!(nodes[2].input, InputKind::CheckboxGroup);
        assert_eq!(nodes[2].value, AnswerValue::Choices(vec![]));
    }

    #[test]
    fn test_group_renders_members_and_children() {
        let fields = vec![FieldDescriptor::new("g", "Driver", FieldType::Group)
            .with_members(vec![FieldDescriptor::new("first", "First", FieldType::Text)])
            .with_children(vec![FieldDescriptor::new("note", "Note", FieldType::Text)])];
        let nodes = build_render_tree(&fields, &AnswerMap::new(), &OptionResolver::new());
        assert_eq!(nodes[0].input, InputKind::Group);
        assert_eq!(nodes[0].members[0].id, "first");
        assert_eq!(nodes[0].children[0].id, "note");
    }

    #[test]
    fn test_unsupported_type_does_not_abort_siblings() {
        let fields = vec![
            FieldDescriptor::new("sig", "Signature", FieldType::Unsupported("signature".to_string())),
            FieldDescriptor::new("name", "Name", FieldType::Text),
        ];
        let nodes = build_render_tree(&fields, &AnswerMap::new(), &OptionResolver::new());
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].input, InputKind::Error("Unsupported field type: signature".to_string()));
        assert_eq!(nodes[1].input, InputKind::Text);
    }

    #[test]
    fn test_existing_answers_are_projected() {
        let fields = vec![FieldDescriptor::new("extras", "Extras", FieldType::Checkbox).with_options(["a", "b"])];
        let mut answers = AnswerMap::new();
        answers.toggle_choice("extras", "b", true);
        let node = &build_render_tree(&fields, &answers, &OptionResolver::new())[0];
        assert!(node.is_checked("b"));
        assert!(!node.is_checked("a"));
    }
}

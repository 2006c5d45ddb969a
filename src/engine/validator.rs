//! Required-field validation
//!
//! Pure function of (schema, answers), usable without rendering. Hidden
//! fields are skipped together with everything nested under them.

use crate::domain::{AnswerMap, FieldDescriptor};

use super::visibility::is_visible;

/// Collects one message per visible required field without an answer, in
/// schema order. An empty result means the answers can be submitted.
pub fn validate(fields: &[FieldDescriptor], answers: &AnswerMap) -> Vec<String> {
    let mut errors = Vec::new();
    let mut stack: Vec<&FieldDescriptor> = fields.iter().rev().collect();

    while let Some(field) = stack.pop() {
        if !is_visible(field, answers) {
            continue;
        }

        if field.required && !answers.is_answered(&field.id) {
            errors.push(required_message(field));
        }

        stack.extend(field.children.iter().rev());
        stack.extend(field.members().iter().rev());
    }

    errors
}

fn required_message(field: &FieldDescriptor) -> String {
    let name = if field.label.is_empty() { &field.id } else { &field.label };
    format!("\"{}\" is required", name)
}

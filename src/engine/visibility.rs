use crate::domain::{AnswerMap, FieldDescriptor};

/// A field is visible when it has no condition, or when the stored answer for
/// the condition's field is text equal to the condition value. Flags and
/// choice lists never satisfy a condition.
pub fn is_visible(field: &FieldDescriptor, answers: &AnswerMap) -> bool {
    match &field.conditional {
        None => true,
        Some(condition) => answers.text(&condition.field_id) == Some(condition.value.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldType;

    fn conditional() -> FieldDescriptor {
        FieldDescriptor::new("details", "Details", FieldType::Text).visible_when("x", "yes")
    }

    #[test]
    fn test_unconditional_is_visible() {
        let field = FieldDescriptor::new("a", "A", FieldType::Text);
        assert!(is_visible(&field, &AnswerMap::new()));
    }

    #[test]
    fn test_condition_matches_exact_text() {
        let field = conditional();
        let mut answers = AnswerMap::new();
        assert!(!is_visible(&field, &answers));

        for other in ["no", "Yes", "yes ", ""] {
            answers.set("x", other);
            assert!(!is_visible(&field, &answers), "{:?} should not match", other);
        }

        answers.set("x", "yes");
        assert!(is_visible(&field, &answers));
    }

    #[test]
    fn test_non_text_answers_do_not_match() {
        let field = FieldDescriptor::new("d", "D", FieldType::Text).visible_when("x", "true");
        let mut answers = AnswerMap::new();
        answers.set("x", true);
        assert!(!is_visible(&field, &answers));

        answers.set("x", vec!["true".to_string()]);
        assert!(!is_visible(&field, &answers));
    }
}

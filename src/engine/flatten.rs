//! Schema flattening and structural checks
//!
//! Both walks use an explicit stack so that a malformed, very deep schema
//! cannot exhaust the call stack.

use std::collections::HashSet;

use crate::domain::{FieldDescriptor, SchemaError, MAX_SCHEMA_DEPTH};

/// Every descriptor reachable through group `fields` and `children`,
/// depth-first, parent before its nested fields (group members first).
pub fn flatten(fields: &[FieldDescriptor]) -> Vec<&FieldDescriptor> {
    let mut out = Vec::new();
    let mut stack: Vec<&FieldDescriptor> = fields.iter().rev().collect();

    while let Some(field) = stack.pop() {
        out.push(field);
        stack.extend(field.children.iter().rev());
        stack.extend(field.members().iter().rev());
    }

    out
}

/// Rejects schemas the evaluator cannot handle safely.
///
/// Checks unique ids across the flattened tree, self-referencing conditions
/// and dependencies, dependencies on unknown fields and the nesting limit.
pub fn check_schema(fields: &[FieldDescriptor]) -> Result<(), SchemaError> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&FieldDescriptor, usize)> = fields.iter().rev().map(|f| (f, 1)).collect();

    while let Some((field, depth)) = stack.pop() {
        if depth > MAX_SCHEMA_DEPTH {
            return Err(SchemaError::TooDeep {
                field: field.id.clone(),
                limit: MAX_SCHEMA_DEPTH,
            });
        }
        if !seen.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateId(field.id.clone()));
        }
        if field.conditional.as_ref().is_some_and(|c| c.field_id == field.id) {
            return Err(SchemaError::SelfReference {
                field: field.id.clone(),
                attribute: "conditional",
            });
        }
        if field.dynamic_options.as_ref().is_some_and(|d| d.depends_on == field.id) {
            return Err(SchemaError::SelfReference {
                field: field.id.clone(),
                attribute: "dynamicOptions",
            });
        }

        stack.extend(field.children.iter().rev().map(|f| (f, depth + 1)));
        stack.extend(field.members().iter().rev().map(|f| (f, depth + 1)));
    }

    for field in flatten(fields) {
        if let Some(dynamic) = &field.dynamic_options {
            if !seen.contains(dynamic.depends_on.as_str()) {
                return Err(SchemaError::UnknownDependency {
                    field: field.id.clone(),
                    depends_on: dynamic.depends_on.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldType;

    fn text(id: &str) -> FieldDescriptor {
        FieldDescriptor::new(id, id.to_uppercase(), FieldType::Text)
    }

    fn sample() -> Vec<FieldDescriptor> {
        vec![
            text("a").with_children(vec![text("a1"), text("a2").with_children(vec![text("a2x")])]),
            FieldDescriptor::new("g", "G", FieldType::Group)
                .with_members(vec![text("g1"), text("g2")])
                .with_children(vec![text("gc")]),
            text("b"),
        ]
    }

    #[test]
    fn test_flatten_order() {
        let fields = sample();
        let ids: Vec<&str> = flatten(&fields).iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a2", "a2x", "g", "g1", "g2", "gc", "b"]);
    }

    #[test]
    fn test_flatten_empty() {
        assert!(flatten(&[]).is_empty());
    }

    #[test]
    fn test_flatten_skips_members_of_non_groups() {
        let fields = vec![text("a").with_members(vec![text("hidden")])];
        assert_eq!(flatten(&fields).len(), 1);
    }

    #[test]
    fn test_check_accepts_well_formed() {
        assert_eq!(check_schema(&sample()), Ok(()));
    }

    #[test]
    fn test_check_duplicate_ids() {
        let fields = vec![text("a").with_children(vec![text("a")])];
        assert_eq!(check_schema(&fields), Err(SchemaError::DuplicateId("a".to_string())));
    }

    #[test]
    fn test_check_self_reference() {
        let fields = vec![text("a").visible_when("a", "yes")];
        assert!(matches!(
            check_schema(&fields),
            Err(SchemaError::SelfReference { attribute: "conditional", .. })
        ));

        let fields = vec![FieldDescriptor::new("s", "S", FieldType::Select).with_dynamic_options("s", "/x")];
        assert!(matches!(
            check_schema(&fields),
            Err(SchemaError::SelfReference { attribute: "dynamicOptions", .. })
        ));
    }

    #[test]
    fn test_check_unknown_dependency() {
        let fields = vec![FieldDescriptor::new("state", "State", FieldType::Select)
            .with_dynamic_options("country", "/states")];
        assert_eq!(
            check_schema(&fields),
            Err(SchemaError::UnknownDependency {
                field: "state".to_string(),
                depends_on: "country".to_string(),
            })
        );
    }

    #[test]
    fn test_check_depth_limit() {
        let mut field = text("leaf");
        for level in 0..MAX_SCHEMA_DEPTH {
            field = text(&format!("n{}", level)).with_children(vec![field]);
        }
        assert!(matches!(check_schema(&[field]), Err(SchemaError::TooDeep { .. })));
    }
}

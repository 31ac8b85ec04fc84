//! Structural → JSON schema. One property per constraint
//! bucketed under `Enforcement::Structural`; `required` is the union of
//! every constraint whose severity marks it non-optional.

use std::collections::HashMap;

use crate::model::{Constraint, JsonSchema, Severity};

fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

pub fn compile_schema(constraints: &[Constraint]) -> Option<JsonSchema> {
    if constraints.is_empty() {
        return None;
    }
    let mut properties = HashMap::with_capacity(constraints.len());
    let mut required = Vec::new();
    for c in constraints {
        let key = slug(&c.name);
        properties.insert(
            key.clone(),
            serde_json::json!({ "type": "string", "description": c.description }),
        );
        if matches!(c.severity, Severity::Error | Severity::Warning) {
            required.push(key);
        }
    }
    required.sort();
    required.dedup();
    Some(JsonSchema {
        schema_type: "object".to_string(),
        properties,
        required,
        additional_properties: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Enforcement};

    #[test]
    fn empty_input_yields_no_schema() {
        assert!(compile_schema(&[]).is_none());
    }

    #[test]
    fn error_severity_constraints_become_required() {
        let mut c = Constraint::new(1, "user_id", "d", ConstraintKind::TypeSafety, Enforcement::Structural);
        c.severity = Severity::Error;
        let schema = compile_schema(&[c]).unwrap();
        assert!(schema.required.contains(&"user_id".to_string()));
        assert!(schema.properties.contains_key("user_id"));
        assert_eq!(schema.required.iter().collect::<std::collections::HashSet<_>>().len(), schema.required.len());
    }
}

//! Composition merging - effective attribute views across `allOf`.
//!
//! `allOf` is a logical AND: every listed schema constrains the same object
//! instance, so a property required by one branch applies to properties
//! defined by another. `oneOf`/`anyOf` list alternatives - only one applies
//! to a given instance - and `not` negates, so merging never crosses those
//! boundaries in either direction.

use serde_json::Value;

use crate::types::{CompositionStep, EffectiveAttributes, Occurrence};

/// Compute the merged attribute view for one occurrence.
///
/// Unions `required`, `properties`, and `type` from the occurrence's own
/// node, its own (recursively nested) `allOf` members, and every sibling
/// member of each `allOf` lineage step, walking the lineage innermost to
/// outermost and stopping at the first `anyOf`/`oneOf`/`not` boundary.
pub fn effective_attributes(occurrence: &Occurrence<'_>) -> EffectiveAttributes {
    let mut attrs = EffectiveAttributes::default();
    contribute(occurrence.node, &mut attrs);

    for step in occurrence.lineage.iter().rev() {
        match step {
            CompositionStep::AllOf { members, .. } => {
                for member in *members {
                    contribute(member, &mut attrs);
                }
            }
            _ => break,
        }
    }

    attrs
}

/// Find the value a keyword effectively has at this occurrence, looking at
/// the occurrence's own node and every `allOf` member in the same merge
/// scope.
///
/// This is how a check sees `minItems` even when it is declared in a
/// different `allOf` branch than `items`. Returns the first declaration in
/// scope; conflicting duplicates are a separate structural concern.
pub fn effective_value<'a>(occurrence: &Occurrence<'a>, key: &str) -> Option<&'a Value> {
    if let Some(value) = find_in(occurrence.node, key) {
        return Some(value);
    }

    for step in occurrence.lineage.iter().rev() {
        match step {
            CompositionStep::AllOf { members, .. } => {
                for member in *members {
                    if let Some(value) = find_in(member, key) {
                        return Some(value);
                    }
                }
            }
            _ => break,
        }
    }

    None
}

fn contribute(node: &Value, attrs: &mut EffectiveAttributes) {
    let Some(map) = node.as_object() else {
        return;
    };

    if let Some(required) = map.get("required").and_then(Value::as_array) {
        for name in required {
            if let Some(name) = name.as_str() {
                attrs.required.insert(name.to_string());
            }
        }
    }

    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
        for name in properties.keys() {
            attrs.properties.insert(name.clone());
        }
    }

    match map.get("type") {
        Some(Value::String(ty)) => {
            attrs.types.insert(ty.clone());
        }
        Some(Value::Array(types)) => {
            for ty in types {
                if let Some(ty) = ty.as_str() {
                    attrs.types.insert(ty.to_string());
                }
            }
        }
        _ => {}
    }

    // Nested allOf members constrain the same instance.
    if let Some(members) = map.get("allOf").and_then(Value::as_array) {
        for member in members {
            contribute(member, attrs);
        }
    }
}

fn find_in<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    let map = node.as_object()?;
    if let Some(value) = map.get(key) {
        return Some(value);
    }
    if let Some(members) = map.get("allOf").and_then(Value::as_array) {
        for member in members {
            if let Some(value) = find_in(member, key) {
                return Some(value);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JsonPath;
    use crate::walker::walk_schema;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn occurrence_at<'a>(schema: &'a Value, pointer: &str) -> Occurrence<'a> {
        let marks = BTreeSet::new();
        let mut found = None;
        walk_schema(schema, JsonPath::root(), &marks, &mut |occ| {
            if occ.path.to_string() == pointer {
                found = Some(occ.clone());
            }
        });
        found.unwrap_or_else(|| panic!("no occurrence at {}", pointer))
    }

    #[test]
    fn allof_unions_required_and_properties_across_siblings() {
        // No single member declares both, the merged view has both.
        let schema = json!({
            "allOf": [
                { "required": ["a"] },
                { "properties": { "a": { "type": "string" } } }
            ]
        });

        for pointer in ["", "/allOf/0", "/allOf/1"] {
            let attrs = effective_attributes(&occurrence_at(&schema, pointer));
            assert!(attrs.required.contains("a"), "required at {:?}", pointer);
            assert!(attrs.properties.contains("a"), "properties at {:?}", pointer);
        }
    }

    #[test]
    fn nested_allof_members_contribute() {
        let schema = json!({
            "allOf": [
                { "allOf": [ { "required": ["x"] } ] },
                { "properties": { "x": { "type": "integer" } } }
            ]
        });

        let attrs = effective_attributes(&occurrence_at(&schema, ""));
        assert!(attrs.required.contains("x"));
        assert!(attrs.properties.contains("x"));
    }

    #[test]
    fn oneof_branches_stay_independent() {
        let schema = json!({
            "oneOf": [
                { "required": ["a"], "properties": { "a": { "type": "string" } } },
                { "required": ["b"], "properties": { "b": { "type": "string" } } }
            ]
        });

        let first = effective_attributes(&occurrence_at(&schema, "/oneOf/0"));
        assert!(first.required.contains("a"));
        assert!(!first.required.contains("b"));
        assert!(!first.properties.contains("b"));

        let second = effective_attributes(&occurrence_at(&schema, "/oneOf/1"));
        assert!(second.required.contains("b"));
        assert!(!second.required.contains("a"));
    }

    #[test]
    fn boundary_stops_outward_merge() {
        // The alternative must not absorb attributes from outside its scope.
        let schema = json!({
            "allOf": [
                { "required": ["outer"] },
                { "oneOf": [ { "required": ["inner"] } ] }
            ]
        });

        let attrs = effective_attributes(&occurrence_at(&schema, "/allOf/1/oneOf/0"));
        assert!(attrs.required.contains("inner"));
        assert!(!attrs.required.contains("outer"));
    }

    #[test]
    fn not_contributes_nothing() {
        let schema = json!({
            "required": ["present"],
            "not": { "required": ["forbidden"] }
        });

        let root = effective_attributes(&occurrence_at(&schema, ""));
        assert!(root.required.contains("present"));
        assert!(!root.required.contains("forbidden"));

        let negated = effective_attributes(&occurrence_at(&schema, "/not"));
        assert!(negated.required.contains("forbidden"));
        assert!(!negated.required.contains("present"));
    }

    #[test]
    fn type_set_unions_string_and_array_forms() {
        let schema = json!({
            "allOf": [
                { "type": "object" },
                { "type": ["object", "null"] }
            ]
        });

        let attrs = effective_attributes(&occurrence_at(&schema, ""));
        assert_eq!(
            attrs.types.iter().collect::<Vec<_>>(),
            vec!["null", "object"]
        );
    }

    #[test]
    fn effective_value_finds_keyword_in_sibling_branch() {
        // minItems lives in a different allOf branch than items.
        let schema = json!({
            "allOf": [
                { "minItems": 1, "maxItems": 100 },
                { "type": "array", "items": { "type": "string" } }
            ]
        });

        let branch = occurrence_at(&schema, "/allOf/1");
        assert_eq!(effective_value(&branch, "minItems"), Some(&json!(1)));
        assert_eq!(effective_value(&branch, "maxItems"), Some(&json!(100)));
        assert!(effective_value(&branch, "uniqueItems").is_none());
    }

    #[test]
    fn effective_value_prefers_own_node() {
        let schema = json!({
            "allOf": [
                { "minItems": 1 },
                { "type": "array", "minItems": 5 }
            ]
        });

        let branch = occurrence_at(&schema, "/allOf/1");
        assert_eq!(effective_value(&branch, "minItems"), Some(&json!(5)));
    }

    #[test]
    fn effective_value_stops_at_boundaries() {
        let schema = json!({
            "allOf": [
                { "minItems": 1 },
                { "anyOf": [ { "type": "array" } ] }
            ]
        });

        let branch = occurrence_at(&schema, "/allOf/1/anyOf/0");
        assert!(effective_value(&branch, "minItems").is_none());
    }
}

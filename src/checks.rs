//! Builtin design rules.
//!
//! A deliberately small slice of the rule catalog - enough to cover every
//! node kind and both merge strategies the engine supports. Each rule is a
//! unit struct so the set stays cheap to register and reorder.

use serde_json::Value;

use crate::dispatch::{Check, Effective, Finding};
use crate::error::CheckError;
use crate::types::{json_type_name, NodeKind, Occurrence, Severity};

/// The builtin rule set, in registration (and therefore reporting) order.
pub fn builtin_rules() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(ArrayBounds),
        Box::new(PatternAnchor),
        Box::new(RequiredPropertyDefined),
        Box::new(EnumUnique),
        Box::new(OperationId),
        Box::new(ParameterNameCase),
        Box::new(ServerTrailingSlash),
        Box::new(ResponseDescription),
        Box::new(SecurityRequirementNamed),
        Box::new(PathKebabCase),
    ]
}

fn declares_type(node: &Value, expected: &str) -> bool {
    match node.get("type") {
        Some(Value::String(ty)) => ty == expected,
        Some(Value::Array(types)) => types.iter().any(|ty| ty.as_str() == Some(expected)),
        _ => false,
    }
}

fn is_lower_snake_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Array schemas must declare `minItems` and `maxItems` somewhere in their
/// `allOf` merge scope - unbounded collections are a pagination hazard.
pub struct ArrayBounds;

impl Check for ArrayBounds {
    fn id(&self) -> &'static str {
        "array-bounds"
    }
    fn description(&self) -> &'static str {
        "array schemas declare minItems and maxItems"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Schema]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        if occurrence.inside_not() || !declares_type(occurrence.node, "array") {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        if effective.value("minItems").is_none() {
            findings.push(Finding::new(
                "array schema is missing minItems",
                occurrence.path.clone(),
            ));
        }
        if effective.value("maxItems").is_none() {
            findings.push(Finding::new(
                "array schema is missing maxItems",
                occurrence.path.clone(),
            ));
        }
        Ok(findings)
    }
}

/// String patterns must be anchored with `^` and `$`; an un-anchored
/// pattern matches substrings and accepts almost everything.
pub struct PatternAnchor;

impl Check for PatternAnchor {
    fn id(&self) -> &'static str {
        "pattern-anchor"
    }
    fn description(&self) -> &'static str {
        "pattern values are anchored with ^ and $"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Schema]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        let Some(value) = occurrence.node.get("pattern") else {
            return Ok(Vec::new());
        };
        let Some(pattern) = value.as_str() else {
            return Err(CheckError::UnexpectedShape {
                key: "pattern".into(),
                expected: "string",
                actual: json_type_name(value),
            });
        };

        if pattern.starts_with('^') && pattern.ends_with('$') {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::new(
            format!("pattern \"{}\" is not anchored with ^ and $", pattern),
            occurrence.path.child_key("pattern"),
        )])
    }
}

/// Every name a schema requires must exist in its effective property set.
/// The property may legitimately live in a different `allOf` branch.
pub struct RequiredPropertyDefined;

impl Check for RequiredPropertyDefined {
    fn id(&self) -> &'static str {
        "required-property-defined"
    }
    fn description(&self) -> &'static str {
        "required names exist in the effective property set"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Schema]
    }
    fn default_severity(&self) -> Severity {
        Severity::Error
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        if occurrence.inside_not() {
            return Ok(Vec::new());
        }
        let Some(required) = occurrence.node.get("required").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        let properties = &effective.attributes().properties;
        let mut findings = Vec::new();
        for (index, name) in required.iter().enumerate() {
            let Some(name) = name.as_str() else {
                continue;
            };
            if !properties.contains(name) {
                findings.push(Finding::new(
                    format!("required property \"{}\" is not defined in properties", name),
                    occurrence.path.child_key("required").child_index(index),
                ));
            }
        }
        Ok(findings)
    }
}

/// `enum` entries must be distinct.
pub struct EnumUnique;

impl Check for EnumUnique {
    fn id(&self) -> &'static str {
        "enum-unique"
    }
    fn description(&self) -> &'static str {
        "enum entries are distinct"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Schema]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        let Some(value) = occurrence.node.get("enum") else {
            return Ok(Vec::new());
        };
        let Some(entries) = value.as_array() else {
            return Err(CheckError::UnexpectedShape {
                key: "enum".into(),
                expected: "array",
                actual: json_type_name(value),
            });
        };

        let mut findings = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            if entries[..index].contains(entry) {
                findings.push(Finding::new(
                    format!("duplicate enum entry {}", entry),
                    occurrence.path.child_key("enum").child_index(index),
                ));
            }
        }
        Ok(findings)
    }
}

/// Operations must carry a non-empty `operationId`.
pub struct OperationId;

impl Check for OperationId {
    fn id(&self) -> &'static str {
        "operation-id"
    }
    fn description(&self) -> &'static str {
        "operations declare a non-empty operationId"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Operation]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        match occurrence.node.get("operationId") {
            None => Ok(vec![Finding::new(
                "operation is missing operationId",
                occurrence.path.clone(),
            )]),
            Some(Value::String(id)) if id.is_empty() => Ok(vec![Finding::new(
                "operationId must not be empty",
                occurrence.path.child_key("operationId"),
            )]),
            Some(Value::String(_)) => Ok(Vec::new()),
            Some(other) => Err(CheckError::UnexpectedShape {
                key: "operationId".into(),
                expected: "string",
                actual: json_type_name(other),
            }),
        }
    }
}

/// Parameter names are lower snake case.
pub struct ParameterNameCase;

impl Check for ParameterNameCase {
    fn id(&self) -> &'static str {
        "parameter-name-case"
    }
    fn description(&self) -> &'static str {
        "parameter names are lower snake case"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Parameter]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        let Some(name) = occurrence.node.get("name").and_then(Value::as_str) else {
            return Ok(Vec::new());
        };
        if is_lower_snake_case(name) {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::new(
            format!("parameter name \"{}\" is not lower snake case", name),
            occurrence.path.child_key("name"),
        )])
    }
}

/// Server URLs must not end with a slash; joined paths would double it.
pub struct ServerTrailingSlash;

impl Check for ServerTrailingSlash {
    fn id(&self) -> &'static str {
        "server-trailing-slash"
    }
    fn description(&self) -> &'static str {
        "server urls do not end with a slash"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Server]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        let Some(url) = occurrence.node.get("url").and_then(Value::as_str) else {
            return Ok(Vec::new());
        };
        if url.len() > 1 && url.ends_with('/') {
            return Ok(vec![Finding::new(
                format!("server url \"{}\" must not end with a slash", url),
                occurrence.path.child_key("url"),
            )]);
        }
        Ok(Vec::new())
    }
}

/// Responses must carry a non-empty `description`.
pub struct ResponseDescription;

impl Check for ResponseDescription {
    fn id(&self) -> &'static str {
        "response-description"
    }
    fn description(&self) -> &'static str {
        "responses declare a non-empty description"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::Response]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        match occurrence.node.get("description") {
            None => Ok(vec![Finding::new(
                "response is missing description",
                occurrence.path.clone(),
            )]),
            Some(Value::String(text)) if text.is_empty() => Ok(vec![Finding::new(
                "response description must not be empty",
                occurrence.path.child_key("description"),
            )]),
            Some(Value::String(_)) => Ok(Vec::new()),
            Some(other) => Err(CheckError::UnexpectedShape {
                key: "description".into(),
                expected: "string",
                actual: json_type_name(other),
            }),
        }
    }
}

/// Security requirements must name at least one scheme; an empty
/// requirement object silently makes authentication optional.
pub struct SecurityRequirementNamed;

impl Check for SecurityRequirementNamed {
    fn id(&self) -> &'static str {
        "security-requirement-named"
    }
    fn description(&self) -> &'static str {
        "security requirements name at least one scheme"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::SecurityRequirement]
    }
    fn default_severity(&self) -> Severity {
        Severity::Info
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        let Some(requirement) = occurrence.node.as_object() else {
            return Err(CheckError::UnexpectedShape {
                key: "security".into(),
                expected: "object",
                actual: json_type_name(occurrence.node),
            });
        };
        if requirement.is_empty() {
            return Ok(vec![Finding::new(
                "security requirement is empty, making authentication optional",
                occurrence.path.clone(),
            )]);
        }
        Ok(Vec::new())
    }
}

/// Static route segments are lower kebab case; template parameters
/// (`{itemId}`) keep their own convention and are skipped.
pub struct PathKebabCase;

impl Check for PathKebabCase {
    fn id(&self) -> &'static str {
        "path-kebab-case"
    }
    fn description(&self) -> &'static str {
        "static path segments are lower kebab case"
    }
    fn targets(&self) -> &'static [NodeKind] {
        &[NodeKind::PathItem]
    }
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        _effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError> {
        let Some(crate::types::Segment::Key(route)) = occurrence.path.segments().last() else {
            return Ok(Vec::new());
        };
        if static_segments_are_kebab(route) {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::new(
            format!("path \"{}\" is not lower kebab case", route),
            occurrence.path.clone(),
        )])
    }
}

fn static_segments_are_kebab(route: &str) -> bool {
    let mut in_template = false;
    for c in route.chars() {
        match c {
            '{' => in_template = true,
            '}' => in_template = false,
            _ if in_template => {}
            c if c.is_ascii_uppercase() || c == '_' => return false,
            _ => {}
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LintConfig;
    use crate::dispatch::{Engine, TracingReporter};
    use crate::resolver;
    use crate::types::Diagnostic;
    use serde_json::json;

    fn run_rule(rule: Box<dyn Check>, doc: &Value) -> Vec<Diagnostic> {
        let resolved = resolver::resolve(doc);
        let reporter = TracingReporter;
        let engine = Engine::new(vec![rule], LintConfig::default(), &reporter);
        engine.run(&resolved).unwrap()
    }

    /// Wraps a schema in a minimal document with one GET response.
    fn doc_with_schema(schema: Value) -> Value {
        json!({
            "openapi": "3.0.3",
            "paths": {
                "/t": {
                    "get": {
                        "responses": {
                            "200": {
                                "content": { "application/json": { "schema": schema } }
                            }
                        }
                    }
                }
            }
        })
    }

    const SCHEMA_BASE: &str = "/paths/~1t/get/responses/200/content/application~1json/schema";

    #[test]
    fn array_bounds_reports_both_missing_limits() {
        let doc = doc_with_schema(json!({ "type": "array", "items": { "type": "string" } }));
        let diagnostics = run_rule(Box::new(ArrayBounds), &doc);

        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].message.contains("minItems"));
        assert!(diagnostics[1].message.contains("maxItems"));
        assert!(diagnostics
            .iter()
            .all(|d| d.path.to_string() == SCHEMA_BASE));
    }

    #[test]
    fn array_bounds_sees_limits_in_sibling_branch() {
        let doc = doc_with_schema(json!({
            "allOf": [
                { "minItems": 0, "maxItems": 50 },
                { "type": "array", "items": { "type": "string" } }
            ]
        }));
        assert!(run_rule(Box::new(ArrayBounds), &doc).is_empty());
    }

    #[test]
    fn array_bounds_skips_negated_scope() {
        let doc = doc_with_schema(json!({ "not": { "type": "array" } }));
        assert!(run_rule(Box::new(ArrayBounds), &doc).is_empty());
    }

    #[test]
    fn pattern_anchor_flags_unanchored() {
        let doc = doc_with_schema(json!({ "type": "string", "pattern": "[a-z]+" }));
        let diagnostics = run_rule(Box::new(PatternAnchor), &doc);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].path.to_string(),
            format!("{}/pattern", SCHEMA_BASE)
        );
    }

    #[test]
    fn pattern_anchor_accepts_anchored() {
        let doc = doc_with_schema(json!({ "type": "string", "pattern": "^[a-z]+$" }));
        assert!(run_rule(Box::new(PatternAnchor), &doc).is_empty());
    }

    #[test]
    fn required_defined_accepts_property_in_sibling_branch() {
        let doc = doc_with_schema(json!({
            "allOf": [
                { "required": ["id"] },
                { "properties": { "id": { "type": "string" } } }
            ]
        }));
        assert!(run_rule(Box::new(RequiredPropertyDefined), &doc).is_empty());
    }

    #[test]
    fn required_defined_flags_missing_property() {
        let doc = doc_with_schema(json!({
            "required": ["id", "ghost"],
            "properties": { "id": { "type": "string" } }
        }));
        let diagnostics = run_rule(Box::new(RequiredPropertyDefined), &doc);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("\"ghost\""));
        assert_eq!(
            diagnostics[0].path.to_string(),
            format!("{}/required/1", SCHEMA_BASE)
        );
    }

    #[test]
    fn required_defined_does_not_merge_across_oneof() {
        let doc = doc_with_schema(json!({
            "oneOf": [
                { "required": ["a"], "properties": { "b": { "type": "string" } } },
                { "properties": { "a": { "type": "string" } } }
            ]
        }));
        let diagnostics = run_rule(Box::new(RequiredPropertyDefined), &doc);

        // Branch 0 must not see branch 1's property.
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("\"a\""));
    }

    #[test]
    fn enum_unique_flags_duplicates() {
        let doc = doc_with_schema(json!({ "enum": ["a", "b", "a", "a"] }));
        let diagnostics = run_rule(Box::new(EnumUnique), &doc);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics[0].path.to_string(),
            format!("{}/enum/2", SCHEMA_BASE)
        );
        assert_eq!(
            diagnostics[1].path.to_string(),
            format!("{}/enum/3", SCHEMA_BASE)
        );
    }

    #[test]
    fn enum_unique_malformed_enum_is_isolated() {
        // enum of the wrong shape fails the rule, not the run.
        let doc = doc_with_schema(json!({ "enum": "not an array" }));
        assert!(run_rule(Box::new(EnumUnique), &doc).is_empty());
    }

    #[test]
    fn operation_id_missing_and_empty() {
        let doc = json!({
            "openapi": "3.0.3",
            "paths": {
                "/a": { "get": { "responses": {} } },
                "/b": { "get": { "operationId": "", "responses": {} } },
                "/c": { "get": { "operationId": "list_c", "responses": {} } }
            }
        });
        let diagnostics = run_rule(Box::new(OperationId), &doc);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].path.to_string(), "/paths/~1a/get");
        assert_eq!(
            diagnostics[1].path.to_string(),
            "/paths/~1b/get/operationId"
        );
    }

    #[test]
    fn parameter_name_case() {
        let doc = json!({
            "openapi": "3.0.3",
            "paths": {
                "/t": {
                    "get": {
                        "parameters": [
                            { "name": "pageSize", "in": "query" },
                            { "name": "page_size", "in": "query" }
                        ],
                        "responses": {}
                    }
                }
            }
        });
        let diagnostics = run_rule(Box::new(ParameterNameCase), &doc);

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("pageSize"));
    }

    #[test]
    fn server_trailing_slash() {
        let doc = json!({
            "openapi": "3.0.3",
            "servers": [
                { "url": "https://api.example.com/" },
                { "url": "https://api.example.com" },
                { "url": "/" }
            ],
            "paths": {}
        });
        let diagnostics = run_rule(Box::new(ServerTrailingSlash), &doc);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path.to_string(), "/servers/0/url");
    }

    #[test]
    fn response_description_missing_and_empty() {
        let doc = json!({
            "openapi": "3.0.3",
            "paths": {
                "/t": {
                    "get": {
                        "operationId": "get_t",
                        "responses": {
                            "200": { "description": "ok" },
                            "404": { "description": "" },
                            "500": {}
                        }
                    }
                }
            }
        });
        let diagnostics = run_rule(Box::new(ResponseDescription), &doc);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(
            diagnostics[0].path.to_string(),
            "/paths/~1t/get/responses/404/description"
        );
        assert_eq!(
            diagnostics[1].path.to_string(),
            "/paths/~1t/get/responses/500"
        );
    }

    #[test]
    fn security_requirement_must_name_a_scheme() {
        let doc = json!({
            "openapi": "3.0.3",
            "security": [ { "apiKey": [] }, {} ],
            "paths": {}
        });
        let diagnostics = run_rule(Box::new(SecurityRequirementNamed), &doc);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path.to_string(), "/security/1");
        assert_eq!(diagnostics[0].severity, crate::types::Severity::Info);
    }

    #[test]
    fn path_kebab_case_skips_template_parameters() {
        let doc = json!({
            "openapi": "3.0.3",
            "paths": {
                "/line-items/{itemId}": { "get": { "operationId": "get_item", "responses": {} } },
                "/lineItems": { "get": { "operationId": "list_items", "responses": {} } },
                "/line_items": { "get": { "operationId": "list_all", "responses": {} } }
            }
        });
        let diagnostics = run_rule(Box::new(PathKebabCase), &doc);

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].path.to_string(), "/paths/~1lineItems");
        assert_eq!(diagnostics[1].path.to_string(), "/paths/~1line_items");
    }

    #[test]
    fn builtin_rule_ids_are_unique() {
        let rules = builtin_rules();
        let mut ids: Vec<_> = rules.iter().map(|r| r.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }
}

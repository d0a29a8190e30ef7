//! Composition-aware traversal of the resolved document.
//!
//! Two layers: `walk_document` performs the full deterministic pass over
//! the OpenAPI grammar (servers, security, path items, operations,
//! parameters, request bodies, responses), classifying each position into a
//! `NodeKind`; schema positions are handed to `walk_schema`, which expands
//! composition and container keywords and emits one `Occurrence` per
//! distinct path. Visiting order is depth-first, object keys in document
//! order, arrays by index — rule tests assert diagnostics positionally.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::LoadError;
use crate::resolver::ResolvedDocument;
use crate::types::{CompositionStep, JsonPath, NodeKind, Occurrence, HTTP_METHODS};

/// Walk one schema position, visiting every nested schema fragment
/// reachable through composition and container keywords.
///
/// `marks` is the resolver's circularity set: a node whose `$ref` is marked
/// is visited once with `circular = true` and never descended.
pub fn walk_schema<'a>(
    node: &'a Value,
    path: JsonPath,
    marks: &BTreeSet<String>,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    let mut walk = SchemaWalk {
        marks,
        visitor,
        stack: Vec::new(),
    };
    walk.walk(node, path, Vec::new());
}

struct SchemaWalk<'a, 'v> {
    marks: &'v BTreeSet<String>,
    visitor: &'v mut dyn FnMut(&Occurrence<'a>),
    /// Addresses of nodes on the current recursion stack. Expansion copies
    /// make aliasing unlikely, but identity is the contract that guarantees
    /// termination independent of resolver behavior.
    stack: Vec<usize>,
}

impl<'a> SchemaWalk<'a, '_> {
    fn walk(&mut self, node: &'a Value, path: JsonPath, lineage: Vec<CompositionStep<'a>>) {
        let addr = node as *const Value as usize;
        let circular = self.is_cycle_end(node) || self.stack.contains(&addr);

        let occurrence = Occurrence {
            kind: NodeKind::Schema,
            node,
            path: path.clone(),
            lineage: lineage.clone(),
            circular,
        };
        (self.visitor)(&occurrence);

        if circular {
            return;
        }
        let Some(map) = node.as_object() else {
            return;
        };

        self.stack.push(addr);
        for (key, value) in map {
            match key.as_str() {
                "allOf" | "anyOf" | "oneOf" => {
                    // Malformed composition (not an array) ends descent here;
                    // structural-validity rules report it, the walker doesn't.
                    let Some(members) = value.as_array() else {
                        continue;
                    };
                    for (index, member) in members.iter().enumerate() {
                        let step = match key.as_str() {
                            "allOf" => CompositionStep::AllOf {
                                index,
                                members: members.as_slice(),
                            },
                            "anyOf" => CompositionStep::AnyOf { index },
                            _ => CompositionStep::OneOf { index },
                        };
                        let mut child_lineage = lineage.clone();
                        child_lineage.push(step);
                        self.walk(member, path.child_key(key).child_index(index), child_lineage);
                    }
                }
                "not" => {
                    if value.is_object() {
                        let mut child_lineage = lineage.clone();
                        child_lineage.push(CompositionStep::Not);
                        self.walk(value, path.child_key("not"), child_lineage);
                    }
                }
                // Container keywords below describe a different instance
                // (an element or a property value), so lineage starts fresh:
                // an enclosing allOf constrains this object, not its items.
                "items" => {
                    if value.is_object() {
                        self.walk(value, path.child_key("items"), Vec::new());
                    }
                }
                "properties" | "patternProperties" => {
                    let Some(props) = value.as_object() else {
                        continue;
                    };
                    for (name, prop) in props {
                        self.walk(
                            prop,
                            path.child_key(key).child_key(name),
                            Vec::new(),
                        );
                    }
                }
                "additionalProperties" => {
                    // Boolean forms are not schema occurrences.
                    if value.is_object() {
                        self.walk(value, path.child_key("additionalProperties"), Vec::new());
                    }
                }
                _ => {}
            }
        }
        self.stack.pop();
    }

    fn is_cycle_end(&self, node: &Value) -> bool {
        node.get("$ref")
            .and_then(Value::as_str)
            .map(|pointer| self.marks.contains(pointer))
            .unwrap_or(false)
    }
}

/// One full pass over the resolved document, visiting every reachable
/// server, security requirement, path item, operation, parameter, response,
/// and schema occurrence in deterministic document order.
///
/// `components` definitions are not walked directly: a shared definition is
/// evaluated once per usage site, through the expansions the resolver
/// produced, so diagnostics land on usage paths.
///
/// # Errors
///
/// Returns `LoadError::InvalidDocument` if the document root is not an
/// object — the only unrecoverable condition in the core.
pub fn walk_document<'a>(
    resolved: &'a ResolvedDocument,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) -> Result<(), LoadError> {
    let Some(root) = resolved.root.as_object() else {
        return Err(LoadError::InvalidDocument {
            message: format!(
                "document root must be an object, got {}",
                crate::types::json_type_name(&resolved.root)
            ),
        });
    };

    let marks = &resolved.circular;
    let base = JsonPath::root();

    for (key, value) in root {
        match key.as_str() {
            "servers" => visit_servers(value, base.child_key("servers"), visitor),
            "security" => visit_security(value, base.child_key("security"), visitor),
            "paths" => {
                let Some(paths) = value.as_object() else {
                    continue;
                };
                for (route, item) in paths {
                    visit_path_item(item, base.child_key("paths").child_key(route), marks, visitor);
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn visit_servers<'a>(
    value: &'a Value,
    path: JsonPath,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    let Some(servers) = value.as_array() else {
        return;
    };
    for (index, server) in servers.iter().enumerate() {
        visitor(&Occurrence::new(
            NodeKind::Server,
            server,
            path.child_index(index),
        ));
    }
}

fn visit_security<'a>(
    value: &'a Value,
    path: JsonPath,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    let Some(requirements) = value.as_array() else {
        return;
    };
    for (index, requirement) in requirements.iter().enumerate() {
        visitor(&Occurrence::new(
            NodeKind::SecurityRequirement,
            requirement,
            path.child_index(index),
        ));
    }
}

fn visit_path_item<'a>(
    item: &'a Value,
    path: JsonPath,
    marks: &BTreeSet<String>,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    visitor(&Occurrence::new(NodeKind::PathItem, item, path.clone()));

    let Some(map) = item.as_object() else {
        return;
    };
    for (key, value) in map {
        match key.as_str() {
            "parameters" => {
                visit_parameters(value, path.child_key("parameters"), marks, visitor);
            }
            "servers" => visit_servers(value, path.child_key("servers"), visitor),
            method if HTTP_METHODS.contains(&method) => {
                visit_operation(value, path.child_key(method), marks, visitor);
            }
            _ => {}
        }
    }
}

fn visit_operation<'a>(
    operation: &'a Value,
    path: JsonPath,
    marks: &BTreeSet<String>,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    visitor(&Occurrence::new(NodeKind::Operation, operation, path.clone()));

    let Some(map) = operation.as_object() else {
        return;
    };
    for (key, value) in map {
        match key.as_str() {
            "parameters" => {
                visit_parameters(value, path.child_key("parameters"), marks, visitor);
            }
            "requestBody" => {
                if let Some(content) = value.get("content") {
                    visit_content(
                        content,
                        path.child_key("requestBody").child_key("content"),
                        marks,
                        visitor,
                    );
                }
            }
            "responses" => {
                let Some(responses) = value.as_object() else {
                    continue;
                };
                for (status, response) in responses {
                    visit_response(
                        response,
                        path.child_key("responses").child_key(status),
                        marks,
                        visitor,
                    );
                }
            }
            "security" => visit_security(value, path.child_key("security"), visitor),
            "servers" => visit_servers(value, path.child_key("servers"), visitor),
            _ => {}
        }
    }
}

fn visit_parameters<'a>(
    value: &'a Value,
    path: JsonPath,
    marks: &BTreeSet<String>,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    let Some(parameters) = value.as_array() else {
        return;
    };
    for (index, parameter) in parameters.iter().enumerate() {
        let param_path = path.child_index(index);
        visitor(&Occurrence::new(
            NodeKind::Parameter,
            parameter,
            param_path.clone(),
        ));

        if let Some(schema) = parameter.get("schema") {
            walk_schema(schema, param_path.child_key("schema"), marks, visitor);
        }
        if let Some(content) = parameter.get("content") {
            visit_content(content, param_path.child_key("content"), marks, visitor);
        }
    }
}

fn visit_response<'a>(
    response: &'a Value,
    path: JsonPath,
    marks: &BTreeSet<String>,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    visitor(&Occurrence::new(NodeKind::Response, response, path.clone()));

    if let Some(headers) = response.get("headers").and_then(Value::as_object) {
        for (name, header) in headers {
            if let Some(schema) = header.get("schema") {
                walk_schema(
                    schema,
                    path.child_key("headers").child_key(name).child_key("schema"),
                    marks,
                    visitor,
                );
            }
        }
    }
    if let Some(content) = response.get("content") {
        visit_content(content, path.child_key("content"), marks, visitor);
    }
}

fn visit_content<'a>(
    content: &'a Value,
    path: JsonPath,
    marks: &BTreeSet<String>,
    visitor: &mut dyn FnMut(&Occurrence<'a>),
) {
    let Some(media_types) = content.as_object() else {
        return;
    };
    for (media_type, media) in media_types {
        if let Some(schema) = media.get("schema") {
            walk_schema(
                schema,
                path.child_key(media_type).child_key("schema"),
                marks,
                visitor,
            );
        }
    }
}

//! Reference resolution - replaces `$ref` pointers with their targets.
//!
//! Every `$ref` is expanded at its usage site into a deep, independent copy
//! of the target, so a shared `components` definition referenced from five
//! operations becomes five separate subtrees with five distinct paths. A
//! pointer chain that re-enters itself is expanded one level, left as a
//! literal `$ref`, and recorded as circular; the walker uses those marks to
//! terminate instead of looping. Dangling pointers are diagnostics, never
//! errors, and the input document is never mutated.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::loader::navigate_pointer;
use crate::types::{Diagnostic, JsonPath, Severity};

/// Rule id stamped on diagnostics produced during resolution.
pub const UNRESOLVED_REF: &str = "unresolved-ref";

/// Output of reference resolution: the dereferenced tree, the set of
/// cycle-closing pointers, and the diagnostics collected on the way.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub root: Value,
    /// Pointer texts of refs that close a cycle; left unexpanded in `root`.
    pub circular: BTreeSet<String>,
    /// Dangling or external refs, reported at their usage paths.
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedDocument {
    /// True if `pointer` was found to (transitively) contain itself.
    pub fn is_circular(&self, pointer: &str) -> bool {
        self.circular.contains(pointer)
    }
}

/// Dereference every internal `$ref` in `document`.
///
/// Sibling keys next to a `$ref` are preserved and win over target keys,
/// so a usage site can override e.g. `description` without losing the
/// shared definition.
pub fn resolve(document: &Value) -> ResolvedDocument {
    let mut resolver = Resolver {
        root: document,
        stack: Vec::new(),
        circular: BTreeSet::new(),
        diagnostics: Vec::new(),
    };
    let root = resolver.resolve_value(document, &JsonPath::root());
    ResolvedDocument {
        root,
        circular: resolver.circular,
        diagnostics: resolver.diagnostics,
    }
}

struct Resolver<'a> {
    root: &'a Value,
    /// Pointers currently being expanded; re-entry marks a cycle.
    stack: Vec<String>,
    circular: BTreeSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Resolver<'_> {
    fn resolve_value(&mut self, value: &Value, path: &JsonPath) -> Value {
        match value {
            Value::Object(map) => self.resolve_object(map, path),
            Value::Array(arr) => Value::Array(
                arr.iter()
                    .enumerate()
                    .map(|(i, item)| self.resolve_value(item, &path.child_index(i)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn resolve_object(&mut self, map: &Map<String, Value>, path: &JsonPath) -> Value {
        if let Some(pointer) = map.get("$ref").and_then(Value::as_str) {
            return self.resolve_ref(map, pointer, path);
        }

        let mut result = Map::new();
        for (key, value) in map {
            result.insert(key.clone(), self.resolve_value(value, &path.child_key(key)));
        }
        Value::Object(result)
    }

    fn resolve_ref(&mut self, map: &Map<String, Value>, pointer: &str, path: &JsonPath) -> Value {
        if !pointer.starts_with('#') {
            // Multi-file merging happens upstream of the core; any external
            // pointer still present here cannot be resolved.
            self.diagnostics.push(Diagnostic {
                rule: UNRESOLVED_REF.to_string(),
                message: format!("external reference not resolved: {}", pointer),
                severity: Severity::Warning,
                path: path.clone(),
            });
            return Value::Object(map.clone());
        }

        if self.stack.iter().any(|entered| entered == pointer) {
            // Cycle: stop expanding, leave the literal $ref and mark it.
            self.circular.insert(pointer.to_string());
            return Value::Object(map.clone());
        }

        let Some(target) = navigate_pointer(self.root, pointer) else {
            self.diagnostics.push(Diagnostic {
                rule: UNRESOLVED_REF.to_string(),
                message: format!("reference target not found: {}", pointer),
                severity: Severity::Warning,
                path: path.clone(),
            });
            return Value::Object(map.clone());
        };

        self.stack.push(pointer.to_string());
        let expanded = self.resolve_value(target, path);
        self.stack.pop();

        let target_obj = match expanded {
            Value::Object(obj) => obj,
            // Boolean or scalar schema target: nothing to merge siblings into.
            other => return other,
        };

        // Usage-site siblings win over target keys.
        let mut merged = Map::new();
        for (key, value) in map {
            if key != "$ref" {
                merged.insert(key.clone(), self.resolve_value(value, &path.child_key(key)));
            }
        }
        for (key, value) in target_obj {
            merged.entry(key).or_insert(value);
        }
        Value::Object(merged)
    }
}

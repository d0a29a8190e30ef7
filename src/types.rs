//! Core types for OpenAPI design-rule analysis.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// HTTP methods that identify operation objects inside a path item.
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One step in a location path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of an occurrence as the ordered sequence of keys and indices
/// from the document root.
///
/// Equality is positional: two usages of the same shared definition at
/// different call sites never compare equal, even though their nodes are
/// copies of one `components` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath(Vec<Segment>);

impl JsonPath {
    /// The document root (empty path).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn push_key(&mut self, key: impl Into<String>) {
        self.0.push(Segment::Key(key.into()));
    }

    pub fn push_index(&mut self, index: usize) {
        self.0.push(Segment::Index(index));
    }

    /// New path with `key` appended.
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut child = self.clone();
        child.push_key(key);
        child
    }

    /// New path with `index` appended.
    pub fn child_index(&self, index: usize) -> Self {
        let mut child = self.clone();
        child.push_index(index);
        child
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// RFC 6901 pointer text (`/paths/~1v1~1items/get`).
    pub fn pointer(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                // JSON Pointer escaping: ~ -> ~0, / -> ~1
                Segment::Key(key) => {
                    write!(f, "/{}", key.replace('~', "~0").replace('/', "~1"))?;
                }
                Segment::Index(index) => write!(f, "/{}", index)?,
            }
        }
        Ok(())
    }
}

impl Serialize for JsonPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Grammatical position of an occurrence in the OpenAPI document.
///
/// Computed once during the document walk from where a node sits in the
/// grammar, never by sniffing field names; an extension object that happens
/// to carry a `properties` key is not a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    PathItem,
    Operation,
    Parameter,
    Response,
    Schema,
    SecurityRequirement,
    Server,
}

/// Severity of a diagnostic.
///
/// Ordered from least to most severe, so `max()` over a diagnostic list
/// yields the overall status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A single reported finding: rule id, message, severity, and the exact
/// document path of the occurrence that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub rule: String,
    pub message: String,
    pub severity: Severity,
    pub path: JsonPath,
}

/// One composition step on the way to an occurrence, outermost first.
///
/// Only `allOf` carries its sibling list: merge semantics union attributes
/// across every member of the same `allOf`, while `anyOf`/`oneOf`/`not`
/// are boundaries that merging never crosses.
#[derive(Debug, Clone, Copy)]
pub enum CompositionStep<'a> {
    AllOf { index: usize, members: &'a [Value] },
    AnyOf { index: usize },
    OneOf { index: usize },
    Not,
}

impl CompositionStep<'_> {
    pub fn keyword(&self) -> &'static str {
        match self {
            CompositionStep::AllOf { .. } => "allOf",
            CompositionStep::AnyOf { .. } => "anyOf",
            CompositionStep::OneOf { .. } => "oneOf",
            CompositionStep::Not => "not",
        }
    }

    /// True for steps that open an independent evaluation scope.
    pub fn is_boundary(&self) -> bool {
        !matches!(self, CompositionStep::AllOf { .. })
    }
}

/// One concrete usage of a schema, parameter, response, or other node in
/// the resolved document.
///
/// Ephemeral: created as the walker descends, discarded as it backtracks.
/// `node` borrows from the resolved document, which is never mutated.
#[derive(Debug, Clone)]
pub struct Occurrence<'a> {
    pub kind: NodeKind,
    pub node: &'a Value,
    pub path: JsonPath,
    /// Composition steps taken to reach this occurrence, outermost first.
    pub lineage: Vec<CompositionStep<'a>>,
    /// Set when the node closes a reference cycle; the walker does not
    /// descend past it.
    pub circular: bool,
}

impl<'a> Occurrence<'a> {
    pub fn new(kind: NodeKind, node: &'a Value, path: JsonPath) -> Self {
        Self {
            kind,
            node,
            path,
            lineage: Vec::new(),
            circular: false,
        }
    }

    /// True if any lineage step is a `not` — most attribute checks skip
    /// negated scopes, since a "wrong" attribute inside a negation is not
    /// itself a violation.
    pub fn inside_not(&self) -> bool {
        self.lineage
            .iter()
            .any(|step| matches!(step, CompositionStep::Not))
    }
}

/// Merged attribute view of one occurrence once `allOf` composition is
/// taken into account. Never unions across `oneOf`/`anyOf` alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveAttributes {
    pub required: BTreeSet<String>,
    pub properties: BTreeSet<String>,
    pub types: BTreeSet<String>,
}

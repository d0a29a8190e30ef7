//! OpenAPI design-rule engine.
//!
//! Statically analyzes OpenAPI documents against a catalog of design rules
//! and reports violations as diagnostics with location, message, and
//! severity.
//!
//! The core is a schema-resolution and composition-aware traversal engine:
//! shared `components` definitions are dereferenced once per usage site (so
//! diagnostics land on usage paths, not definition paths), composition
//! keywords (`allOf`/`anyOf`/`oneOf`/`not`) are expanded with exact
//! per-occurrence paths and lineage, and an `allOf`-aware merge primitive
//! gives rules the effective attribute view a schema actually has.
//!
//! # Example
//!
//! ```
//! use oas_lint::{builtin_rules, Engine, LintConfig, TracingReporter};
//! use serde_json::json;
//!
//! let document = json!({
//!     "openapi": "3.0.3",
//!     "paths": {
//!         "/v1/items": {
//!             "get": {
//!                 "operationId": "list_items",
//!                 "responses": {
//!                     "200": {
//!                         "description": "A page of items",
//!                         "content": {
//!                             "application/json": {
//!                                 "schema": { "$ref": "#/components/schemas/ItemList" }
//!                             }
//!                         }
//!                     }
//!                 }
//!             }
//!         }
//!     },
//!     "components": {
//!         "schemas": {
//!             "ItemList": { "type": "array", "items": { "type": "string" } }
//!         }
//!     }
//! });
//!
//! let resolved = oas_lint::resolve(&document);
//! let reporter = TracingReporter;
//! let engine = Engine::new(builtin_rules(), LintConfig::default(), &reporter);
//! let diagnostics = engine.run(&resolved).unwrap();
//!
//! // The shared array schema is unbounded: minItems and maxItems missing,
//! // reported at the usage path under /paths, not at the definition.
//! assert_eq!(diagnostics.len(), 2);
//! assert!(diagnostics[0].path.to_string().starts_with("/paths"));
//! ```

mod checks;
mod config;
mod dispatch;
mod error;
mod linter;
mod loader;
mod merge;
mod resolver;
mod types;
mod walker;

pub use checks::{
    builtin_rules, ArrayBounds, EnumUnique, OperationId, ParameterNameCase, PatternAnchor,
    RequiredPropertyDefined, ServerTrailingSlash,
};
pub use config::{LintConfig, RuleLevel};
pub use dispatch::{Check, Effective, Engine, Finding, Reporter, TracingReporter};
pub use error::{CheckError, LoadError};
pub use linter::{
    lint, lint_file, FileResult, FileStatus, LintResult, INVALID_DOCUMENT, SYNTAX_ERROR,
};
pub use loader::{is_url, load_document, load_document_auto, load_document_str, navigate_pointer};
pub use merge::{effective_attributes, effective_value};
pub use resolver::{resolve, ResolvedDocument, UNRESOLVED_REF};
pub use types::{
    CompositionStep, Diagnostic, EffectiveAttributes, JsonPath, NodeKind, Occurrence, Segment,
    Severity,
};
pub use walker::{walk_document, walk_schema};

#[cfg(feature = "remote")]
pub use loader::load_document_url;

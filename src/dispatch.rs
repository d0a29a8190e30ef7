//! Rule dispatch and diagnostic aggregation.
//!
//! The engine drives one walker pass per document, fans each occurrence
//! out to the registered rules that target its kind, and collects stamped
//! diagnostics in discovery order. A failing rule is reported through the
//! injected `Reporter` and skipped for that occurrence only; it never
//! aborts the run or other rules.

use std::cell::OnceCell;

use serde_json::Value;

use crate::config::LintConfig;
use crate::error::{CheckError, LoadError};
use crate::merge::{effective_attributes, effective_value};
use crate::resolver::ResolvedDocument;
use crate::types::{
    Diagnostic, EffectiveAttributes, JsonPath, NodeKind, Occurrence, Severity,
};
use crate::walker::walk_document;

/// A finding as produced by a rule, before the dispatcher stamps it with
/// the rule id and configured severity.
#[derive(Debug, Clone)]
pub struct Finding {
    pub message: String,
    pub path: JsonPath,
}

impl Finding {
    pub fn new(message: impl Into<String>, path: JsonPath) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }
}

/// Lazily computed merged view of the current occurrence, shared by every
/// rule invoked on it. The merge only runs if some rule asks.
pub struct Effective<'a, 'o> {
    occurrence: &'o Occurrence<'a>,
    attributes: OnceCell<EffectiveAttributes>,
}

impl<'a, 'o> Effective<'a, 'o> {
    pub(crate) fn new(occurrence: &'o Occurrence<'a>) -> Self {
        Self {
            occurrence,
            attributes: OnceCell::new(),
        }
    }

    /// Merged `required`/`properties`/`type` view (see `merge`).
    pub fn attributes(&self) -> &EffectiveAttributes {
        self.attributes
            .get_or_init(|| effective_attributes(self.occurrence))
    }

    /// Effective value of `key` within the occurrence's `allOf` merge scope.
    pub fn value(&self, key: &str) -> Option<&'a Value> {
        effective_value(self.occurrence, key)
    }
}

/// A single design rule: identity, targeting, default severity, and the
/// visit function invoked per matching occurrence.
pub trait Check {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn targets(&self) -> &'static [NodeKind];
    fn default_severity(&self) -> Severity;
    fn visit(
        &self,
        occurrence: &Occurrence<'_>,
        effective: &Effective<'_, '_>,
    ) -> Result<Vec<Finding>, CheckError>;
}

/// Sink for recoverable engine events, injected at construction so tests
/// can capture it and embedders can silence it.
pub trait Reporter {
    fn rule_failed(&self, rule: &str, path: &JsonPath, error: &CheckError);
}

/// Default reporter: forwards to `tracing`.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn rule_failed(&self, rule: &str, path: &JsonPath, error: &CheckError) {
        tracing::debug!(rule, path = %path, error = %error, "rule skipped on occurrence");
    }
}

/// The dispatcher: an ordered rule set plus a severity table and reporter.
pub struct Engine<'r> {
    rules: Vec<Box<dyn Check>>,
    config: LintConfig,
    reporter: &'r dyn Reporter,
}

impl<'r> Engine<'r> {
    pub fn new(rules: Vec<Box<dyn Check>>, config: LintConfig, reporter: &'r dyn Reporter) -> Self {
        Self {
            rules,
            config,
            reporter,
        }
    }

    /// The registered rules, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Check> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Run every enabled rule over the resolved document.
    ///
    /// Resolver diagnostics (dangling refs) lead the output; the rest
    /// follow walker discovery order, then registration order within one
    /// occurrence. Two runs over the same input yield identical output.
    ///
    /// # Errors
    ///
    /// Only `LoadError::InvalidDocument` (non-object root) escapes;
    /// everything else degrades to partial results plus reporter events.
    pub fn run(&self, resolved: &ResolvedDocument) -> Result<Vec<Diagnostic>, LoadError> {
        // Severity resolution happens once; `off` rules are never invoked.
        let active: Vec<(&dyn Check, Severity)> = self
            .rules
            .iter()
            .filter_map(|rule| {
                self.config
                    .severity_for(rule.id(), rule.default_severity())
                    .map(|severity| (rule.as_ref(), severity))
            })
            .collect();

        let mut diagnostics = resolved.diagnostics.clone();

        walk_document(resolved, &mut |occurrence| {
            let effective = Effective::new(occurrence);
            for (rule, severity) in &active {
                if !rule.targets().contains(&occurrence.kind) {
                    continue;
                }
                match rule.visit(occurrence, &effective) {
                    Ok(findings) => {
                        for finding in findings {
                            diagnostics.push(Diagnostic {
                                rule: rule.id().to_string(),
                                message: finding.message,
                                severity: *severity,
                                path: finding.path,
                            });
                        }
                    }
                    Err(error) => {
                        self.reporter.rule_failed(rule.id(), &occurrence.path, &error);
                    }
                }
            }
        })?;

        Ok(diagnostics)
    }
}

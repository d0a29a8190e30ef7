//! Rule configuration - the severity table.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::types::Severity;

/// Configured level for one rule: a severity override or `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Off,
    Hint,
    Info,
    Warning,
    Error,
}

impl RuleLevel {
    /// The severity this level maps to, or `None` for `off`.
    pub fn severity(self) -> Option<Severity> {
        match self {
            RuleLevel::Off => None,
            RuleLevel::Hint => Some(Severity::Hint),
            RuleLevel::Info => Some(Severity::Info),
            RuleLevel::Warning => Some(Severity::Warning),
            RuleLevel::Error => Some(Severity::Error),
        }
    }
}

/// Severity table mapping rule ids to levels. Unlisted rules keep their
/// default severity; the engine treats `off` rules as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    #[serde(default)]
    pub rules: BTreeMap<String, RuleLevel>,
}

impl LintConfig {
    /// Effective severity for a rule, `None` when configured off.
    pub fn severity_for(&self, rule: &str, default: Severity) -> Option<Severity> {
        match self.rules.get(rule) {
            Some(level) => level.severity(),
            None => Some(default),
        }
    }

    /// Load a configuration file (JSON or YAML).
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let value = crate::loader::load_document(path)?;
        serde_json::from_value(value).map_err(|source| LoadError::InvalidJson { source })
    }
}

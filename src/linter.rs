//! File-level linting - load, resolve, and run the engine over files.
//!
//! If given a directory, recursively finds all `.json`/`.yaml`/`.yml`
//! files and aggregates per-file results.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::checks::builtin_rules;
use crate::config::LintConfig;
use crate::dispatch::{Engine, TracingReporter};
use crate::loader::load_document;
use crate::resolver;
use crate::types::{Diagnostic, JsonPath, Severity};

/// Rule id stamped on file-level load failures.
pub const SYNTAX_ERROR: &str = "syntax-error";
/// Rule id stamped on documents the engine cannot traverse at all.
pub const INVALID_DOCUMENT: &str = "invalid-document";

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If `strict` is true, warnings are treated as errors when counting
/// failed files. Returns aggregated results for all files.
pub fn lint(path: &Path, config: &LintConfig, strict: bool) -> LintResult {
    let files = collect_document_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path, config);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single OpenAPI document file with the builtin rule set.
pub fn lint_file(file: &Path, base_path: &Path, config: &LintConfig) -> FileResult {
    let mut diagnostics = Vec::new();

    let document = match load_document(file) {
        Ok(doc) => doc,
        Err(e) => {
            diagnostics.push(Diagnostic {
                rule: SYNTAX_ERROR.to_string(),
                message: e.to_string(),
                severity: Severity::Error,
                path: JsonPath::root(),
            });
            return FileResult {
                file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
                status: FileStatus::Error,
                diagnostics,
            };
        }
    };

    let resolved = resolver::resolve(&document);
    let reporter = TracingReporter;
    let engine = Engine::new(builtin_rules(), config.clone(), &reporter);

    match engine.run(&resolved) {
        Ok(run_diagnostics) => diagnostics.extend(run_diagnostics),
        Err(e) => diagnostics.push(Diagnostic {
            rule: INVALID_DOCUMENT.to_string(),
            message: e.to_string(),
            severity: Severity::Error,
            path: JsonPath::root(),
        }),
    }

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let has_warnings = diagnostics.iter().any(|d| d.severity == Severity::Warning);

    let status = if has_errors {
        FileStatus::Error
    } else if has_warnings {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    };

    FileResult {
        file: file.strip_prefix(base_path).unwrap_or(file).to_path_buf(),
        status,
        diagnostics,
    }
}

/// Collect all document files in a path (file or directory).
fn collect_document_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if is_document_file(path) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_document_file(&path) {
            files.push(path);
        }
    }
}

fn is_document_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "json" || ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}

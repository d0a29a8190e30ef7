//! Error types for document loading and rule execution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading an OpenAPI document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid document: {message}")]
    InvalidDocument { message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Failure inside a single rule's visit function.
///
/// A `CheckError` never aborts the run: the dispatcher reports it through
/// the injected reporter and skips the rule for that occurrence only.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("expected {expected} at {key}, got {actual}")]
    UnexpectedShape {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("missing ancestor object for {pointer}")]
    MissingAncestor { pointer: String },

    #[error("{message}")]
    Internal { message: String },
}

//! Error types and load result structures for the rule loader.

use std::fmt;

use crate::schema::RuleSource;

/// Errors that can occur while reading a rule source.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse/deserialization error (synced rules).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse/deserialization error (builtin and custom rules).
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Rule validation error (e.g. empty id, missing action).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of loading a single rule entry, document or file.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Source the entry belongs to.
    pub source: RuleSource,
    /// Where it came from: a file path, `synced[3]`, `builtin[12]`, ...
    pub origin: String,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single load attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Rule was successfully loaded.
    Loaded { rule_id: String },
    /// Entry was skipped (dotfile, non-YAML, empty document).
    Skipped { reason: String },
    /// Parse or validation error occurred.
    Failed { error: String },
}

impl LoadResult {
    pub(super) fn loaded(source: RuleSource, origin: impl Into<String>, rule_id: &str) -> Self {
        Self {
            source,
            origin: origin.into(),
            status: LoadStatus::Loaded {
                rule_id: rule_id.to_string(),
            },
        }
    }

    pub(super) fn skipped(source: RuleSource, origin: impl Into<String>, reason: &str) -> Self {
        Self {
            source,
            origin: origin.into(),
            status: LoadStatus::Skipped {
                reason: reason.to_string(),
            },
        }
    }

    pub(super) fn failed(source: RuleSource, origin: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            source,
            origin: origin.into(),
            status: LoadStatus::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.status, LoadStatus::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, LoadStatus::Failed { .. })
    }
}

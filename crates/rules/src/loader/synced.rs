//! Rules pulled from the control plane as a JSON array.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::{Rule, RuleRecord, RuleSource};

use super::error::{LoadResult, Result, RuleError};

/// Where synced rules come from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SyncedSource {
    #[default]
    None,
    /// A JSON file written by the sync client.
    File(PathBuf),
    /// A JSON document handed over in memory.
    Inline(String),
}

pub(super) fn load(synced: &SyncedSource, rules: &mut Vec<Rule>, results: &mut Vec<LoadResult>) {
    let (origin, text) = match synced {
        SyncedSource::None => return,
        SyncedSource::Inline(text) => ("synced".to_string(), text.clone()),
        SyncedSource::File(path) => {
            let origin = path.display().to_string();
            if !path.exists() {
                debug!(path = %origin, "synced rules file not found");
                results.push(LoadResult::skipped(RuleSource::Synced, origin, "file not found"));
                return;
            }
            match fs::read_to_string(path) {
                Ok(text) => (origin, text),
                Err(e) => {
                    warn!(path = %origin, error = %e, "failed to read synced rules");
                    results.push(LoadResult::failed(RuleSource::Synced, origin, e));
                    return;
                }
            }
        }
    };

    let entries = match parse_array(&text) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(origin = %origin, error = %e, "synced rules rejected");
            results.push(LoadResult::failed(RuleSource::Synced, origin, e));
            return;
        }
    };

    for (i, entry) in entries.into_iter().enumerate() {
        let entry_origin = format!("{origin}[{i}]");
        let parsed = serde_json::from_value::<RuleRecord>(entry)
            .map_err(|e| e.to_string())
            .and_then(|record| record.into_rule(RuleSource::Synced));
        match parsed {
            Ok(rule) => {
                debug!(rule_id = %rule.id, origin = %entry_origin, "loaded synced rule");
                results.push(LoadResult::loaded(RuleSource::Synced, entry_origin, &rule.id));
                rules.push(rule);
            }
            Err(e) => {
                warn!(origin = %entry_origin, error = %e, "skipping invalid synced rule");
                results.push(LoadResult::failed(RuleSource::Synced, entry_origin, e));
            }
        }
    }
}

/// The top level must be a JSON array; elements are left for per-entry parsing.
fn parse_array(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(entries) => Ok(entries),
        other => Err(RuleError::Validation(format!(
            "synced rules must be a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Match, execution and statistics records returned by the engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::{Rule, RuleSource};

/// Output recorded for executions that never reached an executor.
pub const DRY_RUN_OUTPUT: &str = "DRY_RUN";

/// The single rule selected for an incident.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub incident_id: String,
    pub rule: Rule,
    pub action: String,
    pub action_params: Map<String, Value>,
    /// Host the cooldown was checked for; empty when the incident had none.
    pub host_id: String,
    pub matched_at: DateTime<Utc>,
}

/// Outcome of executing a match.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub rule_id: String,
    pub action: String,
    pub host_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub executed_at: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn is_dry_run(&self) -> bool {
        self.output.as_ref().and_then(Value::as_str) == Some(DRY_RUN_OUTPUT)
    }
}

/// Rule counts for inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleStats {
    pub total: usize,
    pub enabled: usize,
    /// Always carries all three sources.
    pub by_source: BTreeMap<RuleSource, usize>,
    /// Cooldown keys recorded so far, live or expired.
    pub cooldown_entries: usize,
}

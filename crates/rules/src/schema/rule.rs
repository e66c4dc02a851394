//! The normalized rule the engine evaluates.

use chrono::Duration;
use serde::Serialize;
use serde_json::{Map, Value};

use super::condition::RuleCondition;
use super::source::RuleSource;

/// Largest whole-second count `chrono::Duration` can hold.
const MAX_DURATION_SECS: i64 = i64::MAX / 1000;

/// A declarative remediation rule.
///
/// `id` is unique within a source only; precedence across sources comes from
/// `priority` (lower wins) and first-match evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    /// ANDed; an empty list matches every incident.
    pub conditions: Vec<RuleCondition>,
    pub action: String,
    pub action_params: Map<String, Value>,
    pub hipaa_controls: Vec<String>,
    pub enabled: bool,
    pub priority: i64,
    /// Zero disables the cooldown.
    pub cooldown_seconds: u64,
    /// Empty accepts every severity.
    pub severity_filter: Vec<String>,
    pub source: RuleSource,
}

impl Rule {
    /// Whether an incident of this severity may be handled by the rule.
    pub fn accepts_severity(&self, severity: &str) -> bool {
        self.severity_filter.is_empty()
            || self
                .severity_filter
                .iter()
                .any(|s| s.eq_ignore_ascii_case(severity))
    }

    /// Saturates at the largest representable `Duration`.
    pub fn cooldown(&self) -> Duration {
        let secs = i64::try_from(self.cooldown_seconds).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(MAX_DURATION_SECS))
    }

    /// Cooldown map key for this rule on a host (`rule_id:host_id`).
    pub fn cooldown_key(&self, host_id: &str) -> String {
        format!("{}:{}", self.id, host_id)
    }
}

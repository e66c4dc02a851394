//! Tolerant wire shape for rules arriving from JSON or YAML.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::condition::RuleCondition;
use super::rule::Rule;
use super::source::RuleSource;

pub const DEFAULT_PRIORITY: i64 = 100;
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 300;

fn default_enabled() -> bool {
    true
}

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

fn default_cooldown() -> u64 {
    DEFAULT_COOLDOWN_SECONDS
}

/// A rule as authored. Unknown fields are ignored, optional fields default,
/// and the action may be given either as `action` or as the first element of
/// `actions`.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub conditions: Option<Vec<RuleCondition>>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub actions: Option<Vec<Value>>,
    #[serde(default)]
    pub action_params: Option<Map<String, Value>>,
    #[serde(default)]
    pub hipaa_controls: Option<Vec<String>>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_cooldown")]
    pub cooldown_seconds: u64,
    #[serde(default)]
    pub severity_filter: Option<Vec<String>>,
}

impl RuleRecord {
    /// The effective action: a non-empty `action`, else the first `actions` entry.
    ///
    /// `actions` entries may be plain strings or objects carrying an
    /// `action` (or `name`) key.
    pub fn resolved_action(&self) -> Option<String> {
        if let Some(action) = self.action.as_deref().map(str::trim) {
            if !action.is_empty() {
                return Some(action.to_string());
            }
        }
        let first = self.actions.as_ref()?.first()?;
        let name = match first {
            Value::String(s) => s.as_str(),
            Value::Object(obj) => obj
                .get("action")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)?,
            _ => return None,
        };
        let name = name.trim();
        (!name.is_empty()).then(|| name.to_string())
    }

    /// Validate and normalize into a [`Rule`] tagged with `source`.
    pub fn into_rule(self, source: RuleSource) -> Result<Rule, String> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err("rule id must not be empty".to_string());
        }
        let action = self
            .resolved_action()
            .ok_or_else(|| format!("rule '{id}' has neither `action` nor a usable `actions` entry"))?;

        Ok(Rule {
            name: self.name.filter(|n| !n.is_empty()).unwrap_or_else(|| id.clone()),
            description: self.description.unwrap_or_default(),
            conditions: self.conditions.unwrap_or_default(),
            action,
            action_params: self.action_params.unwrap_or_default(),
            hipaa_controls: self.hipaa_controls.unwrap_or_default(),
            enabled: self.enabled,
            priority: self.priority,
            cooldown_seconds: self.cooldown_seconds,
            severity_filter: self.severity_filter.unwrap_or_default(),
            source,
            id,
        })
    }
}

//! [`RuleEngine`]: first-match rule selection and execution.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use driftguard_core::Incident;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::evaluator::ConditionEvaluator;
use crate::loader::LoadReport;
use crate::schema::{Rule, RuleSource};
use crate::store::RuleStore;

use super::cooldown::CooldownTracker;
use super::executor::Executor;
use super::result::{ExecutionResult, MatchResult, RuleStats, DRY_RUN_OUTPUT};

/// Deterministic rule matcher with per-rule-per-host cooldowns.
///
/// Without an executor the engine runs dry: [`execute`](Self::execute)
/// records the cooldown and reports success without side effects.
pub struct RuleEngine {
    store: Arc<RuleStore>,
    cooldowns: CooldownTracker,
    executor: Option<Arc<dyn Executor>>,
}

impl RuleEngine {
    /// Dry-run engine over `store`.
    pub fn new(store: impl Into<Arc<RuleStore>>) -> Self {
        Self {
            store: store.into(),
            cooldowns: CooldownTracker::new(),
            executor: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.executor.is_none()
    }

    pub fn store(&self) -> &Arc<RuleStore> {
        &self.store
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Select the rule for an incident, or `None` to escalate to the next tier.
    pub fn match_incident(&self, incident: &Incident) -> Option<MatchResult> {
        self.match_incident_at(incident, Utc::now())
    }

    /// [`match_incident`](Self::match_incident) with an explicit clock.
    ///
    /// Rules are tried in ascending priority. Disabled rules, severity
    /// mismatches, failed conditions and live cooldowns all fall through to
    /// the next rule; the first survivor wins.
    pub fn match_incident_at(&self, incident: &Incident, now: DateTime<Utc>) -> Option<MatchResult> {
        let rules = self.store.snapshot();
        let host_id = incident.host_id().unwrap_or_default();

        for rule in rules.iter() {
            if !rule.enabled || !rule.accepts_severity(&incident.severity) {
                continue;
            }
            if !ConditionEvaluator::evaluate_all(&rule.conditions, &incident.data) {
                continue;
            }
            if self.cooldowns.is_active(&rule.cooldown_key(&host_id), rule.cooldown(), now) {
                debug!(
                    rule_id = %rule.id,
                    host_id = %host_id,
                    incident_id = %incident.incident_id,
                    "rule matched but in cooldown, trying next"
                );
                continue;
            }

            info!(
                rule_id = %rule.id,
                action = %rule.action,
                check_type = %incident.check_type,
                incident_id = %incident.incident_id,
                host_id = %host_id,
                "incident matched rule"
            );
            return Some(MatchResult {
                incident_id: incident.incident_id.clone(),
                rule: rule.clone(),
                action: rule.action.clone(),
                action_params: rule.action_params.clone(),
                host_id,
                matched_at: now,
            });
        }

        debug!(
            check_type = %incident.check_type,
            incident_id = %incident.incident_id,
            "no rule matched"
        );
        None
    }

    /// Execute a match for a host. The cooldown window starts here.
    pub async fn execute(&self, m: &MatchResult, site_id: &str, host_id: &str) -> ExecutionResult {
        self.execute_at(m, site_id, host_id, Utc::now()).await
    }

    /// [`execute`](Self::execute) with an explicit clock.
    ///
    /// Executor failures come back as `success: false`, never as an error.
    pub async fn execute_at(
        &self,
        m: &MatchResult,
        site_id: &str,
        host_id: &str,
        now: DateTime<Utc>,
    ) -> ExecutionResult {
        let key = m.rule.cooldown_key(host_id);
        let mut result = ExecutionResult {
            rule_id: m.rule.id.clone(),
            action: m.action.clone(),
            host_id: host_id.to_string(),
            success: false,
            output: None,
            error: None,
            duration_ms: 0,
            executed_at: now,
        };

        let Some(executor) = &self.executor else {
            self.cooldowns.record(&key, now);
            info!(rule_id = %m.rule.id, action = %m.action, host_id, "dry run");
            result.success = true;
            result.output = Some(Value::String(DRY_RUN_OUTPUT.to_string()));
            return result;
        };

        if !self.cooldowns.try_claim(&key, m.rule.cooldown(), now) {
            warn!(rule_id = %m.rule.id, host_id, "execution skipped, cooldown already claimed");
            result.error = Some("cooldown active".to_string());
            return result;
        }

        let start = Instant::now();
        let outcome = executor.execute(&m.action, &m.action_params, site_id, host_id).await;
        result.duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => {
                info!(
                    rule_id = %m.rule.id,
                    action = %m.action,
                    site_id,
                    host_id,
                    duration_ms = result.duration_ms,
                    "remediation executed"
                );
                result.success = true;
                result.output = Some(output);
            }
            Err(e) => {
                warn!(
                    rule_id = %m.rule.id,
                    action = %m.action,
                    site_id,
                    host_id,
                    error = %e,
                    duration_ms = result.duration_ms,
                    "remediation failed"
                );
                result.error = Some(e.to_string());
            }
        }
        result
    }

    /// Re-run the load pipeline and swap the rule list. Cooldowns are kept.
    pub fn reload_rules(&self) -> LoadReport {
        self.store.reload()
    }

    /// Swap in a freshly pulled synced rule array. Cooldowns are kept.
    pub fn update_synced(&self, json: impl Into<String>) -> LoadReport {
        self.store.update_synced(json)
    }

    pub fn stats(&self) -> RuleStats {
        let rules = self.store.snapshot();
        let mut by_source: BTreeMap<RuleSource, usize> = RuleSource::ALL.iter().map(|s| (*s, 0)).collect();
        for rule in rules.iter() {
            *by_source.entry(rule.source).or_default() += 1;
        }
        RuleStats {
            total: rules.len(),
            enabled: rules.iter().filter(|r| r.enabled).count(),
            by_source,
            cooldown_entries: self.cooldowns.len(),
        }
    }

    /// Serializable copy of the active rules, ascending by priority.
    pub fn list_rules(&self) -> Vec<Rule> {
        self.store.snapshot().to_vec()
    }
}

//! Tests for rule matching, cooldowns and execution.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use driftguard_core::Incident;
use serde_json::{json, Map, Value};

use super::*;
use crate::loader::RuleLoader;
use crate::schema::RuleSource;
use crate::store::RuleStore;

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z").unwrap().with_timezone(&Utc)
}

fn engine_with(json: &str) -> RuleEngine {
    RuleEngine::new(RuleStore::new(RuleLoader::new().without_builtin().with_synced_json(json)))
}

fn incident(check_type: &str, severity: &str, data: Value) -> Incident {
    Incident {
        incident_id: "inc-1".to_string(),
        check_type: check_type.to_string(),
        severity: severity.to_string(),
        data,
    }
}

fn firewall_incident(host: &str) -> Incident {
    incident(
        "firewall_status",
        "high",
        json!({
            "check_type": "firewall_status",
            "drift_detected": true,
            "host_id": host,
            "details": {"platform": "windows"},
        }),
    )
}

const FIREWALL_PAIR: &str = r#"[
    {"id": "FW-PRIMARY", "action": "enable_firewall", "priority": 1, "cooldown_seconds": 300,
     "conditions": [{"field": "check_type", "operator": "eq", "value": "firewall_status"}]},
    {"id": "FW-FALLBACK", "action": "notify_admin", "priority": 2, "cooldown_seconds": 300,
     "conditions": [{"field": "check_type", "operator": "eq", "value": "firewall_status"}]}
]"#;

struct MockExecutor {
    calls: Arc<AtomicUsize>,
    should_fail: bool,
}

#[async_trait]
impl Executor for MockExecutor {
    async fn execute(
        &self,
        action: &str,
        params: &Map<String, Value>,
        site_id: &str,
        host_id: &str,
    ) -> Result<Value, ExecutorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            Err(ExecutorError::Failed("script exited with status 1".to_string()))
        } else {
            Ok(json!({"action": action, "params": params, "site": site_id, "host": host_id}))
        }
    }
}

fn mock(should_fail: bool) -> (Arc<dyn Executor>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let executor = MockExecutor {
        calls: Arc::clone(&calls),
        should_fail,
    };
    (Arc::new(executor), calls)
}

// ── Matching ────────────────────────────────────────────────────────

#[test]
fn lowest_priority_number_wins() {
    let engine = engine_with(
        r#"[
        {"id": "late", "action": "a", "priority": 20},
        {"id": "early", "action": "b", "priority": 10}
    ]"#,
    );
    let m = engine.match_incident(&incident("x", "low", json!({}))).expect("match");
    assert_eq!(m.rule.id, "early");
    assert_eq!(m.action, "b");
}

#[test]
fn disabled_rules_never_match() {
    let engine = engine_with(
        r#"[
        {"id": "off", "action": "a", "priority": 1, "enabled": false},
        {"id": "on", "action": "b", "priority": 2}
    ]"#,
    );
    let m = engine.match_incident(&incident("x", "low", json!({}))).expect("match");
    assert_eq!(m.rule.id, "on");
}

#[test]
fn severity_filter_gates_rules() {
    let engine = engine_with(
        r#"[
        {"id": "critical-only", "action": "a", "priority": 1, "severity_filter": ["critical"]},
        {"id": "any", "action": "b", "priority": 2}
    ]"#,
    );
    let m = engine.match_incident(&incident("x", "high", json!({}))).expect("match");
    assert_eq!(m.rule.id, "any");

    let m = engine.match_incident(&incident("x", "CRITICAL", json!({}))).expect("match");
    assert_eq!(m.rule.id, "critical-only");
}

#[test]
fn unmatched_incident_returns_none() {
    let engine = engine_with(FIREWALL_PAIR);
    let inc = incident("disk_space", "high", json!({"check_type": "disk_space"}));
    assert!(engine.match_incident(&inc).is_none());
}

#[test]
fn match_carries_rule_payload() {
    let engine = engine_with(
        r#"[{"id": "r", "action": "restart_service", "action_params": {"service": "auditd"}}]"#,
    );
    let inc = incident("service_health", "medium", json!({"host_id": "srv-9"}));
    let m = engine.match_incident_at(&inc, t0()).expect("match");

    assert_eq!(m.incident_id, "inc-1");
    assert_eq!(m.action_params["service"], "auditd");
    assert_eq!(m.host_id, "srv-9");
    assert_eq!(m.matched_at, t0());
}

#[test]
fn builtin_catalog_handles_windows_firewall() {
    let engine = RuleEngine::new(RuleStore::new(RuleLoader::new()));
    let m = engine.match_incident(&firewall_incident("ws-01")).expect("match");
    assert_eq!(m.rule.id, "L1-WIN-FW-001");
    assert_eq!(m.rule.source, RuleSource::Builtin);

    let mut linux = firewall_incident("srv-01");
    linux.data["details"]["platform"] = json!("linux");
    let m = engine.match_incident(&linux).expect("match");
    assert_eq!(m.rule.id, "L1-LIN-FW-001");
}

// ── Cooldown ────────────────────────────────────────────────────────

#[tokio::test]
async fn cooldown_falls_through_then_expires() {
    let engine = engine_with(FIREWALL_PAIR);
    let inc = firewall_incident("ws-01");

    let m = engine.match_incident_at(&inc, t0()).expect("match");
    assert_eq!(m.rule.id, "FW-PRIMARY");
    engine.execute_at(&m, "site-a", "ws-01", t0()).await;

    let m = engine.match_incident_at(&inc, t0() + Duration::seconds(10)).expect("match");
    assert_eq!(m.rule.id, "FW-FALLBACK");

    let m = engine.match_incident_at(&inc, t0() + Duration::seconds(300)).expect("match");
    assert_eq!(m.rule.id, "FW-PRIMARY");
}

#[tokio::test]
async fn cooldown_is_per_host() {
    let engine = engine_with(FIREWALL_PAIR);
    let m = engine.match_incident_at(&firewall_incident("ws-01"), t0()).expect("match");
    engine.execute_at(&m, "site-a", "ws-01", t0()).await;

    let other = engine.match_incident_at(&firewall_incident("ws-02"), t0()).expect("match");
    assert_eq!(other.rule.id, "FW-PRIMARY");
}

#[tokio::test]
async fn single_rule_in_cooldown_escalates() {
    let engine = engine_with(
        r#"[{"id": "only", "action": "a", "cooldown_seconds": 60}]"#,
    );
    let inc = incident("x", "low", json!({}));
    let m = engine.match_incident_at(&inc, t0()).expect("match");
    assert_eq!(m.host_id, "");
    engine.execute_at(&m, "site-a", "", t0()).await;

    assert!(engine.match_incident_at(&inc, t0() + Duration::seconds(59)).is_none());
    assert!(engine.match_incident_at(&inc, t0() + Duration::seconds(60)).is_some());
}

#[tokio::test]
async fn zero_cooldown_never_blocks() {
    let engine = engine_with(r#"[{"id": "always", "action": "a", "cooldown_seconds": 0}]"#);
    let inc = incident("x", "low", json!({"host_id": "h"}));
    let m = engine.match_incident_at(&inc, t0()).expect("match");
    engine.execute_at(&m, "site-a", "h", t0()).await;

    let again = engine.match_incident_at(&inc, t0()).expect("match");
    assert_eq!(again.rule.id, "always");
}

#[tokio::test]
async fn oversized_cooldown_saturates_instead_of_overflowing() {
    let engine = engine_with(
        r#"[
        {"id": "huge", "action": "a", "priority": 1, "cooldown_seconds": 100000000000000000},
        {"id": "max", "action": "b", "priority": 2, "cooldown_seconds": 18446744073709551615}
    ]"#,
    );
    assert_eq!(engine.stats().total, 2);
    let inc = incident("x", "low", json!({"host_id": "h"}));

    let m = engine.match_incident_at(&inc, t0()).expect("match");
    assert_eq!(m.rule.id, "huge");
    assert!(engine.execute_at(&m, "site-a", "h", t0()).await.success);

    let m = engine.match_incident_at(&inc, t0() + Duration::days(3650)).expect("match");
    assert_eq!(m.rule.id, "max");
    assert!(engine.execute_at(&m, "site-a", "h", t0()).await.success);

    assert!(engine.match_incident_at(&inc, t0() + Duration::days(3650)).is_none());
}

#[tokio::test]
async fn reload_keeps_cooldowns() {
    let json = r#"[{"id": "only", "action": "a", "cooldown_seconds": 600}]"#;
    let engine = engine_with(json);
    let inc = incident("x", "low", json!({"host_id": "h"}));
    let m = engine.match_incident_at(&inc, t0()).expect("match");
    engine.execute_at(&m, "site-a", "h", t0()).await;

    engine.update_synced(json);
    engine.reload_rules();

    assert!(engine.match_incident_at(&inc, t0() + Duration::seconds(1)).is_none());
}

// ── Execution ───────────────────────────────────────────────────────

#[tokio::test]
async fn dry_run_always_succeeds() {
    let engine = engine_with(FIREWALL_PAIR);
    assert!(engine.is_dry_run());
    let m = engine.match_incident(&firewall_incident("ws-01")).expect("match");

    for _ in 0..2 {
        let result = engine.execute(&m, "site-a", "ws-01").await;
        assert!(result.success);
        assert!(result.is_dry_run());
        assert_eq!(result.output, Some(json!("DRY_RUN")));
        assert_eq!(result.duration_ms, 0);
    }
    assert!(engine.cooldowns().last_fired("FW-PRIMARY:ws-01").is_some());
}

#[tokio::test]
async fn executor_output_is_passed_through() {
    let (executor, calls) = mock(false);
    let engine = engine_with(
        r#"[{"id": "r", "action": "restart_service", "action_params": {"service": "W32Time"}}]"#,
    )
    .with_executor(executor);
    assert!(!engine.is_dry_run());

    let m = engine.match_incident_at(&incident("x", "low", json!({})), t0()).expect("match");
    let result = engine.execute_at(&m, "site-a", "ws-01", t0()).await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let output = result.output.expect("output");
    assert_eq!(output["action"], "restart_service");
    assert_eq!(output["params"]["service"], "W32Time");
    assert_eq!(output["site"], "site-a");
    assert_eq!(output["host"], "ws-01");
    assert_eq!(result.rule_id, "r");
    assert_eq!(result.host_id, "ws-01");
}

#[tokio::test]
async fn executor_failure_becomes_failed_result() {
    let (executor, calls) = mock(true);
    let engine = engine_with(FIREWALL_PAIR).with_executor(executor);
    let m = engine.match_incident_at(&firewall_incident("ws-01"), t0()).expect("match");

    let result = engine.execute_at(&m, "site-a", "ws-01", t0()).await;

    assert!(!result.success);
    assert!(result.output.is_none());
    assert!(result.error.as_deref().unwrap_or_default().contains("status 1"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // The window starts at execution even when the action failed.
    assert_eq!(engine.cooldowns().last_fired("FW-PRIMARY:ws-01"), Some(t0()));
}

#[tokio::test]
async fn second_execution_within_window_is_refused() {
    let (executor, calls) = mock(false);
    let engine = engine_with(FIREWALL_PAIR).with_executor(executor);
    let m = engine.match_incident_at(&firewall_incident("ws-01"), t0()).expect("match");

    let first = engine.execute_at(&m, "site-a", "ws-01", t0()).await;
    let second = engine.execute_at(&m, "site-a", "ws-01", t0() + Duration::seconds(1)).await;

    assert!(first.success);
    assert!(!second.success);
    assert_eq!(second.error.as_deref(), Some("cooldown active"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_executions_fire_once() {
    let (executor, calls) = mock(false);
    let engine = Arc::new(engine_with(FIREWALL_PAIR).with_executor(executor));
    let m = engine.match_incident_at(&firewall_incident("ws-01"), t0()).expect("match");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        let m = m.clone();
        handles.push(tokio::spawn(async move {
            engine.execute_at(&m, "site-a", "ws-01", t0()).await.success
        }));
    }
    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() {
            successes += 1;
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// ── Inspection ──────────────────────────────────────────────────────

#[tokio::test]
async fn stats_report_every_source() {
    let engine = engine_with(
        r#"[
        {"id": "a", "action": "x"},
        {"id": "b", "action": "x", "enabled": false}
    ]"#,
    );
    let m = engine.match_incident_at(&incident("x", "low", json!({})), t0()).expect("match");
    engine.execute_at(&m, "site-a", "h", t0()).await;

    let stats = engine.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.enabled, 1);
    assert_eq!(stats.by_source[&RuleSource::Synced], 2);
    assert_eq!(stats.by_source[&RuleSource::Builtin], 0);
    assert_eq!(stats.by_source[&RuleSource::Custom], 0);
    assert_eq!(stats.cooldown_entries, 1);

    let value = serde_json::to_value(&stats).unwrap();
    assert_eq!(value["by_source"]["synced"], 2);
}

#[test]
fn list_rules_is_priority_ordered_and_serializable() {
    let engine = engine_with(
        r#"[
        {"id": "c", "action": "x", "priority": 30},
        {"id": "a", "action": "x", "priority": 10},
        {"id": "b", "action": "x", "priority": 20}
    ]"#,
    );
    let rules = engine.list_rules();
    let ids: Vec<_> = rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let value = serde_json::to_value(&rules).unwrap();
    assert_eq!(value[0]["source"], "synced");
}

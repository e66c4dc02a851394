//! Integration tests for layered rule sources as seen through the engine.

use std::fs;

use serde_json::json;
use tempfile::TempDir;

use driftguard_core::Incident;
use driftguard_rules::{RuleEngine, RuleLoader, RuleSource, RuleStore};

const CUSTOM_FIREWALL: &str = r#"
id: SITE-FW-001
name: Site firewall policy
conditions:
  - { field: check_type, operator: eq, value: firewall_status }
  - { field: drift_detected, operator: eq, value: true }
action: apply_site_firewall_policy
priority: 5
"#;

const SYNCED_FIREWALL: &str = r#"[
    {
        "id": "CP-FW-001",
        "name": "Control plane firewall override",
        "conditions": [
            {"field": "check_type", "operator": "eq", "value": "firewall_status"},
            {"field": "drift_detected", "operator": "eq", "value": true}
        ],
        "actions": ["run_firewall_runbook"],
        "priority": 2
    }
]"#;

fn firewall_incident() -> Incident {
    Incident::new(
        "firewall_status",
        "high",
        json!({
            "check_type": "firewall_status",
            "drift_detected": true,
            "host_id": "ws-01",
            "details": {"platform": "windows"},
        }),
    )
}

#[test]
fn builtin_catalog_covers_both_platforms() {
    let (store, report) = RuleStore::load(RuleLoader::new());

    assert!(store.len() >= 35);
    assert_eq!(report.failures().count(), 0);
    let rules = store.snapshot();
    assert!(rules.iter().any(|r| r.id.starts_with("L1-WIN-")));
    assert!(rules.iter().any(|r| r.id.starts_with("L1-LIN-")));
    assert!(rules.iter().all(|r| !r.action.is_empty()));
}

#[test]
fn reload_adds_exactly_one_custom_rule() {
    let dir = TempDir::new().expect("create tempdir");
    let engine = RuleEngine::new(RuleStore::new(RuleLoader::new().with_custom_dir(dir.path())));
    let before = engine.stats().total;

    fs::write(dir.path().join("site-firewall.yml"), CUSTOM_FIREWALL).unwrap();
    let report = engine.reload_rules();

    let stats = engine.stats();
    assert_eq!(stats.total, before + 1);
    assert_eq!(stats.by_source[&RuleSource::Custom], 1);
    assert_eq!(report.failures().count(), 0);
}

#[test]
fn lower_priority_number_overrides_across_sources() {
    let dir = TempDir::new().expect("create tempdir");
    fs::write(dir.path().join("site-firewall.yml"), CUSTOM_FIREWALL).unwrap();

    let loader = RuleLoader::new()
        .with_synced_json(SYNCED_FIREWALL)
        .with_custom_dir(dir.path());
    let engine = RuleEngine::new(RuleStore::new(loader));

    let m = engine.match_incident(&firewall_incident()).expect("match");
    assert_eq!(m.rule.id, "CP-FW-001");
    assert_eq!(m.rule.source, RuleSource::Synced);
    assert_eq!(m.action, "run_firewall_runbook");

    // Without the synced rule the custom one (priority 5) beats builtin (10).
    engine.update_synced("[]");
    let m = engine.match_incident(&firewall_incident()).expect("match");
    assert_eq!(m.rule.id, "SITE-FW-001");

    fs::remove_file(dir.path().join("site-firewall.yml")).unwrap();
    engine.reload_rules();
    let m = engine.match_incident(&firewall_incident()).expect("match");
    assert_eq!(m.rule.id, "L1-WIN-FW-001");
}

#[test]
fn one_bad_file_never_empties_the_store() {
    let dir = TempDir::new().expect("create tempdir");
    fs::write(dir.path().join("broken.yml"), "rules: [ {id: x, action: y").unwrap();
    fs::write(dir.path().join("site-firewall.yml"), CUSTOM_FIREWALL).unwrap();

    let (store, report) = RuleStore::load(RuleLoader::new().with_custom_dir(dir.path()));

    assert_eq!(report.failures().count(), 1);
    assert!(store.len() >= 36);
    assert!(store.snapshot().iter().any(|r| r.id == "SITE-FW-001"));
}

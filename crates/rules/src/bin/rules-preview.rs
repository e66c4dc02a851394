//! rules-preview: what-if tool for the L1 rule set.
//!
//! Loads rules exactly as the agent would (builtin catalog, synced JSON,
//! custom YAML), then lists them, prints stats, or dry-runs an incident
//! file through a dry-run engine. Nothing is ever executed.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use driftguard_core::config::RuleSourceSettings;
use driftguard_core::{config, Config, Incident};
use driftguard_rules::{ExecutionResult, MatchResult, RuleEngine, RuleLoader, RuleStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Preview which remediation rule an incident would trigger.
#[derive(Parser, Debug)]
#[command(name = "rules-preview", version, about)]
struct Cli {
    /// Synced rules JSON file (overrides RULES_SYNCED_PATH).
    #[arg(long)]
    synced: Option<PathBuf>,

    /// Custom rules directory (overrides RULES_CUSTOM_DIR).
    #[arg(long)]
    custom_dir: Option<PathBuf>,

    /// Leave out the compiled-in catalog.
    #[arg(long)]
    no_builtin: bool,

    /// Print every active rule in evaluation order.
    #[arg(long)]
    list: bool,

    /// Print rule counts by source and the effective configuration.
    #[arg(long)]
    stats: bool,

    /// Incident JSON file to match: {check_type, severity, data, [incident_id]}.
    #[arg(long)]
    incident: Option<PathBuf>,

    /// Keep running and reload on custom rule changes. RULES_WATCH is ignored here.
    #[arg(long)]
    watch: bool,

    /// Site id passed to the (dry-run) execution.
    #[arg(long, env = "DRIFTGUARD_SITE_ID", default_value = "preview")]
    site_id: String,
}

/// Incident file shape; `incident_id` is generated when absent.
#[derive(Debug, Deserialize)]
struct IncidentFile {
    #[serde(default)]
    incident_id: Option<String>,
    check_type: String,
    #[serde(default)]
    severity: String,
    #[serde(default)]
    data: Value,
}

impl From<IncidentFile> for Incident {
    fn from(file: IncidentFile) -> Self {
        let mut incident = Incident::new(file.check_type, file.severity, file.data);
        if let Some(id) = file.incident_id {
            incident.incident_id = id;
        }
        incident
    }
}

#[derive(Debug, Serialize)]
struct Preview {
    incident_id: String,
    #[serde(rename = "match")]
    matched: Option<MatchResult>,
    execution: Option<ExecutionResult>,
}

/// Layer the command-line overrides onto the env-derived source settings.
///
/// Watching is a mode of this tool, so only `--watch` turns it on; a
/// service-wide `RULES_WATCH` must not make a one-shot `--list` block.
fn resolve_settings(cli: &Cli, base: &RuleSourceSettings) -> RuleSourceSettings {
    let mut settings = base.clone();
    if cli.no_builtin {
        settings.builtin_enabled = false;
    }
    if let Some(path) = &cli.synced {
        settings.synced_path = Some(path.clone());
    }
    if let Some(dir) = &cli.custom_dir {
        settings.custom_dir = Some(dir.clone());
    }
    settings.watch = cli.watch;
    settings
}

fn has_mode(cli: &Cli) -> bool {
    cli.list || cli.stats || cli.watch || cli.incident.is_some()
}

// ── Main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    config::load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    if !has_mode(&cli) {
        bail!("nothing to do: pass --list, --stats, --watch or --incident <path>");
    }

    let settings = resolve_settings(&cli, &config.rules);

    let (store, report) = RuleStore::load(RuleLoader::from_settings(&settings));
    for failure in report.failures() {
        warn!(source = %failure.source, origin = %failure.origin, status = ?failure.status, "rule not loaded");
    }
    let engine = RuleEngine::new(store);

    if cli.list {
        println!("{}", serde_json::to_string_pretty(&engine.list_rules())?);
    }

    if cli.stats {
        let stats = serde_json::json!({ "config": config.summary(), "rules": engine.stats() });
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    if let Some(path) = &cli.incident {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read incident file {}", path.display()))?;
        let file: IncidentFile = serde_json::from_str(&text)
            .with_context(|| format!("invalid incident JSON in {}", path.display()))?;
        let incident = Incident::from(file);

        let matched = engine.match_incident(&incident);
        let execution = match &matched {
            Some(m) => Some(engine.execute(m, &cli.site_id, &m.host_id).await),
            None => {
                info!(incident_id = %incident.incident_id, "no L1 rule matched; would escalate");
                None
            }
        };

        let preview = Preview {
            incident_id: incident.incident_id,
            matched,
            execution,
        };
        println!("{}", serde_json::to_string_pretty(&preview)?);
    }

    if settings.watch {
        engine.store().watch().context("failed to start rules watcher")?;
        eprintln!("watching for rule changes, Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;
        println!("{}", serde_json::to_string_pretty(&engine.stats())?);
    }

    Ok(())
}

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub rules: RuleSourceSettings,
    pub gate: GateSettings,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `DRIFTGUARD_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("DRIFTGUARD_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            rules: RuleSourceSettings::from_env_profiled(p),
            gate: GateSettings::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  rules:  builtin={}, synced={}, custom={}, watch={}",
            self.rules.builtin_enabled,
            self.rules.synced_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none)".into()),
            self.rules.custom_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "(none)".into()),
            self.rules.watch,
        );
        tracing::info!(
            "  gate:   window={}, threshold={}, stabilize={}, periodic={}s",
            self.gate.window_size,
            self.gate.flap_threshold,
            self.gate.stabilize_count,
            self.gate.periodic_secs,
        );
    }

    /// JSON view for inspection tooling.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "rules": {
                "builtin_enabled": self.rules.builtin_enabled,
                "synced_path": self.rules.synced_path,
                "custom_dir": self.rules.custom_dir,
                "watch": self.rules.watch,
            },
            "gate": {
                "window_size": self.gate.window_size,
                "flap_threshold": self.gate.flap_threshold,
                "stabilize_count": self.gate.stabilize_count,
                "periodic_secs": self.gate.periodic_secs,
            },
        })
    }
}

// ── Rule sources ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSourceSettings {
    /// Include the compiled-in rule catalog.
    pub builtin_enabled: bool,
    /// JSON file holding the rule array pulled from the control plane.
    pub synced_path: Option<PathBuf>,
    /// Directory of locally authored YAML rules.
    pub custom_dir: Option<PathBuf>,
    /// Hot-reload the custom directory on change.
    pub watch: bool,
}

impl RuleSourceSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            builtin_enabled: profiled_env_bool(p, "RULES_BUILTIN_ENABLED", true),
            synced_path: profiled_env_opt(p, "RULES_SYNCED_PATH").map(PathBuf::from),
            custom_dir: profiled_env_opt(p, "RULES_CUSTOM_DIR").map(PathBuf::from),
            watch: profiled_env_bool(p, "RULES_WATCH", false),
        }
    }
}

impl Default for RuleSourceSettings {
    fn default() -> Self {
        Self {
            builtin_enabled: true,
            synced_path: None,
            custom_dir: None,
            watch: false,
        }
    }
}

// ── Stability gate ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    pub window_size: usize,
    pub flap_threshold: usize,
    pub stabilize_count: usize,
    /// Minimum spacing between events surfaced while a check is flapping.
    pub periodic_secs: u64,
}

impl GateSettings {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            window_size: profiled_env_usize(p, "FLAP_WINDOW_SIZE", 6),
            flap_threshold: profiled_env_usize(p, "FLAP_THRESHOLD", 3),
            stabilize_count: profiled_env_usize(p, "FLAP_STABILIZE_COUNT", 3),
            periodic_secs: profiled_env_u64(p, "FLAP_PERIODIC_SECS", 1800),
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            window_size: 6,
            flap_threshold: 3,
            stabilize_count: 3,
            periodic_secs: 1800,
        }
    }
}

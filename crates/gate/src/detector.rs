//! [`FlapDetector`]: the single decision point for surfacing check failures.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use super::config::{GateConfig, MIN_HISTORY};
use super::history::CheckHistory;

/// Observable state of one check type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateStatus {
    NoData,
    Flapping { suppressed: u64 },
    Stable,
}

impl fmt::Display for GateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateStatus::NoData => write!(f, "no data"),
            GateStatus::Flapping { suppressed } => {
                write!(f, "flapping (suppressed {suppressed} events)")
            }
            GateStatus::Stable => write!(f, "stable"),
        }
    }
}

/// Per-check-type flap suppression.
///
/// One mutex guards every history; it is held only for the duration of a
/// single update, so distinct check types never observe each other's state.
pub struct FlapDetector {
    config: GateConfig,
    histories: Mutex<HashMap<String, CheckHistory>>,
}

impl FlapDetector {
    /// Detector with the default window (6), threshold (3), and stabilize count (3).
    pub fn new() -> Self {
        Self::with_config(GateConfig::default())
    }

    pub fn with_config(config: GateConfig) -> Self {
        Self {
            config,
            histories: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Record an outcome and decide whether it should be surfaced.
    pub fn should_send(&self, check_type: &str, passed: bool) -> bool {
        self.should_send_at(check_type, passed, Utc::now())
    }

    /// [`should_send`](Self::should_send) with an explicit observation time.
    pub fn should_send_at(&self, check_type: &str, passed: bool, now: DateTime<Utc>) -> bool {
        let mut guard = self.histories.lock().expect("flap histories lock poisoned");
        let history = guard
            .entry(check_type.to_string())
            .or_insert_with(|| CheckHistory::new(self.config.window_size));

        history.record(passed, now);

        // Too little history to judge: never swallow the first failures.
        if history.len() < MIN_HISTORY {
            if passed {
                return false;
            }
            history.last_sent = Some(now);
            return true;
        }

        let stabilized = history.stabilized(self.config.stabilize_count);
        let transitions = history.transitions();

        // Stabilization is checked first; re-detection waits for the next call.
        if history.flapping && stabilized {
            info!(
                check_type,
                suppressed = history.suppressed,
                "check stabilized, flap suppression cleared"
            );
            history.flapping = false;
            history.suppressed = 0;
        } else if !history.flapping && transitions >= self.config.flap_threshold {
            info!(check_type, transitions, "check is flapping, suppressing failures");
            history.flapping = true;
            history.suppressed = 0;
        }

        if passed {
            return false;
        }

        if history.flapping {
            let due = match history.last_sent {
                None => true,
                Some(sent) => now.signed_duration_since(sent) > self.config.periodic_interval,
            };
            if due {
                debug!(check_type, "periodic failure surfaced while flapping");
                history.last_sent = Some(now);
                return true;
            }
            history.suppressed += 1;
            debug!(check_type, suppressed = history.suppressed, "failure suppressed");
            return false;
        }

        history.last_sent = Some(now);
        true
    }

    /// Current state of a check type.
    pub fn gate_status(&self, check_type: &str) -> GateStatus {
        let guard = self.histories.lock().expect("flap histories lock poisoned");
        match guard.get(check_type) {
            None => GateStatus::NoData,
            Some(h) if h.flapping => GateStatus::Flapping {
                suppressed: h.suppressed,
            },
            Some(_) => GateStatus::Stable,
        }
    }

    /// Human-readable state: `no data`, `flapping (suppressed N events)`, or `stable`.
    pub fn status(&self, check_type: &str) -> String {
        self.gate_status(check_type).to_string()
    }

    /// Check types currently flapping with their suppressed counts, sorted by name.
    pub fn flapping_checks(&self) -> Vec<(String, u64)> {
        let guard = self.histories.lock().expect("flap histories lock poisoned");
        let mut out: Vec<(String, u64)> = guard
            .iter()
            .filter(|(_, h)| h.flapping)
            .map(|(name, h)| (name.clone(), h.suppressed))
            .collect();
        out.sort();
        out
    }

    /// Recorded outcomes for a check type, oldest first.
    pub fn history(&self, check_type: &str) -> Option<Vec<bool>> {
        let guard = self.histories.lock().expect("flap histories lock poisoned");
        guard.get(check_type).map(CheckHistory::chronological)
    }

    /// Number of check types observed so far.
    pub fn len(&self) -> usize {
        self.histories.lock().expect("flap histories lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for FlapDetector {
    fn default() -> Self {
        Self::new()
    }
}

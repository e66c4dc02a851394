//! Per-rule-per-host cooldown tracking.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Last execution time per `rule_id:host_id` key.
///
/// Entries are independent of the rule list and survive reloads.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
}

/// A zero or negative window never blocks.
fn live(last: Option<&DateTime<Utc>>, window: Duration, now: DateTime<Utc>) -> bool {
    match last {
        Some(last) if window > Duration::zero() => now.signed_duration_since(*last) < window,
        _ => false,
    }
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` fired less than `window` before `now`.
    pub fn is_active(&self, key: &str, window: Duration, now: DateTime<Utc>) -> bool {
        let entries = self.entries.lock().expect("cooldown lock poisoned");
        live(entries.get(key), window, now)
    }

    /// Record a firing at `at`, replacing any earlier entry.
    pub fn record(&self, key: &str, at: DateTime<Utc>) {
        self.entries
            .lock()
            .expect("cooldown lock poisoned")
            .insert(key.to_string(), at);
    }

    /// Check-and-set: record a firing at `now` unless one is still live.
    ///
    /// Returns `false` (and records nothing) when another caller already holds
    /// the window. At most one claim per key succeeds per window.
    pub fn try_claim(&self, key: &str, window: Duration, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.lock().expect("cooldown lock poisoned");
        if live(entries.get(key), window, now) {
            return false;
        }
        entries.insert(key.to_string(), now);
        true
    }

    pub fn last_fired(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.lock().expect("cooldown lock poisoned").get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cooldown lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

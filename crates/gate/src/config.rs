//! [`GateConfig`]: fixed tuning for the flap detector.

use chrono::Duration;

use driftguard_core::config::GateSettings;

/// Observations required before flapping is assessed at all.
pub const MIN_HISTORY: usize = 3;

/// Tuning knobs, fixed at detector construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Ring buffer capacity per check type.
    pub window_size: usize,
    /// Transitions within the window that declare flapping.
    pub flap_threshold: usize,
    /// Consecutive identical results that clear flapping.
    pub stabilize_count: usize,
    /// One failure is still surfaced per interval while flapping.
    pub periodic_interval: Duration,
}

impl GateConfig {
    /// Build a config, panicking on values the ring buffer cannot honor.
    pub fn new(
        window_size: usize,
        flap_threshold: usize,
        stabilize_count: usize,
        periodic_interval: Duration,
    ) -> Self {
        let config = Self {
            window_size,
            flap_threshold,
            stabilize_count,
            periodic_interval,
        };
        config.validate();
        config
    }

    fn validate(&self) {
        assert!(
            self.window_size >= MIN_HISTORY,
            "window_size must be at least {MIN_HISTORY}, got {}",
            self.window_size
        );
        assert!(
            self.stabilize_count > 0 && self.stabilize_count <= self.window_size,
            "stabilize_count must be in 1..={}, got {}",
            self.window_size,
            self.stabilize_count
        );
        assert!(
            self.periodic_interval >= Duration::zero(),
            "periodic_interval must not be negative"
        );
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            window_size: 6,
            flap_threshold: 3,
            stabilize_count: 3,
            periodic_interval: Duration::minutes(30),
        }
    }
}

impl From<&GateSettings> for GateConfig {
    fn from(settings: &GateSettings) -> Self {
        // chrono stores milliseconds in an i64.
        let secs = i64::try_from(settings.periodic_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        Self::new(
            settings.window_size,
            settings.flap_threshold,
            settings.stabilize_count,
            Duration::seconds(secs),
        )
    }
}

//! Stability gate for compliance check outcomes.
//!
//! Decides, per check type, whether a failing result should be surfaced as an
//! incident or swallowed as noise from a check that oscillates between pass
//! and fail. State lives in an explicit [`FlapDetector`] owned by the caller.

mod config;
mod detector;
mod history;


pub use config::{GateConfig, MIN_HISTORY};
pub use detector::{FlapDetector, GateStatus};
pub use history::CheckHistory;

//! The L1 rule engine: match an incident to at most one rule and execute it.

mod cooldown;
mod core;
mod executor;
mod result;

#[cfg(test)]
mod tests;

pub use self::cooldown::CooldownTracker;
pub use self::core::RuleEngine;
pub use self::executor::{Executor, ExecutorError};
pub use self::result::{ExecutionResult, MatchResult, RuleStats, DRY_RUN_OUTPUT};

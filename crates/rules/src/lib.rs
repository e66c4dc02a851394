//! Deterministic remediation rule engine (the L1 resolution tier).
//!
//! This crate provides:
//! - A declarative condition DSL evaluated against nested incident data
//! - Rule loading from a compiled-in catalog, a control-plane JSON array,
//!   and locally authored YAML files, merged into one priority-ordered list
//! - An atomically swappable [`RuleStore`] with optional hot-reload via `notify`
//! - The [`RuleEngine`]: first-match selection with per-rule-per-host cooldowns
//!   and execution through an injected [`Executor`]

pub mod engine;
pub mod evaluator;
pub mod loader;
pub mod schema;
pub mod store;

pub use engine::{
    CooldownTracker, ExecutionResult, Executor, ExecutorError, MatchResult, RuleEngine, RuleStats,
};
pub use evaluator::ConditionEvaluator;
pub use loader::{LoadReport, LoadResult, LoadStatus, RuleError, RuleLoader, SyncedSource};
pub use schema::{ConditionValue, Operator, Rule, RuleCondition, RuleSource};
pub use store::RuleStore;

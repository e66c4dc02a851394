//! Rule loading from the three layered sources.
//!
//! - builtin: the compiled-in catalog (`builtin_rules.yaml`)
//! - synced: a JSON array pulled from the control plane, from a file or memory
//! - custom: locally authored YAML files, scanned recursively
//!
//! Bad files and entries are reported per item and never abort a load.

mod builtin;
mod core;
mod custom;
mod error;
mod synced;
mod watcher;


pub use self::core::{LoadReport, RuleLoader};
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
pub use self::synced::SyncedSource;

pub(crate) use self::watcher::is_rule_change;

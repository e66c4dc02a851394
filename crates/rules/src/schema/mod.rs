//! Rule schema types with serde deserialization.
//!
//! Defines the rule model shared by every source:
//! - `ConditionValue`: the closed set of literal types a condition compares against
//! - `RuleCondition` / `Operator`: one field test in a rule's AND-list
//! - `Rule`: the normalized, source-tagged rule the engine evaluates
//! - `RuleRecord`: the tolerant wire shape accepted from JSON and YAML sources

mod condition;
mod record;
mod rule;
mod source;
mod value;

pub use condition::*;
pub use record::*;
pub use rule::*;
pub use source::*;
pub use value::*;

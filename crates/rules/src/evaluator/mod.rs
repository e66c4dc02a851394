//! Condition evaluator for rule matching.
//!
//! Pure functions: a condition and a data map in, a boolean out. Evaluation
//! never errors; malformed conditions (bad regex, wrong literal type) simply
//! do not hold, so the owning rule fails closed.

mod operators;
mod path;

use serde_json::Value;

use crate::schema::{Operator, RuleCondition};

use path::lookup;

/// Evaluates rule conditions against incident data.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate a single condition.
    pub fn evaluate(condition: &RuleCondition, data: &Value) -> bool {
        let field = lookup(data, &condition.field);
        let value = condition.value.as_ref();

        match condition.operator {
            Operator::Eq => operators::eq(field, value),
            Operator::Neq => operators::neq(field, value),
            Operator::Contains => operators::contains(field, value),
            Operator::Regex => operators::regex(field, value, &condition.field),
            Operator::Gt => operators::gt(field, value),
            Operator::Lt => operators::lt(field, value),
            Operator::In => operators::is_in(field, value),
            Operator::Notin => operators::not_in(field, value),
            Operator::Exists => operators::exists(field, value),
        }
    }

    /// AND over all conditions; an empty list holds.
    pub fn evaluate_all(conditions: &[RuleCondition], data: &Value) -> bool {
        conditions.iter().all(|c| Self::evaluate(c, data))
    }
}

// ── Tests ───────────────────────────────────────────────────────────

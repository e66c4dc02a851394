//! A single field test inside a rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::ConditionValue;

/// Comparison operators understood by the condition evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    #[serde(alias = "ne")]
    Neq,
    Contains,
    Regex,
    Gt,
    Lt,
    In,
    #[serde(alias = "not_in")]
    Notin,
    Exists,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Contains => "contains",
            Operator::Regex => "regex",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::In => "in",
            Operator::Notin => "notin",
            Operator::Exists => "exists",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `field <operator> value`, where `field` is a dot-separated path into the
/// incident data (e.g. `details.usage_percent`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConditionValue>,
}

impl RuleCondition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<ConditionValue>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "{} {} {}", self.field, self.operator, v),
            None => write!(f, "{} {}", self.field, self.operator),
        }
    }
}

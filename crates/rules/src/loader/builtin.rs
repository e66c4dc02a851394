//! Compiled-in rule catalog.

use crate::schema::{Rule, RuleSource};

use super::custom::parse_yaml_rules;
use super::error::LoadResult;

const CATALOG: &str = include_str!("builtin_rules.yaml");

pub(super) fn load(rules: &mut Vec<Rule>, results: &mut Vec<LoadResult>) {
    parse_yaml_rules(CATALOG, RuleSource::Builtin, "builtin_rules.yaml", rules, results);
}


//! Rule origin tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a rule came from. Assigned by the loader, never by rule authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    /// Compiled-in catalog.
    Builtin,
    /// Pulled from the control plane.
    Synced,
    /// Authored locally as YAML.
    Custom,
}

impl RuleSource {
    pub const ALL: [RuleSource; 3] = [RuleSource::Builtin, RuleSource::Synced, RuleSource::Custom];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSource::Builtin => "builtin",
            RuleSource::Synced => "synced",
            RuleSource::Custom => "custom",
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

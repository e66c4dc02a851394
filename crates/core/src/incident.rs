use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A failed check that survived the stability gate and is up for rule matching.
///
/// `data` is free-form: rule conditions address it by dot-separated paths.
/// By convention it carries `check_type`, `drift_detected`, `host_id` and a
/// `details` sub-map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub incident_id: String,
    pub check_type: String,
    pub severity: String,
    #[serde(default)]
    pub data: Value,
}

impl Incident {
    /// Build an incident with a fresh random id.
    pub fn new(check_type: impl Into<String>, severity: impl Into<String>, data: Value) -> Self {
        Self {
            incident_id: Uuid::new_v4().to_string(),
            check_type: check_type.into(),
            severity: severity.into(),
            data,
        }
    }

    /// `data.host_id` rendered as a string, if present and non-null.
    pub fn host_id(&self) -> Option<String> {
        match self.data.get("host_id")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

//! The remediation capability the engine invokes on a match.

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Errors an [`Executor`] reports back to the engine.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("action failed: {0}")]
    Failed(String),

    #[error("action timed out after {0}s")]
    Timeout(u64),
}

/// Runs a named remediation on a host.
///
/// The engine imposes no timeout; implementations that shell out or call
/// remote agents own their deadlines and cancellation.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(
        &self,
        action: &str,
        params: &Map<String, Value>,
        site_id: &str,
        host_id: &str,
    ) -> Result<Value, ExecutorError>;
}

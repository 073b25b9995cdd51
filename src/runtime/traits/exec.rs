// ABOUTME: Exec operations trait for container runtimes.
// ABOUTME: Run short-lived processes inside a running task with output capture.

use super::shared_types::{CapturedOutput, ProcessSpec};
use crate::types::{ContainerId, ExecId};
use async_trait::async_trait;

/// Exec operations: run processes inside a container's task.
#[async_trait]
pub trait ExecOps: Send + Sync {
    /// Create and start an exec'd process inside the container's task.
    ///
    /// Stdout and stderr stream into bounded in-memory sinks owned by the
    /// returned handle, drained concurrently with the wait.
    async fn exec(
        &self,
        id: &ContainerId,
        exec_id: &ExecId,
        process: &ProcessSpec,
    ) -> Result<Box<dyn ExecProcess>, ExecError>;
}

/// Handle to a started exec'd process.
#[async_trait]
pub trait ExecProcess: Send {
    /// Wait for the process to exit and return its exit code.
    ///
    /// Cancel-safe: dropping the future leaves the process running, so the
    /// caller can still kill it and collect output.
    async fn wait(&mut self) -> Result<i32, ExecError>;

    /// Deliver SIGKILL to the process.
    async fn kill(&mut self) -> Result<(), ExecError>;

    /// Close both stdio sinks and return whatever output accumulated.
    async fn output(&mut self) -> CapturedOutput;
}

/// Errors from exec operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("exec rejected by runtime: {0}")]
    Rejected(String),

    #[error("failed to spawn probe process: {0}")]
    Spawn(String),

    #[error("failed to wait for probe process: {0}")]
    Wait(String),

    #[error("failed to signal probe process: {0}")]
    Signal(String),
}

// ABOUTME: Task operations trait for container runtimes.
// ABOUTME: A task is the running instance of a container.

use super::shared_types::TaskState;
use crate::types::ContainerId;
use async_trait::async_trait;

/// Task inspection: whether a container is running, and since when.
#[async_trait]
pub trait TaskOps: Send + Sync {
    /// Get the container's task state.
    ///
    /// A created-but-never-started container has no task.
    async fn task(&self, id: &ContainerId) -> Result<TaskState, TaskError>;
}

/// Errors from task operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("no running task found")]
    NotFound,

    #[error("failed to get container status: {0}")]
    Status(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

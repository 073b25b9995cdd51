// ABOUTME: Container store trait: lookup, labels, and process defaults.
// ABOUTME: Labels are the persistence layer for probe config and health state.

use super::shared_types::ProcessDefaults;
use crate::types::ContainerId;
use async_trait::async_trait;
use std::collections::HashMap;

/// Container lookup and label persistence.
#[async_trait]
pub trait ContainerStore: Send + Sync {
    /// Resolve an id or name to a container id.
    async fn resolve(&self, id_or_name: &str) -> Result<ContainerId, ContainerError>;

    /// Read the container's full label map.
    async fn labels(&self, id: &ContainerId) -> Result<HashMap<String, String>, ContainerError>;

    /// Merge the given labels into the container's label map.
    ///
    /// Writes are last-writer-wins; the health-check subsystem is the only
    /// writer of its labels by contract.
    async fn set_labels(
        &self,
        id: &ContainerId,
        labels: HashMap<String, String>,
    ) -> Result<(), ContainerError>;

    /// Environment and working directory of the container's init process.
    async fn process_defaults(&self, id: &ContainerId) -> Result<ProcessDefaults, ContainerError>;
}

/// Errors from container store operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("no such container {0}")]
    NotFound(String),

    #[error("failed to get container info: {0}")]
    Info(String),

    #[error("failed to update container labels: {0}")]
    LabelWrite(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

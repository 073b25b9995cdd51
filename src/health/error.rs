// ABOUTME: The health-check error sum type with stable user-facing messages.
// ABOUTME: Exit-code mapping lives next to the variants that drive it.

use crate::runtime::{ExecError, TaskError, TaskStatus};
use std::time::Duration;
use thiserror::Error;

/// Everything that can go wrong while running one probe.
///
/// Display strings are part of the CLI contract; tests assert them
/// verbatim.
#[derive(Debug, Error)]
pub enum HealthCheckError {
    /// Container lookup missed.
    #[error("no such container {0}")]
    NoSuchContainer(String),

    /// The container exists but was never started.
    #[error("failed to get container task: {0}")]
    NoTask(TaskError),

    /// A task exists but is not running.
    #[error("container is not running (status: {0})")]
    NotRunning(TaskStatus),

    /// The healthcheck/config label is absent.
    #[error("container has no health check configured")]
    NoConfig,

    /// The probe spec label failed to decode or validate.
    #[error("invalid health check configuration: {0}")]
    InvalidConfig(String),

    /// The probe command resolves to nothing executable.
    #[error("no health check command specified")]
    NoCommand,

    /// Health checking is explicitly disabled (`NONE`).
    #[error("no health check defined")]
    NoneConfigured,

    /// The runtime rejected the exec request; no record update happened.
    #[error("failed to execute health check: {0}")]
    ExecFailure(ExecError),

    /// The probe was killed after exceeding its timeout. The record has
    /// been updated with a -1 exit before this is returned.
    #[error("health check timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    /// The probe exited non-zero. The record has been updated before this
    /// is returned.
    #[error("health check failed with code {0}")]
    ProbeFailed(i32),

    /// The probe ran but the record could not be written back.
    #[error("failed to update health status: {0}")]
    Persist(String),

    /// Unexpected runtime client failure.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl HealthCheckError {
    /// Process exit code for the `container healthcheck` subcommand.
    ///
    /// A probe that ran to completion exits 0 even when the outcome could
    /// not be persisted; every other failure exits 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Persist(_) => 0,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_formats_duration() {
        let err = HealthCheckError::Timeout(Duration::from_secs(2));
        assert_eq!(err.to_string(), "health check timed out after 2s");
    }

    #[test]
    fn task_errors_are_wrapped() {
        let err = HealthCheckError::NoTask(TaskError::NotFound);
        assert_eq!(
            err.to_string(),
            "failed to get container task: no running task found"
        );
    }

    #[test]
    fn only_persist_failures_exit_zero() {
        assert_eq!(HealthCheckError::Persist("write failed".into()).exit_code(), 0);
        assert_eq!(HealthCheckError::NoConfig.exit_code(), 1);
        assert_eq!(HealthCheckError::ProbeFailed(1).exit_code(), 1);
    }
}

// ABOUTME: Scheduler adapter capability: periodic probe firing per container.
// ABOUTME: Injected at the seams so the core is testable with a fake.

mod systemd;

pub use systemd::{DISABLE_ENV, SystemdConfig, SystemdScheduler, systemd_available};

use crate::health::ProbeSpec;
use crate::types::ContainerId;
use async_trait::async_trait;
use thiserror::Error;

/// Periodic probe scheduling bound to a container's lifecycle.
///
/// Implementations must be idempotent and tolerate absent units. The trait
/// is deliberately open so hosts and tests can supply their own
/// implementations.
#[async_trait]
pub trait HealthScheduler: Send + Sync {
    /// Create the transient timer/service pair for a container.
    ///
    /// A disabled probe, a zero interval or an unavailable scheduler is a
    /// successful no-op.
    async fn create_timer(&self, id: &ContainerId, probe: &ProbeSpec)
    -> Result<(), SchedulerError>;

    /// (Re)start the container's timer unit.
    async fn start_timer(&self, id: &ContainerId, probe: &ProbeSpec)
    -> Result<(), SchedulerError>;

    /// Stop the timer unit without removing it (pause).
    async fn stop_timer(&self, id: &ContainerId, probe: &ProbeSpec) -> Result<(), SchedulerError>;

    /// Stop and clean up both transient units, best-effort.
    async fn remove_transient(
        &self,
        id: &ContainerId,
        probe: &ProbeSpec,
    ) -> Result<(), SchedulerError>;
}

/// Errors from scheduler operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: &'static str,
        source: std::io::Error,
    },

    #[error("systemd-run failed: {0}")]
    UnitCreate(String),

    #[error("unexpected systemd restart result: {0}")]
    UnitStart(String),
}

/// Scheduler that does nothing, for hosts without an init system.
///
/// Probes remain available through manual `container healthcheck`
/// invocations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopScheduler;

#[async_trait]
impl HealthScheduler for NoopScheduler {
    async fn create_timer(
        &self,
        _id: &ContainerId,
        _probe: &ProbeSpec,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn start_timer(
        &self,
        _id: &ContainerId,
        _probe: &ProbeSpec,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn stop_timer(
        &self,
        _id: &ContainerId,
        _probe: &ProbeSpec,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }

    async fn remove_transient(
        &self,
        _id: &ContainerId,
        _probe: &ProbeSpec,
    ) -> Result<(), SchedulerError> {
        Ok(())
    }
}

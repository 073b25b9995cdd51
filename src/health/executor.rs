// ABOUTME: One-shot probe execution inside a container's running task.
// ABOUTME: Enforces the probe timeout and serializes probes per container.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time;

use crate::labels::HEALTH_CONFIG_LABEL;
use crate::runtime::{ContainerError, Runtime, TaskStatus};
use crate::types::{ContainerId, ExecId};

use super::HealthCheckError;
use super::command::resolve_command;
use super::probe::ProbeSpec;
use super::record::{HealthRecord, clamp_output};
use super::updater;

/// Outcome of one probe execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Probe exit code; -1 is reserved for a timed-out probe.
    pub exit_code: i32,
    pub timed_out: bool,
    /// Trimmed, clamped combined stdout and stderr.
    pub output: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Runs probes against a runtime, one per container at a time.
pub struct ProbeExecutor<R> {
    runtime: Arc<R>,
    inflight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<R: Runtime> ProbeExecutor<R> {
    pub fn new(runtime: Arc<R>) -> Self {
        Self {
            runtime,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Execute the container's probe once and fold the outcome into its
    /// health record.
    ///
    /// The record is updated before a `Timeout` or `ProbeFailed` error is
    /// returned, so inspect readers observe the failure even when the CLI
    /// exits non-zero.
    pub async fn run_once(&self, id_or_name: &str) -> Result<HealthRecord, HealthCheckError> {
        let id = self.runtime.resolve(id_or_name).await.map_err(|err| match err {
            ContainerError::NotFound(query) => HealthCheckError::NoSuchContainer(query),
            other => HealthCheckError::Runtime(other.to_string()),
        })?;

        let guard = self.container_guard(&id);
        let _guard = guard.lock().await;

        let task = self
            .runtime
            .task(&id)
            .await
            .map_err(HealthCheckError::NoTask)?;
        if task.status != TaskStatus::Running {
            return Err(HealthCheckError::NotRunning(task.status));
        }

        let labels = self
            .runtime
            .labels(&id)
            .await
            .map_err(|e| HealthCheckError::Runtime(e.to_string()))?;
        let payload = labels
            .get(HEALTH_CONFIG_LABEL)
            .ok_or(HealthCheckError::NoConfig)?;
        let spec = ProbeSpec::from_json(payload)?;

        let defaults = self
            .runtime
            .process_defaults(&id)
            .await
            .map_err(|e| HealthCheckError::Runtime(e.to_string()))?;
        let process = resolve_command(&spec, &defaults)?;

        let exec_id = new_exec_id();
        let start = Utc::now();
        tracing::debug!(container = %id, exec = %exec_id, "starting health-check probe");
        let mut probe = self
            .runtime
            .exec(&id, &exec_id, &process)
            .await
            .map_err(HealthCheckError::ExecFailure)?;

        // Bound separately so the wait future's borrow of `probe` ends
        // before the timeout branch kills it.
        let waited = time::timeout(spec.timeout, probe.wait()).await;

        match waited {
            // The probe outlived its window: kill it, keep whatever output
            // made it into the sinks, and record the failure before
            // surfacing the timeout.
            Err(_elapsed) => {
                if let Err(err) = probe.kill().await {
                    tracing::warn!(container = %id, error = %err, "failed to kill timed-out probe");
                }
                let captured = probe.output().await.combined();
                let result = ProbeResult {
                    exit_code: -1,
                    timed_out: true,
                    output: clamp_output(&format!("health check timed out: {captured}")),
                    start,
                    end: Utc::now(),
                };
                updater::apply(self.runtime.as_ref(), &id, &spec, &result, task.started_at)
                    .await?;
                Err(HealthCheckError::Timeout(spec.timeout))
            }
            Ok(Err(err)) => Err(HealthCheckError::ExecFailure(err)),
            Ok(Ok(exit_code)) => {
                let output = clamp_output(&probe.output().await.combined());
                let result = ProbeResult {
                    exit_code,
                    timed_out: false,
                    output,
                    start,
                    end: Utc::now(),
                };
                let record =
                    updater::apply(self.runtime.as_ref(), &id, &spec, &result, task.started_at)
                        .await?;
                if exit_code != 0 {
                    Err(HealthCheckError::ProbeFailed(exit_code))
                } else {
                    Ok(record)
                }
            }
        }
    }

    /// Per-container probe serialization. The runtime's single-task
    /// contract covers cross-process callers; this covers in-process ones.
    fn container_guard(&self, id: &ContainerId) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock().expect("inflight table poisoned");
        Arc::clone(inflight.entry(id.as_str().to_string()).or_default())
    }
}

/// Collision-resistant exec identifier for one probe.
fn new_exec_id() -> ExecId {
    let id = uuid::Uuid::new_v4();
    ExecId::new(format!("health-check-{}", hex::encode(&id.as_bytes()[..6])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn exec_ids_are_short_and_unique() {
        let ids: HashSet<String> = (0..256)
            .map(|_| new_exec_id().into_inner())
            .collect();
        assert_eq!(ids.len(), 256);
        for id in &ids {
            assert!(id.starts_with("health-check-"), "{id}");
            assert_eq!(id.len(), "health-check-".len() + 12, "{id}");
        }
    }
}

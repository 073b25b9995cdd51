// ABOUTME: Folds probe results into the persistent health record.
// ABOUTME: Read-modify-write over the healthcheck/status label, no CAS.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::labels::HEALTH_STATUS_LABEL;
use crate::runtime::ContainerStore;
use crate::types::ContainerId;

use super::HealthCheckError;
use super::executor::ProbeResult;
use super::probe::ProbeSpec;
use super::record::{HealthRecord, HealthStatus, LogEntry};

/// Fold one probe result into the record.
///
/// `since_start` is the age of the task when the probe finished; failures
/// younger than the spec's start period are grace failures and move
/// neither status nor streak. Deterministic in
/// `(record, result, since_start)` for a fixed spec.
pub fn transition(
    record: &mut HealthRecord,
    spec: &ProbeSpec,
    result: &ProbeResult,
    since_start: Duration,
) {
    if result.exit_code == 0 {
        // Any success ends the start period and clears an unhealthy verdict.
        record.status = HealthStatus::Healthy;
        record.failing_streak = 0;
    } else if since_start < spec.start_period {
        // Grace failure: logged below, otherwise invisible.
    } else {
        record.failing_streak += 1;
        if record.failing_streak >= spec.retry_threshold() {
            record.status = HealthStatus::Unhealthy;
        }
        // Below the threshold the status keeps its previous value: a
        // healthy container survives a transient failure.
    }

    record.push_log(LogEntry {
        start: result.start,
        end: result.end,
        exit_code: result.exit_code,
        output: result.output.clone(),
    });
    record.start = result.start;
    record.end = result.end;
}

/// Load, fold and persist the container's health record.
///
/// A missing record defaults to `starting`; an unreadable one is a
/// persistence error rather than silent data loss.
pub async fn apply<S>(
    store: &S,
    id: &ContainerId,
    spec: &ProbeSpec,
    result: &ProbeResult,
    task_started_at: DateTime<Utc>,
) -> Result<HealthRecord, HealthCheckError>
where
    S: ContainerStore + ?Sized,
{
    let labels = store
        .labels(id)
        .await
        .map_err(|e| HealthCheckError::Persist(e.to_string()))?;

    let mut record = match labels.get(HEALTH_STATUS_LABEL) {
        Some(payload) => HealthRecord::from_json(payload)
            .map_err(|e| HealthCheckError::Persist(format!("invalid health status: {e}")))?,
        None => HealthRecord::starting(result.start),
    };

    let since_start = (result.end - task_started_at)
        .to_std()
        .unwrap_or(Duration::ZERO);
    transition(&mut record, spec, result, since_start);

    let payload = record
        .to_json()
        .map_err(|e| HealthCheckError::Persist(e.to_string()))?;
    store
        .set_labels(
            id,
            HashMap::from([(HEALTH_STATUS_LABEL.to_string(), payload)]),
        )
        .await
        .map_err(|e| HealthCheckError::Persist(e.to_string()))?;

    Ok(record)
}

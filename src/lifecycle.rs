// ABOUTME: Wires the scheduler adapter into container lifecycle events.
// ABOUTME: Timer units exist exactly while the container's task runs.

use crate::health::ProbeSpec;
use crate::labels::HEALTH_CONFIG_LABEL;
use crate::runtime::ContainerStore;
use crate::scheduler::{HealthScheduler, SchedulerError};
use crate::types::ContainerId;

/// Container lifecycle events that drive the scheduler adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerEvent {
    /// The task became running.
    Start,
    /// The task exited.
    Stop,
    /// The task was killed.
    Kill,
    /// The task was paused.
    Pause,
    /// The task resumed.
    Unpause,
    /// The container is being removed.
    Remove,
}

/// Apply a lifecycle event to the container's probe schedule.
///
/// Containers without a parsable probe label, including `--no-healthcheck`
/// containers, short-circuit to success. Timer creation and start errors
/// propagate so the start path can report them; teardown is best-effort
/// inside the adapter.
pub async fn apply_event<S, H>(
    store: &S,
    scheduler: &H,
    id: &ContainerId,
    event: ContainerEvent,
) -> Result<(), SchedulerError>
where
    S: ContainerStore + ?Sized,
    H: HealthScheduler + ?Sized,
{
    let Some(probe) = extract_probe(store, id).await else {
        return Ok(());
    };

    match event {
        ContainerEvent::Start => {
            scheduler.create_timer(id, &probe).await?;
            scheduler.start_timer(id, &probe).await
        }
        ContainerEvent::Stop | ContainerEvent::Kill | ContainerEvent::Remove => {
            scheduler.remove_transient(id, &probe).await
        }
        ContainerEvent::Pause => scheduler.stop_timer(id, &probe).await,
        ContainerEvent::Unpause => scheduler.start_timer(id, &probe).await,
    }
}

/// Read the probe spec from the container's labels, if any.
async fn extract_probe<S>(store: &S, id: &ContainerId) -> Option<ProbeSpec>
where
    S: ContainerStore + ?Sized,
{
    let labels = match store.labels(id).await {
        Ok(labels) => labels,
        Err(err) => {
            tracing::debug!(container = %id, error = %err, "could not read container labels");
            return None;
        }
    };
    let payload = labels.get(HEALTH_CONFIG_LABEL)?;
    match ProbeSpec::from_json(payload) {
        Ok(probe) => Some(probe),
        Err(err) => {
            tracing::debug!(container = %id, error = %err, "invalid probe spec label");
            None
        }
    }
}

// ABOUTME: Shared builders for integration tests.
// ABOUTME: Registers memory containers with probe specs and running tasks.

#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, Utc};
use std::time::Duration;
use stevedore::health::{CMD_SHELL, HealthRecord, ProbeSpec};
use stevedore::labels::{HEALTH_CONFIG_LABEL, HEALTH_STATUS_LABEL};
use stevedore::runtime::memory::{MemoryContainer, MemoryRuntime};

/// Install a tracing subscriber honoring RUST_LOG, once per test binary.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Probe spec running `script` through the shell with tight defaults.
pub fn shell_probe(script: &str) -> ProbeSpec {
    ProbeSpec {
        test: vec![CMD_SHELL.to_string(), script.to_string()],
        interval: Duration::from_secs(1),
        timeout: Duration::from_secs(5),
        start_period: Duration::ZERO,
        retries: 3,
    }
}

/// Register a running container carrying the given probe spec.
///
/// The task started an hour ago, safely outside any start period unless
/// the caller builds its own container.
pub fn running_container(runtime: &MemoryRuntime, id: &str, probe: &ProbeSpec) {
    let payload = probe.to_json().expect("probe spec serializes");
    runtime.insert(
        MemoryContainer::new(id)
            .with_label(HEALTH_CONFIG_LABEL, &payload)
            .running_since(Utc::now() - ChronoDuration::hours(1)),
    );
}

/// Parse the persisted health record from the container's labels.
pub fn persisted_record(runtime: &MemoryRuntime, id: &str) -> HealthRecord {
    let labels = runtime.labels_of(id);
    let payload = labels
        .get(HEALTH_STATUS_LABEL)
        .expect("status label present");
    HealthRecord::from_json(payload).expect("record parses")
}

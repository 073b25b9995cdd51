// ABOUTME: The health-check core: probe spec, record, resolver, executor, updater.
// ABOUTME: Probes run inside the container's task; state persists as labels.

mod command;
mod error;
mod executor;
pub mod inspect;
mod probe;
mod record;
mod updater;

pub use command::resolve_command;
pub use error::HealthCheckError;
pub use executor::{ProbeExecutor, ProbeResult};
pub use probe::{CMD, CMD_SHELL, NONE, ProbeSpec};
pub use record::{
    HealthRecord, HealthStatus, LogEntry, MAX_LOG_ENTRIES, MAX_OUTPUT_BYTES, TRUNCATED_SUFFIX,
    clamp_output,
};
pub use updater::{apply, transition};

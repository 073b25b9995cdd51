// ABOUTME: Persistent health record: status, failing streak, bounded probe log.
// ABOUTME: Stored as JSON under the healthcheck/status label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum retained log entries; the oldest drop first.
pub const MAX_LOG_ENTRIES: usize = 5;

/// Upper bound on a stored log entry's output, suffix included.
pub const MAX_OUTPUT_BYTES: usize = 4096;

/// Literal suffix marking clamped output.
pub const TRUNCATED_SUFFIX: &str = "[truncated]";

/// Health status of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// No probe has recorded a terminal outcome yet.
    Starting,
    Healthy,
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            HealthStatus::Starting => "starting",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
        };
        write!(f, "{status}")
    }
}

/// One probe execution as retained in the record's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Probe exit code; -1 means the probe was killed on timeout.
    pub exit_code: i32,
    pub output: String,
}

/// A container's persistent health record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub status: HealthStatus,
    pub failing_streak: u32,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    /// Start of the most recent probe.
    pub start: DateTime<Utc>,
    /// End of the most recent probe.
    pub end: DateTime<Utc>,
}

impl HealthRecord {
    /// Fresh record for a container whose first probe just ran.
    pub fn starting(now: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Starting,
            failing_streak: 0,
            log: Vec::new(),
            start: now,
            end: now,
        }
    }

    /// Decode a record from its JSON label payload.
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Encode the record for the healthcheck/status label.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Append a log entry, dropping the oldest beyond the ring bound.
    pub fn push_log(&mut self, entry: LogEntry) {
        self.log.push(entry);
        if self.log.len() > MAX_LOG_ENTRIES {
            let excess = self.log.len() - MAX_LOG_ENTRIES;
            self.log.drain(..excess);
        }
    }
}

/// Clamp probe output to [`MAX_OUTPUT_BYTES`], appending
/// [`TRUNCATED_SUFFIX`] when bytes were dropped.
///
/// The cut lands on a char boundary so the stored string stays valid
/// UTF-8; the suffix fits inside the bound.
pub fn clamp_output(raw: &str) -> String {
    if raw.len() <= MAX_OUTPUT_BYTES {
        return raw.to_string();
    }
    let budget = MAX_OUTPUT_BYTES - TRUNCATED_SUFFIX.len();
    let mut cut = budget;
    while cut > 0 && !raw.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &raw[..cut], TRUNCATED_SUFFIX)
}

// ABOUTME: Docker-compatible projection of the health record for inspect.
// ABOUTME: PascalCase keys under State.Health, lowercase status values.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::{HealthRecord, HealthStatus, LogEntry};

/// Health state as embedded under `State.Health` by the inspect renderer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Health {
    pub status: HealthStatus,
    pub failing_streak: u32,
    pub log: Vec<HealthLog>,
}

/// One probe execution in inspect form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthLog {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub exit_code: i32,
    pub output: String,
}

impl From<&HealthRecord> for Health {
    fn from(record: &HealthRecord) -> Self {
        Self {
            status: record.status,
            failing_streak: record.failing_streak,
            log: record.log.iter().map(HealthLog::from).collect(),
        }
    }
}

impl From<&LogEntry> for HealthLog {
    fn from(entry: &LogEntry) -> Self {
        Self {
            start: entry.start,
            end: entry.end,
            exit_code: entry.exit_code,
            output: entry.output.clone(),
        }
    }
}

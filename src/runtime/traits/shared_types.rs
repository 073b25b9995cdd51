// ABOUTME: Shared types used across runtime trait definitions.
// ABOUTME: Process specs, task state, and captured exec output.

use chrono::{DateTime, Utc};
use std::fmt;

/// Environment and working directory of the container's init process.
///
/// Probe processes inherit both verbatim; the container's own environment
/// governs command lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessDefaults {
    /// Environment in `KEY=VALUE` form, as stored in the process spec.
    pub env: Vec<String>,
    /// Working directory inside the container.
    pub cwd: String,
}

/// A fully resolved process to execute inside a container's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub args: Vec<String>,
    pub env: Vec<String>,
    pub cwd: String,
}

/// Point-in-time state of a container's task.
#[derive(Debug, Clone)]
pub struct TaskState {
    pub status: TaskStatus,
    /// When the task entered [`TaskStatus::Running`].
    pub started_at: DateTime<Utc>,
}

/// Task status as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Created,
    Running,
    Paused,
    Pausing,
    Stopped,
    Unknown,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            TaskStatus::Created => "created",
            TaskStatus::Running => "running",
            TaskStatus::Paused => "paused",
            TaskStatus::Pausing => "pausing",
            TaskStatus::Stopped => "stopped",
            TaskStatus::Unknown => "unknown",
        };
        write!(f, "{status}")
    }
}

/// Output captured from an exec's stdio pipes.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CapturedOutput {
    /// Concatenated stdout and stderr, lossily decoded, surrounding
    /// whitespace trimmed.
    pub fn combined(&self) -> String {
        let mut bytes = self.stdout.clone();
        bytes.extend_from_slice(&self.stderr);
        String::from_utf8_lossy(&bytes).trim().to_string()
    }
}

/// Capture cap applied to each stdio sink.
pub const MAX_CAPTURE_BYTES: usize = 1 << 20;

/// Append-only byte sink with a hard capacity.
///
/// Overflow is counted, not stored, so a chatty probe cannot grow the
/// capture without bound.
#[derive(Debug)]
pub struct BoundedSink {
    buf: Vec<u8>,
    cap: usize,
    dropped: usize,
}

impl BoundedSink {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: Vec::new(),
            cap,
            dropped: 0,
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        let room = self.cap.saturating_sub(self.buf.len());
        let keep = bytes.len().min(room);
        self.buf.extend_from_slice(&bytes[..keep]);
        self.dropped += bytes.len() - keep;
    }

    /// Bytes discarded past the capacity.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for BoundedSink {
    fn default() -> Self {
        Self::new(MAX_CAPTURE_BYTES)
    }
}

// ABOUTME: Probe specification: command vector plus timing parameters.
// ABOUTME: Stored as integer-nanosecond JSON under the healthcheck/config label.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::HealthCheckError;

/// Sentinel disabling health checks entirely.
pub const NONE: &str = "NONE";
/// Sentinel for direct argv execution.
pub const CMD: &str = "CMD";
/// Sentinel for `/bin/sh -c` execution.
pub const CMD_SHELL: &str = "CMD-SHELL";

/// A container's health probe specification.
///
/// Created by the CLI at `run`/`create`, stored as a JSON label on the
/// container, immutable for the container's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSpec {
    /// Probe command. The first element may be one of the sentinels
    /// `NONE`, `CMD` or `CMD-SHELL`; any other value is taken as the first
    /// argv element of a direct exec.
    #[serde(default)]
    pub test: Vec<String>,

    /// Time between periodic probes; zero disables scheduling.
    #[serde(with = "duration_ns", default)]
    pub interval: Duration,

    /// Time after which a running probe is killed.
    #[serde(with = "duration_ns", default)]
    pub timeout: Duration,

    /// Grace window after task start during which failures do not count.
    #[serde(rename = "startPeriod", with = "duration_ns", default)]
    pub start_period: Duration,

    /// Consecutive failures needed to mark the container unhealthy.
    #[serde(default)]
    pub retries: u32,
}

impl ProbeSpec {
    /// Decode a spec from its JSON label payload.
    pub fn from_json(payload: &str) -> Result<Self, HealthCheckError> {
        let spec: Self = serde_json::from_str(payload)
            .map_err(|e| HealthCheckError::InvalidConfig(e.to_string()))?;
        if spec.enabled() && spec.timeout.is_zero() {
            return Err(HealthCheckError::InvalidConfig(
                "timeout must be positive".to_string(),
            ));
        }
        Ok(spec)
    }

    /// Encode the spec for the healthcheck/config label.
    pub fn to_json(&self) -> Result<String, HealthCheckError> {
        serde_json::to_string(self).map_err(|e| HealthCheckError::InvalidConfig(e.to_string()))
    }

    /// Whether this spec can ever run a probe.
    pub fn enabled(&self) -> bool {
        match self.test.first() {
            None => false,
            Some(first) => first != NONE && !first.is_empty(),
        }
    }

    /// Retry threshold for the unhealthy transition; zero retries means
    /// one failure is enough.
    pub fn retry_threshold(&self) -> u32 {
        self.retries.max(1)
    }
}

/// Durations travel as integer nanoseconds, matching the label encoding
/// the rest of the stack reads and writes.
mod duration_ns {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(value.as_nanos().min(i64::MAX as u128) as i64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        if nanos < 0 {
            return Err(serde::de::Error::custom("duration must not be negative"));
        }
        Ok(Duration::from_nanos(nanos as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell_spec(script: &str) -> ProbeSpec {
        ProbeSpec {
            test: vec![CMD_SHELL.to_string(), script.to_string()],
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            start_period: Duration::ZERO,
            retries: 3,
        }
    }

    #[test]
    fn enabled_requires_a_runnable_command() {
        assert!(shell_spec("echo ok").enabled());
        assert!(!ProbeSpec::default().enabled());

        let none = ProbeSpec {
            test: vec![NONE.to_string()],
            ..ProbeSpec::default()
        };
        assert!(!none.enabled());

        let blank = ProbeSpec {
            test: vec![String::new()],
            ..ProbeSpec::default()
        };
        assert!(!blank.enabled());
    }

    #[test]
    fn zero_retries_normalizes_to_one() {
        let mut spec = shell_spec("echo ok");
        spec.retries = 0;
        assert_eq!(spec.retry_threshold(), 1);
        spec.retries = 4;
        assert_eq!(spec.retry_threshold(), 4);
    }

    #[test]
    fn durations_serialize_as_nanoseconds() {
        let json = shell_spec("echo ok").to_json().unwrap();
        assert!(json.contains("\"interval\":30000000000"), "{json}");
        assert!(json.contains("\"timeout\":5000000000"), "{json}");
        assert!(json.contains("\"startPeriod\":0"), "{json}");
    }

    #[test]
    fn negative_durations_are_rejected() {
        let err = ProbeSpec::from_json(r#"{"test":["CMD","true"],"timeout":-1}"#).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("invalid health check configuration"),
            "{err}"
        );
    }

    #[test]
    fn zero_timeout_is_rejected_only_when_enabled() {
        assert!(ProbeSpec::from_json(r#"{"test":["CMD","true"],"timeout":0}"#).is_err());
        assert!(ProbeSpec::from_json(r#"{"test":["NONE"],"timeout":0}"#).is_ok());
    }

    #[test]
    fn roundtrips_through_json() {
        let spec = shell_spec("curl -f http://localhost/health");
        let parsed = ProbeSpec::from_json(&spec.to_json().unwrap()).unwrap();
        assert_eq!(parsed, spec);
    }
}

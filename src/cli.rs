// ABOUTME: Clap argument surface embedded by the host CLI.
// ABOUTME: Health flags round-trip into a ProbeSpec; durations use humantime.

use clap::{Args, Subcommand};
use std::time::Duration;
use thiserror::Error;

use crate::health::{CMD_SHELL, ProbeSpec};

/// Default interval between scheduled probes.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
/// Default per-probe timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default consecutive failures before unhealthy.
const DEFAULT_RETRIES: u32 = 3;

/// `container` subcommands owned by this subsystem.
#[derive(Debug, Clone, Subcommand)]
pub enum ContainerCommand {
    /// Run the container's health check once and record the outcome
    Healthcheck(HealthcheckArgs),
}

#[derive(Debug, Clone, Args)]
pub struct HealthcheckArgs {
    /// Container id or name
    pub container: String,
}

/// Health-check flags accepted by `run` and `create`.
#[derive(Debug, Clone, Default, Args)]
pub struct HealthFlags {
    /// Command to run to check health (shell form)
    #[arg(long, value_name = "command")]
    pub health_cmd: Option<String>,

    /// Time between running the check
    #[arg(long, value_name = "duration", value_parser = humantime::parse_duration)]
    pub health_interval: Option<Duration>,

    /// Maximum time to allow one check to run
    #[arg(long, value_name = "duration", value_parser = humantime::parse_duration)]
    pub health_timeout: Option<Duration>,

    /// Grace period before failing checks count against the container
    #[arg(long, value_name = "duration", value_parser = humantime::parse_duration)]
    pub health_start_period: Option<Duration>,

    /// Consecutive failures needed to report unhealthy
    #[arg(long, value_name = "count")]
    pub health_retries: Option<u32>,

    /// Disable any container-specified healthcheck
    #[arg(long)]
    pub no_healthcheck: bool,
}

/// Errors from health flag validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HealthFlagError {
    #[error("--no-healthcheck conflicts with --health-* options")]
    Conflict,
}

impl HealthFlags {
    /// Build the probe spec these flags describe.
    ///
    /// Returns `None` when no health check is requested; `--no-healthcheck`
    /// suppresses the spec entirely and rejects the other health flags.
    pub fn to_probe_spec(&self) -> Result<Option<ProbeSpec>, HealthFlagError> {
        let has_options = self.health_cmd.is_some()
            || self.health_interval.is_some()
            || self.health_timeout.is_some()
            || self.health_start_period.is_some()
            || self.health_retries.is_some();

        if self.no_healthcheck {
            if has_options {
                return Err(HealthFlagError::Conflict);
            }
            return Ok(None);
        }

        let Some(cmd) = &self.health_cmd else {
            // The timing flags only modify an explicit command; merging
            // with an image-baked healthcheck happens upstream.
            return Ok(None);
        };

        Ok(Some(ProbeSpec {
            test: vec![CMD_SHELL.to_string(), cmd.clone()],
            interval: self.health_interval.unwrap_or(DEFAULT_INTERVAL),
            timeout: self.health_timeout.unwrap_or(DEFAULT_TIMEOUT),
            start_period: self.health_start_period.unwrap_or(Duration::ZERO),
            retries: self.health_retries.unwrap_or(DEFAULT_RETRIES),
        }))
    }
}

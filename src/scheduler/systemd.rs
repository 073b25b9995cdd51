// ABOUTME: Systemd scheduler: transient timer/service pairs via systemd-run.
// ABOUTME: Rootless sessions talk to the user manager; teardown is best-effort.

use std::env;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::health::ProbeSpec;
use crate::types::ContainerId;

use super::{HealthScheduler, SchedulerError};
use async_trait::async_trait;

/// Environment variable globally disabling the systemd adapter.
pub const DISABLE_ENV: &str = "DISABLE_HC_SYSTEMD";

/// Configuration for the systemd scheduler.
#[derive(Debug, Clone)]
pub struct SystemdConfig {
    /// Absolute path of the CLI invoked by the service unit.
    pub cli_path: PathBuf,
    /// Use the user service manager instead of the system one.
    pub rootless: bool,
    /// Collapse every operation into a success no-op.
    pub disabled: bool,
}

impl SystemdConfig {
    /// Configuration from the process environment: the current executable
    /// as the CLI, rootless when not running as root, disabled via
    /// `DISABLE_HC_SYSTEMD=true`.
    pub fn from_env() -> Self {
        let disabled = env::var(DISABLE_ENV).is_ok_and(|value| value == "true");
        Self {
            cli_path: env::current_exe().unwrap_or_else(|_| PathBuf::from("stevedore")),
            rootless: !is_root(),
            disabled,
        }
    }
}

#[cfg(unix)]
fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(not(unix))]
fn is_root() -> bool {
    false
}

/// Whether a systemd instance is managing this host.
pub fn systemd_available() -> bool {
    cfg!(target_os = "linux") && Path::new("/run/systemd/system").exists()
}

/// Schedules probes through transient systemd timer units.
///
/// Each container gets a `<id>.timer`/`<id>.service` pair created with
/// `systemd-run`; the service wraps one `container healthcheck <id>`
/// invocation, so the CLI never stays resident.
#[derive(Debug, Clone)]
pub struct SystemdScheduler {
    config: SystemdConfig,
}

impl SystemdScheduler {
    pub fn new(config: SystemdConfig) -> Self {
        Self { config }
    }

    fn skip(&self, probe: &ProbeSpec) -> bool {
        self.config.disabled
            || !systemd_available()
            || !probe.enabled()
            || probe.interval.is_zero()
    }

    fn systemctl(&self) -> Command {
        let mut cmd = Command::new("systemctl");
        if self.config.rootless {
            cmd.arg("--user");
        }
        cmd
    }
}

fn timer_unit(id: &ContainerId) -> String {
    format!("{id}.timer")
}

fn service_unit(id: &ContainerId) -> String {
    format!("{id}.service")
}

#[async_trait]
impl HealthScheduler for SystemdScheduler {
    async fn create_timer(
        &self,
        id: &ContainerId,
        probe: &ProbeSpec,
    ) -> Result<(), SchedulerError> {
        if self.skip(probe) {
            return Ok(());
        }

        let mut cmd = Command::new("systemd-run");
        cmd.args(["--property", "LogLevelMax=notice"]);
        if self.config.rootless {
            cmd.arg("--user");
        }
        // The unit inherits PATH from the creating environment so the CLI
        // resolves the same way it did at container start.
        if let Ok(path) = env::var("PATH") {
            cmd.arg(format!("--setenv=PATH={path}"));
        }
        cmd.arg("--unit")
            .arg(id.as_str())
            .arg(format!(
                "--on-unit-inactive={}",
                humantime::format_duration(probe.interval)
            ))
            .arg("--timer-property=AccuracySec=1s")
            .arg(&self.config.cli_path)
            .args(["container", "healthcheck"])
            .arg(id.as_str());

        tracing::debug!(container = %id, "creating health-check timer unit");
        let output = cmd.output().await.map_err(|source| SchedulerError::Spawn {
            command: "systemd-run",
            source,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SchedulerError::UnitCreate(stderr));
        }
        Ok(())
    }

    async fn start_timer(&self, id: &ContainerId, probe: &ProbeSpec) -> Result<(), SchedulerError> {
        if self.skip(probe) {
            return Ok(());
        }

        // systemctl blocks until the queued job finishes, the same wait a
        // DBus job-completion signal would give us.
        let mut cmd = self.systemctl();
        cmd.args(["restart", "--job-mode=fail"]).arg(timer_unit(id));
        let output = cmd.output().await.map_err(|source| SchedulerError::Spawn {
            command: "systemctl",
            source,
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SchedulerError::UnitStart(stderr));
        }
        Ok(())
    }

    async fn stop_timer(&self, id: &ContainerId, probe: &ProbeSpec) -> Result<(), SchedulerError> {
        if self.skip(probe) {
            return Ok(());
        }

        let mut cmd = self.systemctl();
        cmd.arg("stop").arg(timer_unit(id));
        if let Err(err) = run_quiet(cmd).await {
            tracing::warn!(container = %id, error = %err, "failed to stop health-check timer");
        }
        Ok(())
    }

    async fn remove_transient(
        &self,
        id: &ContainerId,
        probe: &ProbeSpec,
    ) -> Result<(), SchedulerError> {
        if self.skip(probe) {
            return Ok(());
        }

        tracing::debug!(container = %id, "removing health-check timer units");
        // Removal is best-effort: the units may already be gone.
        for unit in [timer_unit(id), service_unit(id)] {
            let mut cmd = self.systemctl();
            cmd.args(["stop", "--job-mode=ignore-dependencies"]).arg(&unit);
            if let Err(err) = run_quiet(cmd).await {
                tracing::warn!(container = %id, unit = %unit, error = %err, "failed to stop unit");
            }
        }

        let mut cmd = self.systemctl();
        cmd.arg("reset-failed").arg(service_unit(id));
        if let Err(err) = run_quiet(cmd).await {
            tracing::debug!(container = %id, error = %err, "reset-failed returned an error");
        }
        Ok(())
    }
}

/// Run a command, folding a non-zero exit into an error string.
async fn run_quiet(mut cmd: Command) -> Result<(), String> {
    match cmd.output().await {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(String::from_utf8_lossy(&output.stderr).trim().to_string()),
        Err(err) => Err(err.to_string()),
    }
}

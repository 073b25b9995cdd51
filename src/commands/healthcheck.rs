// ABOUTME: Handler for `container healthcheck <id>`.
// ABOUTME: Runs one probe, persists the record, maps errors to exit codes.

use std::sync::Arc;

use crate::cli::ContainerCommand;
use crate::health::{HealthCheckError, HealthRecord, ProbeExecutor};
use crate::runtime::Runtime;

/// Run one probe against the container and return the updated record.
pub async fn healthcheck<R: Runtime>(
    runtime: Arc<R>,
    id_or_name: &str,
) -> Result<HealthRecord, HealthCheckError> {
    ProbeExecutor::new(runtime).run_once(id_or_name).await
}

/// Dispatch a parsed `container` subcommand and return the process exit
/// code: 0 for a healthy probe (and for a persist-only failure), 1 for
/// everything else. Failures print their message to stderr; success prints
/// nothing.
pub async fn run_container_command<R: Runtime>(runtime: Arc<R>, command: ContainerCommand) -> i32 {
    match command {
        ContainerCommand::Healthcheck(args) => {
            match healthcheck(runtime, &args.container).await {
                Ok(_) => 0,
                Err(err) => {
                    let code = err.exit_code();
                    if code == 0 {
                        tracing::warn!(error = %err, "health check result was not persisted");
                    } else {
                        eprintln!("{err}");
                    }
                    code
                }
            }
        }
    }
}

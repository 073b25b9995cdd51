// ABOUTME: Resolves a probe spec into a concrete process descriptor.
// ABOUTME: The probe inherits the container's env and cwd verbatim.

use super::HealthCheckError;
use super::probe::{CMD, CMD_SHELL, NONE, ProbeSpec};
use crate::runtime::{ProcessDefaults, ProcessSpec};

/// Translate the probe command vector into an executable process spec.
///
/// No synthetic `PATH` is injected; command lookup is governed by the
/// container's own environment. This is what makes `echo $VAR` and `pwd`
/// observe container-level env and workdir settings.
pub fn resolve_command(
    spec: &ProbeSpec,
    defaults: &ProcessDefaults,
) -> Result<ProcessSpec, HealthCheckError> {
    let test = &spec.test;
    if test.is_empty() {
        return Err(HealthCheckError::NoCommand);
    }

    let args = match test[0].as_str() {
        "" | NONE => return Err(HealthCheckError::NoneConfigured),
        CMD => test[1..].to_vec(),
        CMD_SHELL => {
            if test.len() < 2 || test[1].trim().is_empty() {
                return Err(HealthCheckError::NoCommand);
            }
            vec![
                "/bin/sh".to_string(),
                "-c".to_string(),
                test[1..].join(" "),
            ]
        }
        // Legacy shape: the vector already is the argv.
        _ => test.clone(),
    };

    if args.first().is_none_or(|first| first.is_empty()) {
        return Err(HealthCheckError::NoCommand);
    }

    Ok(ProcessSpec {
        args,
        env: defaults.env.clone(),
        cwd: defaults.cwd.clone(),
    })
}

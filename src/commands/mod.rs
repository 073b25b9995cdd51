// ABOUTME: Command handlers for the subcommands this subsystem owns.
// ABOUTME: The host CLI dispatches parsed arguments into these functions.

mod healthcheck;

pub use healthcheck::{healthcheck, run_container_command};

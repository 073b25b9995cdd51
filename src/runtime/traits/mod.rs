// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ContainerStore, TaskOps, ExecOps and the combined Runtime.

mod container;
mod exec;
mod shared_types;
mod task;

pub use container::{ContainerError, ContainerStore};
pub use exec::{ExecError, ExecOps, ExecProcess};
pub use shared_types::*;
pub use task::{TaskError, TaskOps};

/// Everything the probe executor needs from a runtime client.
///
/// Auto-implemented for any type that implements the capability traits.
/// The traits are deliberately open: the real runtime client lives in the
/// host CLI, and tests supply in-memory implementations.
pub trait Runtime: ContainerStore + TaskOps + ExecOps {}

impl<T> Runtime for T where T: ContainerStore + TaskOps + ExecOps {}

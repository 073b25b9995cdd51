// ABOUTME: Runtime contract consumed by the health-check core.
// ABOUTME: The real runtime client implements these traits in the host CLI.

pub mod memory;
mod traits;

pub use traits::*;

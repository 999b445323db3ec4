//! Process introspection
//!
//! Memory and CPU readings come from a [`ProcessProbe`] so handlers never touch
//! global process state directly.

mod format;
mod probe;

pub use format::{format_megabytes, format_uptime};
pub use probe::{CpuTimes, MemoryUsage, ProcessProbe, ProcessSnapshot, SystemProbe};

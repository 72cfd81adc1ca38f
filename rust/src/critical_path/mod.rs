//! Critical path method.
//!
//! Combines the forward and backward passes into per-task slack, flags the
//! zero-slack tasks and orders one of their chains into the critical path.

mod calculation;
mod types;

pub use calculation::{analyze_network, calculate_critical_path, extract_critical_path};
pub use types::{CriticalPathResult, TaskTiming};

//! Project-network scheduling engine.
//!
//! Builds a finish-to-start dependency graph from a task list, runs the
//! critical path method over it (forward pass, backward pass, slack and
//! critical path), places tasks on the calendar either ASAP with resource
//! cursors or ALAP from a deadline, and levels resource overallocation by
//! sliding non-critical tasks inside their slack.
//!
//! Every call is a pure function of its inputs: nothing is cached or shared
//! between calls, and the current date is always passed in by the caller.

pub mod logging;

pub mod backward_pass;
pub mod config;
pub mod critical_path;
pub mod error;
pub mod forward_pass;
pub mod graph;
pub mod interner;
pub mod leveling;
pub mod models;
pub mod scheduler;
pub mod validation;

#[cfg(feature = "python")]
mod python;

use chrono::NaiveDate;

pub use backward_pass::{backward_pass, BackwardPassResult};
pub use config::{LevelingBaseline, SchedulingConfig};
pub use critical_path::{
    analyze_network, calculate_critical_path, extract_critical_path, CriticalPathResult,
    TaskTiming,
};
pub use error::{EngineError, EngineResult};
pub use forward_pass::{forward_pass, ForwardPassResult};
pub use graph::TaskGraph;
pub use leveling::{level_resources, ResourceLeveler, ResourceTimeline};
pub use logging::Verbosity;
pub use models::{
    AvailabilityOverrun, LevelingMethod, LevelingResult, NetworkAnalysis, Overallocation,
    OverrunKind, Resource, ResourceAllocation, ScheduleResult, ScheduledTask, Task, TaskValue,
};
pub use scheduler::{ResourceScheduler, ResourceTable};
pub use validation::{validate_project, ValidationIssue, ValidationIssueKind, ValidationResult};

/// Resource-aware ASAP schedule starting no earlier than `anchor`.
pub fn schedule_forward(
    tasks: &[Task],
    resources: &[Resource],
    anchor: NaiveDate,
    config: &SchedulingConfig,
) -> EngineResult<ScheduleResult> {
    ResourceScheduler::new(tasks, resources, config.clone())?.schedule_forward(anchor)
}

/// ALAP schedule whose last task ends on `deadline`.
pub fn schedule_from_deadline(
    tasks: &[Task],
    resources: &[Resource],
    deadline: NaiveDate,
    config: &SchedulingConfig,
) -> EngineResult<ScheduleResult> {
    ResourceScheduler::new(tasks, resources, config.clone())?.schedule_from_deadline(deadline)
}

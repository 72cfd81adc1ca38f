//! Error taxonomy shared by every stage of the engine.

use thiserror::Error;

/// Errors that abort a network analysis or scheduling request.
///
/// No stage returns a partial result alongside one of these: the whole
/// computation is abandoned and the error is handed back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Task {task_id} has invalid duration {duration} (must be at least 1 day)")]
    InvalidDuration { task_id: String, duration: i64 },

    #[error("Task {task_id} depends on unknown task {missing_id}")]
    DanglingDependency { task_id: String, missing_id: String },

    #[error("Task {task_id} requires unknown resource {missing_id}")]
    DanglingResource { task_id: String, missing_id: String },

    #[error("Duplicate task id: {0}")]
    DuplicateTaskId(String),

    #[error("Duplicate resource id: {0}")]
    DuplicateResourceId(String),

    #[error("Resource {resource_id} has a concurrency limit of 0")]
    InvalidCapacity { resource_id: String },

    #[error("Circular dependency detected involving task {task_id}")]
    CyclicDependency { task_id: String },

    #[error("Dependency graph has {sources} source task(s) and {sinks} sink task(s); both must be non-empty")]
    DisconnectedGraph { sources: usize, sinks: usize },

    #[error("Topological traversal stopped before scheduling tasks: {unscheduled:?}")]
    UnscheduledTask { unscheduled: Vec<String> },

    #[error("Finish of task {task_id} overflows the day-offset range")]
    DurationOverflow { task_id: String },

    #[error("Date arithmetic out of range: {0}")]
    DateOutOfRange(String),

    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

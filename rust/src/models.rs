//! Core data types exchanged with callers.
//!
//! Field names serialize in camelCase and dates as ISO-8601 calendar dates,
//! which is the shape the surrounding application stores and renders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A task in the project network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Duration in whole days. Must be at least 1.
    pub duration: i64,
    /// Completion percentage (0-100). Advisory only; the engine ignores it.
    #[serde(default)]
    pub progress: u8,
    /// Predecessor task ids (finish-to-start).
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Resource ids this task consumes for its whole duration.
    #[serde(default)]
    pub resources: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            progress: 0,
            dependencies: Vec::new(),
            resources: Vec::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }
}

/// A resource tasks can be assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// First day the resource can work. Defaults to the schedule anchor.
    #[serde(default)]
    pub available_from: Option<NaiveDate>,
    /// Last day the resource can work (inclusive).
    #[serde(default)]
    pub available_to: Option<NaiveDate>,
    /// Number of tasks the resource can carry on the same day.
    #[serde(default)]
    pub max_concurrent_tasks: Option<u32>,
}

impl Resource {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            available_from: None,
            available_to: None,
            max_concurrent_tasks: None,
        }
    }

    pub fn with_capacity(mut self, max_concurrent_tasks: u32) -> Self {
        self.max_concurrent_tasks = Some(max_concurrent_tasks);
        self
    }

    pub fn with_window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.available_from = from;
        self.available_to = to;
        self
    }
}

/// Computed CPM values for one task, as day offsets from project start.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskValue {
    pub id: String,
    pub es: i64,
    pub ef: i64,
    pub ls: i64,
    pub lf: i64,
    pub slack: i64,
    pub is_critical: bool,
}

/// Result of a network analysis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAnalysis {
    /// One end-to-end chain of critical tasks. Each step goes to the first
    /// successor (input order) that is critical and starts exactly when the
    /// current task finishes; a critical successor with a gap before it is
    /// skipped. Other critical chains are not listed here, see
    /// `critical_tasks`.
    pub critical_path: Vec<String>,
    /// Every zero-slack task, in input order.
    pub critical_tasks: Vec<String>,
    /// Values for every task, in input order.
    pub task_values: Vec<TaskValue>,
    pub project_duration: i64,
}

impl NetworkAnalysis {
    pub fn task_value(&self, id: &str) -> Option<&TaskValue> {
        self.task_values.iter().find(|v| v.id == id)
    }
}

/// A task with concrete calendar dates assigned. `end` is inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub task: Task,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One (task, resource) pairing over a concrete interval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocation {
    pub task_id: String,
    pub resource_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Which edge of a resource's availability window an allocation crosses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverrunKind {
    /// Starts before `available_from`.
    BeforeAvailableFrom,
    /// Ends after `available_to`.
    AfterAvailableTo,
}

/// An allocation that falls partly outside its resource's availability window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityOverrun {
    pub task_id: String,
    pub resource_id: String,
    pub kind: OverrunKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// The window edge that was crossed.
    pub boundary: NaiveDate,
}

/// A concrete schedule for a task list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    /// Date corresponding to day offset 0.
    pub project_start: NaiveDate,
    /// Latest task end date (equal to `project_start` for an empty schedule).
    pub project_end: NaiveDate,
    /// Tasks in input order.
    pub tasks: Vec<ScheduledTask>,
    pub allocations: Vec<ResourceAllocation>,
    #[serde(default)]
    pub availability_overruns: Vec<AvailabilityOverrun>,
}

impl ScheduleResult {
    pub fn task(&self, id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.task.id == id)
    }
}

/// A day on which a resource carries more tasks than its capacity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overallocation {
    pub resource_id: String,
    pub date: NaiveDate,
    pub load: u32,
    pub capacity: u32,
}

/// Which leveling algorithm produced a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelingMethod {
    /// Greedy slack-window probe. Not guaranteed to find a feasible
    /// leveling even when one exists.
    GreedyBestEffort,
}

/// Output of resource leveling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelingResult {
    pub method: LevelingMethod,
    pub schedule: ScheduleResult,
    /// Ids of tasks whose interval changed, in the order they were moved.
    pub moved_tasks: Vec<String>,
    /// Overallocations still present after leveling.
    pub unresolved_overallocations: Vec<Overallocation>,
}

//! Resource-aware scheduler assigning calendar dates to tasks.

use chrono::NaiveDate;

use crate::config::SchedulingConfig;
use crate::critical_path::{calculate_critical_path, CriticalPathResult};
use crate::error::{EngineError, EngineResult};
use crate::graph::TaskGraph;
use crate::interner::NodeIdx;
use crate::models::{
    AvailabilityOverrun, OverrunKind, Resource, ResourceAllocation, ScheduleResult, ScheduledTask,
    Task,
};
use crate::{log_changes, log_checks, log_debug};

use super::resource_schedule::ResourceTable;
use super::shift_date;

/// Inclusive calendar interval of one task.
pub type Interval = (NaiveDate, NaiveDate);

/// Scheduler over one immutable task/resource list.
///
/// Construction validates the dependency graph and every resource reference
/// up front. Each scheduling call works on its own cursor state, so one
/// scheduler can serve several calls and nothing leaks between them.
pub struct ResourceScheduler<'a> {
    tasks: &'a [Task],
    graph: TaskGraph,
    resources: ResourceTable,
    task_resources: Vec<Vec<NodeIdx>>,
    config: SchedulingConfig,
}

impl<'a> ResourceScheduler<'a> {
    pub fn new(
        tasks: &'a [Task],
        resources: &[Resource],
        config: SchedulingConfig,
    ) -> EngineResult<Self> {
        let graph = TaskGraph::build(tasks)?;
        let resources = ResourceTable::build(resources, config.default_max_concurrent_tasks)?;
        let task_resources = resources.resolve_task_resources(tasks)?;

        Ok(Self {
            tasks,
            graph,
            resources,
            task_resources,
            config,
        })
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Resource indices required by the task at `idx`.
    pub fn task_resources(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.task_resources[idx]
    }

    /// CPM timings for the task list.
    pub fn critical_path(&self) -> EngineResult<CriticalPathResult> {
        calculate_critical_path(&self.graph)
    }

    /// ASAP schedule anchored at `anchor`, honoring resource cursors.
    ///
    /// Tasks are placed in topological order. A task starts no earlier than
    /// the anchor, the day after each predecessor ends, and the next free day
    /// of each resource it uses; its resources are then busy through its end.
    pub fn schedule_forward(&self, anchor: NaiveDate) -> EngineResult<ScheduleResult> {
        self.place_in_order(anchor, true)
    }

    /// ASAP schedule from `anchor` that ignores resource contention.
    ///
    /// Each task starts as early as its predecessors and the `available_from`
    /// of its resources allow. Without availability windows every task lands
    /// on its earliest start offset. Tasks may overlap on a resource.
    pub fn schedule_by_dependencies(&self, anchor: NaiveDate) -> EngineResult<ScheduleResult> {
        self.place_in_order(anchor, false)
    }

    /// Topological placement shared by both ASAP schedules. With `reserve`
    /// each placement advances its resources' cursors past its end.
    fn place_in_order(&self, anchor: NaiveDate, reserve: bool) -> EngineResult<ScheduleResult> {
        let verbosity = self.config.verbosity;
        let n = self.graph.len();
        let order = self.graph.topological_order()?;
        log_debug!(verbosity, "Forward schedule order: {:?}", order);

        let mut cursors = self.resources.cursors(anchor);
        let mut intervals: Vec<Option<Interval>> = vec![None; n];

        for &idx in &order {
            let task_id = self.graph.id(idx);

            let mut start = anchor;
            for &pred in self.graph.predecessors(idx) {
                let (_, pred_end) = intervals[pred].ok_or_else(|| {
                    EngineError::InvariantViolation(format!(
                        "task {} reached before predecessor {}",
                        task_id,
                        self.graph.id(pred)
                    ))
                })?;
                start = start.max(shift_date(pred_end, 1)?);
            }

            let dependencies_ready = start;
            for &res in &self.task_resources[idx] {
                let free = cursors[res].next_available_time(start);
                if free > start {
                    log_checks!(
                        verbosity,
                        "  {} waits for resource {} until {}",
                        task_id,
                        cursors[res].resource_id,
                        free
                    );
                }
                start = free;
            }

            let end = shift_date(start, self.graph.duration(idx) - 1)?;
            if reserve {
                for &res in &self.task_resources[idx] {
                    cursors[res].reserve(end)?;
                }
            }

            if start > dependencies_ready {
                log_changes!(
                    verbosity,
                    "Scheduled {} {}..{} (delayed from {} by resources)",
                    task_id,
                    start,
                    end,
                    dependencies_ready
                );
            } else {
                log_changes!(verbosity, "Scheduled {} {}..{}", task_id, start, end);
            }
            intervals[idx] = Some((start, end));
        }

        let unscheduled: Vec<String> = (0..n)
            .filter(|&idx| intervals[idx].is_none())
            .map(|idx| self.graph.id(idx).to_string())
            .collect();
        if !unscheduled.is_empty() {
            return Err(EngineError::UnscheduledTask { unscheduled });
        }

        let intervals: Vec<Interval> = intervals.into_iter().flatten().collect();
        self.build_result(anchor, &intervals, &order)
    }

    /// ALAP schedule finishing on `deadline` (inclusive).
    ///
    /// The project starts `deadline - D + 1`; every task is placed at its
    /// latest start offset from there.
    pub fn schedule_from_deadline(&self, deadline: NaiveDate) -> EngineResult<ScheduleResult> {
        let cpm = self.critical_path()?;
        let project_start = if self.graph.is_empty() {
            deadline
        } else {
            shift_date(deadline, 1 - cpm.project_duration)?
        };
        log_changes!(
            self.config.verbosity,
            "Deadline {} with duration {} gives project start {}",
            deadline,
            cpm.project_duration,
            project_start
        );

        let intervals = cpm
            .timings
            .iter()
            .map(|t| -> EngineResult<Interval> {
                Ok((
                    shift_date(project_start, t.latest_start)?,
                    shift_date(project_start, t.latest_finish - 1)?,
                ))
            })
            .collect::<EngineResult<Vec<Interval>>>()?;

        let order: Vec<NodeIdx> = (0..self.graph.len()).collect();
        self.build_result(project_start, &intervals, &order)
    }

    /// Assemble a result from per-task intervals (indexed like the graph).
    ///
    /// Allocations are emitted in `order`, one per (task, resource) pair.
    pub(crate) fn build_result(
        &self,
        project_start: NaiveDate,
        intervals: &[Interval],
        order: &[NodeIdx],
    ) -> EngineResult<ScheduleResult> {
        if intervals.len() != self.graph.len() {
            return Err(EngineError::InvariantViolation(format!(
                "{} intervals for {} tasks",
                intervals.len(),
                self.graph.len()
            )));
        }

        let tasks: Vec<ScheduledTask> = self
            .tasks
            .iter()
            .zip(intervals)
            .map(|(task, &(start, end))| ScheduledTask {
                task: task.clone(),
                start,
                end,
            })
            .collect();

        let mut allocations = Vec::new();
        let mut availability_overruns = Vec::new();
        for &idx in order {
            let (start, end) = intervals[idx];
            for &res in &self.task_resources[idx] {
                let task_id = self.graph.id(idx).to_string();
                let resource_id = self.resources.id(res).to_string();
                let resource = self.resources.resource(res);
                let crossed = [
                    resource
                        .available_from
                        .filter(|&from| start < from)
                        .map(|from| (OverrunKind::BeforeAvailableFrom, from)),
                    resource
                        .available_to
                        .filter(|&to| end > to)
                        .map(|to| (OverrunKind::AfterAvailableTo, to)),
                ];
                for (kind, boundary) in crossed.into_iter().flatten() {
                    log_changes!(
                        self.config.verbosity,
                        "{} on {} ({}..{}) crosses availability edge {} ({:?})",
                        task_id,
                        resource_id,
                        start,
                        end,
                        boundary,
                        kind
                    );
                    availability_overruns.push(AvailabilityOverrun {
                        task_id: task_id.clone(),
                        resource_id: resource_id.clone(),
                        kind,
                        start_date: start,
                        end_date: end,
                        boundary,
                    });
                }
                allocations.push(ResourceAllocation {
                    task_id,
                    resource_id,
                    start_date: start,
                    end_date: end,
                });
            }
        }

        let project_end = intervals
            .iter()
            .map(|&(_, end)| end)
            .max()
            .unwrap_or(project_start);

        Ok(ScheduleResult {
            project_start,
            project_end,
            tasks,
            allocations,
            availability_overruns,
        })
    }
}

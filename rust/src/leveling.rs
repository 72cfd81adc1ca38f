//! Greedy resource leveling within task slack.
//!
//! Counts how many tasks each resource carries per day and, where a count
//! exceeds the resource's capacity, shifts non-critical tasks inside their
//! slack window to the first start that fits. This is a best-effort
//! heuristic: it processes tasks once in priority order and never
//! backtracks, so it can miss a feasible leveling that exists.

use chrono::NaiveDate;
use rustc_hash::FxHashMap;

use crate::config::{LevelingBaseline, SchedulingConfig};
use crate::error::{EngineError, EngineResult};
use crate::interner::NodeIdx;
use crate::models::{
    LevelingMethod, LevelingResult, Overallocation, Resource, ResourceAllocation, ScheduleResult,
    Task,
};
use crate::scheduler::{shift_date, Interval, ResourceScheduler, ResourceTable};
use crate::{log_changes, log_checks, log_debug};

/// Per-resource, per-day count of tasks in progress.
#[derive(Clone, Debug, Default)]
pub struct ResourceTimeline {
    usage: Vec<FxHashMap<NaiveDate, u32>>,
}

impl ResourceTimeline {
    pub fn new(resource_count: usize) -> Self {
        Self {
            usage: vec![FxHashMap::default(); resource_count],
        }
    }

    /// Count every allocation day by day.
    pub fn from_allocations(
        table: &ResourceTable,
        allocations: &[ResourceAllocation],
    ) -> EngineResult<Self> {
        let mut timeline = Self::new(table.len());
        for allocation in allocations {
            let res = table.index_of(&allocation.resource_id).ok_or_else(|| {
                EngineError::DanglingResource {
                    task_id: allocation.task_id.clone(),
                    missing_id: allocation.resource_id.clone(),
                }
            })?;
            timeline.add(res, allocation.start_date, allocation.end_date);
        }
        Ok(timeline)
    }

    pub fn load(&self, res: NodeIdx, date: NaiveDate) -> u32 {
        self.usage[res].get(&date).copied().unwrap_or(0)
    }

    /// Add one task on `res` for every day in `[start, end]`.
    pub fn add(&mut self, res: NodeIdx, start: NaiveDate, end: NaiveDate) {
        let days = &mut self.usage[res];
        for day in start.iter_days().take_while(|day| *day <= end) {
            *days.entry(day).or_insert(0) += 1;
        }
    }

    /// Whether one more task on `res` over `[start, end]` stays within capacity.
    pub fn fits(&self, res: NodeIdx, start: NaiveDate, end: NaiveDate, capacity: u32) -> bool {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .all(|day| self.load(res, day) < capacity)
    }

    /// Every (resource, day) whose load exceeds capacity, ordered by
    /// resource then date.
    pub fn overallocations(&self, table: &ResourceTable) -> Vec<Overallocation> {
        let mut result = Vec::new();
        for (res, days) in self.usage.iter().enumerate() {
            let capacity = table.capacity(res);
            let mut over: Vec<(NaiveDate, u32)> = days
                .iter()
                .filter(|(_, &load)| load > capacity)
                .map(|(&date, &load)| (date, load))
                .collect();
            over.sort_unstable_by_key(|&(date, _)| date);
            result.extend(over.into_iter().map(|(date, load)| Overallocation {
                resource_id: table.id(res).to_string(),
                date,
                load,
                capacity,
            }));
        }
        result
    }
}

/// Why a candidate interval was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeRejection {
    OutsideWindow(NodeIdx),
    OverCapacity(NodeIdx),
    PredecessorOverlap(NodeIdx),
    SuccessorOverlap(NodeIdx),
}

/// Levels schedules produced for one scheduler's task and resource lists.
pub struct ResourceLeveler<'s, 'a> {
    scheduler: &'s ResourceScheduler<'a>,
}

impl<'s, 'a> ResourceLeveler<'s, 'a> {
    pub fn new(scheduler: &'s ResourceScheduler<'a>) -> Self {
        Self { scheduler }
    }

    /// Level `schedule`, which must cover the scheduler's task list.
    ///
    /// Tasks with allocations are visited critical first, then by ascending
    /// slack (ties keep allocation order). Critical tasks keep their interval
    /// unconditionally. Every other task tries start offsets `ES..=ES+slack`
    /// from the project start in increasing order and takes the first whose
    /// interval fits every one of its resources, stays inside each resource's
    /// availability window and keeps finish-to-start order with its
    /// neighbours' current intervals. If none fits, the task keeps its
    /// original interval and the overallocation is reported.
    pub fn level(&self, schedule: &ScheduleResult) -> EngineResult<LevelingResult> {
        let graph = self.scheduler.graph();
        let table = self.scheduler.resources();
        let verbosity = self.scheduler.config().verbosity;

        let initial = ResourceTimeline::from_allocations(table, &schedule.allocations)?;
        let overallocations = initial.overallocations(table);
        if overallocations.is_empty() {
            log_changes!(verbosity, "No overallocation, schedule left unchanged");
            return Ok(LevelingResult {
                method: LevelingMethod::GreedyBestEffort,
                schedule: schedule.clone(),
                moved_tasks: Vec::new(),
                unresolved_overallocations: Vec::new(),
            });
        }
        log_changes!(
            verbosity,
            "{} overallocated resource-day(s), leveling",
            overallocations.len()
        );

        let mut intervals = self.intervals_by_index(schedule)?;
        let cpm = self.scheduler.critical_path()?;

        // Tasks in order of first allocation
        let mut allocation_order: Vec<NodeIdx> = Vec::new();
        let mut seen = vec![false; graph.len()];
        for allocation in &schedule.allocations {
            let idx = graph.index_of(&allocation.task_id).ok_or_else(|| {
                EngineError::InvariantViolation(format!(
                    "allocation for unknown task {}",
                    allocation.task_id
                ))
            })?;
            if !seen[idx] {
                seen[idx] = true;
                allocation_order.push(idx);
            }
        }

        let mut queue = allocation_order.clone();
        queue.sort_by(|&a, &b| {
            let (ta, tb) = (&cpm.timings[a], &cpm.timings[b]);
            tb.is_critical()
                .cmp(&ta.is_critical())
                .then(ta.slack.cmp(&tb.slack))
        });
        log_debug!(verbosity, "Leveling order: {:?}", queue);

        let mut timeline = ResourceTimeline::new(table.len());
        let mut moved_tasks = Vec::new();

        for &idx in &queue {
            let timing = cpm.timings[idx];
            let task_id = graph.id(idx);
            let (orig_start, orig_end) = intervals[idx];

            if !timing.is_critical() {
                let span = (orig_end - orig_start).num_days() + 1;
                let mut placed = None;

                for offset in 0..=timing.slack {
                    let start = shift_date(schedule.project_start, timing.earliest_start + offset)?;
                    let end = shift_date(start, span - 1)?;
                    match self.probe(idx, start, end, &intervals, &timeline) {
                        None => {
                            placed = Some((start, end));
                            break;
                        }
                        Some(reason) => {
                            log_checks!(
                                verbosity,
                                "  {} rejected {}..{}: {:?}",
                                task_id,
                                start,
                                end,
                                reason
                            );
                        }
                    }
                }

                match placed {
                    Some(interval) => {
                        if interval != intervals[idx] {
                            log_changes!(
                                verbosity,
                                "Moved {} from {}..{} to {}..{}",
                                task_id,
                                orig_start,
                                orig_end,
                                interval.0,
                                interval.1
                            );
                            moved_tasks.push(task_id.to_string());
                        }
                        intervals[idx] = interval;
                    }
                    None => {
                        log_checks!(
                            verbosity,
                            "  {} has no free slot within {} day(s) of slack, kept in place",
                            task_id,
                            timing.slack
                        );
                    }
                }
            }

            let (start, end) = intervals[idx];
            for &res in self.scheduler.task_resources(idx) {
                timeline.add(res, start, end);
            }
        }

        let leveled =
            self.scheduler
                .build_result(schedule.project_start, &intervals, &allocation_order)?;
        let unresolved_overallocations =
            ResourceTimeline::from_allocations(table, &leveled.allocations)?.overallocations(table);
        for over in &unresolved_overallocations {
            log_changes!(
                verbosity,
                "Unresolved: {} carries {} task(s) on {} (capacity {})",
                over.resource_id,
                over.load,
                over.date,
                over.capacity
            );
        }

        Ok(LevelingResult {
            method: LevelingMethod::GreedyBestEffort,
            schedule: leveled,
            moved_tasks,
            unresolved_overallocations,
        })
    }

    /// Map the schedule's tasks onto graph indices.
    fn intervals_by_index(&self, schedule: &ScheduleResult) -> EngineResult<Vec<Interval>> {
        let graph = self.scheduler.graph();
        let mut intervals: Vec<Option<Interval>> = vec![None; graph.len()];
        for scheduled in &schedule.tasks {
            let idx = graph.index_of(&scheduled.task.id).ok_or_else(|| {
                EngineError::InvariantViolation(format!(
                    "schedule contains unknown task {}",
                    scheduled.task.id
                ))
            })?;
            intervals[idx] = Some((scheduled.start, scheduled.end));
        }

        let missing: Vec<String> = (0..graph.len())
            .filter(|&idx| intervals[idx].is_none())
            .map(|idx| graph.id(idx).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::UnscheduledTask {
                unscheduled: missing,
            });
        }
        Ok(intervals.into_iter().flatten().collect())
    }

    /// Check one candidate interval for task `idx`. `None` means it fits.
    fn probe(
        &self,
        idx: NodeIdx,
        start: NaiveDate,
        end: NaiveDate,
        intervals: &[Interval],
        timeline: &ResourceTimeline,
    ) -> Option<ProbeRejection> {
        let graph = self.scheduler.graph();
        let table = self.scheduler.resources();

        for &res in self.scheduler.task_resources(idx) {
            if !table.within_window(res, start, end) {
                return Some(ProbeRejection::OutsideWindow(res));
            }
            if !timeline.fits(res, start, end, table.capacity(res)) {
                return Some(ProbeRejection::OverCapacity(res));
            }
        }
        for &pred in graph.predecessors(idx) {
            if intervals[pred].1 >= start {
                return Some(ProbeRejection::PredecessorOverlap(pred));
            }
        }
        for &succ in graph.successors(idx) {
            if intervals[succ].0 <= end {
                return Some(ProbeRejection::SuccessorOverlap(succ));
            }
        }
        None
    }
}

/// Schedule `tasks` from `anchor` and level resource usage.
///
/// The starting schedule is chosen by `config.leveling_baseline`.
pub fn level_resources(
    tasks: &[Task],
    resources: &[Resource],
    anchor: NaiveDate,
    config: &SchedulingConfig,
) -> EngineResult<LevelingResult> {
    let scheduler = ResourceScheduler::new(tasks, resources, config.clone())?;
    let baseline = match config.leveling_baseline {
        LevelingBaseline::DependencyOnly => scheduler.schedule_by_dependencies(anchor)?,
        LevelingBaseline::ResourceCursor => scheduler.schedule_forward(anchor)?,
    };
    ResourceLeveler::new(&scheduler).level(&baseline)
}

//! Types for critical path calculation.

use crate::interner::NodeIdx;

/// Per-task CPM timing, in day offsets from project start.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskTiming {
    /// Earliest possible start time (from forward pass).
    pub earliest_start: i64,
    /// Earliest possible finish time (from forward pass).
    pub earliest_finish: i64,
    /// Latest allowable start time (from backward pass).
    pub latest_start: i64,
    /// Latest allowable finish time (from backward pass).
    pub latest_finish: i64,
    /// Slack = latest_start - earliest_start.
    pub slack: i64,
}

impl TaskTiming {
    pub fn is_critical(&self) -> bool {
        self.slack == 0
    }
}

/// Index-addressed result of the full CPM pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriticalPathResult {
    /// Timing for every task, indexed like the graph.
    pub timings: Vec<TaskTiming>,
    /// One critical chain from an entry task to a sink, first-successor tie-break.
    pub critical_path: Vec<NodeIdx>,
    pub project_duration: i64,
}

impl CriticalPathResult {
    /// Indices of every zero-slack task, ascending.
    pub fn critical_tasks(&self) -> Vec<NodeIdx> {
        self.timings
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_critical())
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_timing_critical() {
        let timing = TaskTiming {
            earliest_start: 0,
            earliest_finish: 5,
            latest_start: 0,
            latest_finish: 5,
            slack: 0,
        };
        assert!(timing.is_critical());

        let timing_with_slack = TaskTiming {
            earliest_start: 0,
            earliest_finish: 5,
            latest_start: 2,
            latest_finish: 7,
            slack: 2,
        };
        assert!(!timing_with_slack.is_critical());
    }

    #[test]
    fn test_critical_tasks_filters_by_slack() {
        let critical = TaskTiming::default();
        let loose = TaskTiming {
            slack: 3,
            ..TaskTiming::default()
        };
        let result = CriticalPathResult {
            timings: vec![critical, loose, critical],
            critical_path: vec![0, 2],
            project_duration: 0,
        };
        assert_eq!(result.critical_tasks(), vec![0, 2]);
    }
}

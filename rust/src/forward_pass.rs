//! Forward pass: earliest start and finish for every task.

use crate::error::{EngineError, EngineResult};
use crate::graph::TaskGraph;
use crate::interner::NodeIdx;

/// Earliest times, indexed by task index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardPassResult {
    pub earliest_start: Vec<i64>,
    pub earliest_finish: Vec<i64>,
    /// `max(EF)` over all tasks; 0 for an empty graph.
    pub project_duration: i64,
    /// Topological order the pass visited tasks in.
    pub order: Vec<NodeIdx>,
}

/// Compute ES/EF in topological order.
///
/// Sources start at day 0; every other task starts at the latest finish of
/// its predecessors. Each task is visited exactly once, after all of its
/// predecessors are resolved.
pub fn forward_pass(graph: &TaskGraph) -> EngineResult<ForwardPassResult> {
    let n = graph.len();
    let order = graph.topological_order()?;

    let mut earliest_start = vec![0i64; n];
    let mut earliest_finish = vec![0i64; n];
    let mut resolved = vec![false; n];

    for &idx in &order {
        let duration = graph.duration(idx);
        if duration < 1 {
            return Err(EngineError::InvalidDuration {
                task_id: graph.id(idx).to_string(),
                duration,
            });
        }

        let mut es = 0i64;
        for &pred in graph.predecessors(idx) {
            if !resolved[pred] {
                return Err(EngineError::InvariantViolation(format!(
                    "task {} visited before predecessor {}",
                    graph.id(idx),
                    graph.id(pred)
                )));
            }
            let pred_ef = earliest_finish[pred];
            if pred_ef < 0 {
                return Err(EngineError::InvariantViolation(format!(
                    "predecessor {} has negative earliest finish {}",
                    graph.id(pred),
                    pred_ef
                )));
            }
            es = es.max(pred_ef);
        }

        earliest_start[idx] = es;
        earliest_finish[idx] = es
            .checked_add(duration)
            .ok_or_else(|| EngineError::DurationOverflow {
                task_id: graph.id(idx).to_string(),
            })?;
        resolved[idx] = true;
    }

    if order.len() != n {
        return Err(EngineError::InvariantViolation(format!(
            "forward pass processed {} of {} tasks",
            order.len(),
            n
        )));
    }

    let project_duration = earliest_finish.iter().copied().max().unwrap_or(0);

    Ok(ForwardPassResult {
        earliest_start,
        earliest_finish,
        project_duration,
        order,
    })
}

//! Backward pass: latest start and finish for every task.

use std::collections::VecDeque;

use crate::error::{EngineError, EngineResult};
use crate::graph::TaskGraph;
use crate::interner::NodeIdx;

/// Latest times, indexed by task index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackwardPassResult {
    pub latest_start: Vec<i64>,
    pub latest_finish: Vec<i64>,
}

/// Reverse topological order using Kahn's algorithm on the reversed graph.
///
/// Seeded with every task that has no successors, so a task is emitted only
/// after all of its successors. The structural sinks come first in input
/// order; any other successor-free task (which a validated graph never has)
/// is seeded right after them.
fn reverse_topological_sort(graph: &TaskGraph) -> EngineResult<Vec<NodeIdx>> {
    let n = graph.len();
    let mut out_degree: Vec<usize> = (0..n).map(|i| graph.successors(i).len()).collect();

    let mut queue: VecDeque<NodeIdx> = graph.sinks().iter().copied().collect();
    let mut seeded = vec![false; n];
    for &sink in graph.sinks() {
        seeded[sink] = true;
    }
    for idx in 0..n {
        if out_degree[idx] == 0 && !seeded[idx] {
            seeded[idx] = true;
            queue.push_back(idx);
        }
    }

    let mut result = Vec::with_capacity(n);

    while let Some(idx) = queue.pop_front() {
        result.push(idx);

        for &pred in graph.predecessors(idx) {
            out_degree[pred] -= 1;
            if out_degree[pred] == 0 {
                queue.push_back(pred);
            }
        }
    }

    if result.len() != n {
        let mut seen = vec![false; n];
        for &idx in &result {
            seen[idx] = true;
        }
        return Err(EngineError::UnscheduledTask {
            unscheduled: (0..n)
                .filter(|&i| !seen[i])
                .map(|i| graph.id(i).to_string())
                .collect(),
        });
    }

    Ok(result)
}

/// Compute LF/LS from the project duration backwards.
///
/// Sinks finish at `project_duration`; every other task must finish by the
/// earliest latest-start of its successors. Values outside `[0, D]` mean the
/// forward pass and this pass disagree and are reported, not clamped.
pub fn backward_pass(graph: &TaskGraph, project_duration: i64) -> EngineResult<BackwardPassResult> {
    let n = graph.len();
    let order = reverse_topological_sort(graph)?;

    let mut latest_start = vec![0i64; n];
    let mut latest_finish = vec![0i64; n];
    let mut resolved = vec![false; n];

    for &idx in &order {
        let successors = graph.successors(idx);

        let lf = if successors.is_empty() {
            project_duration
        } else {
            let mut lf = i64::MAX;
            for &succ in successors {
                if !resolved[succ] {
                    return Err(EngineError::InvariantViolation(format!(
                        "task {} visited before successor {}",
                        graph.id(idx),
                        graph.id(succ)
                    )));
                }
                lf = lf.min(latest_start[succ]);
            }
            lf
        };

        let ls = lf - graph.duration(idx);
        if ls < 0 || lf > project_duration {
            return Err(EngineError::InvariantViolation(format!(
                "task {} has latest window [{}, {}] outside [0, {}]",
                graph.id(idx),
                ls,
                lf,
                project_duration
            )));
        }

        latest_finish[idx] = lf;
        latest_start[idx] = ls;
        resolved[idx] = true;
    }

    Ok(BackwardPassResult {
        latest_start,
        latest_finish,
    })
}

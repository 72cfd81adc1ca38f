//! Slack computation and critical path extraction on top of the two passes.

use crate::backward_pass::{backward_pass, BackwardPassResult};
use crate::error::{EngineError, EngineResult};
use crate::forward_pass::{forward_pass, ForwardPassResult};
use crate::graph::TaskGraph;
use crate::interner::NodeIdx;
use crate::models::{NetworkAnalysis, Task, TaskValue};

use super::types::{CriticalPathResult, TaskTiming};

/// Run forward pass, backward pass and extraction on a validated graph.
pub fn calculate_critical_path(graph: &TaskGraph) -> EngineResult<CriticalPathResult> {
    let forward = forward_pass(graph)?;
    let backward = backward_pass(graph, forward.project_duration)?;
    extract_critical_path(graph, &forward, &backward)
}

/// Combine pass results into per-task slack and one ordered critical chain.
pub fn extract_critical_path(
    graph: &TaskGraph,
    forward: &ForwardPassResult,
    backward: &BackwardPassResult,
) -> EngineResult<CriticalPathResult> {
    let n = graph.len();
    let mut timings = Vec::with_capacity(n);

    for idx in 0..n {
        let timing = TaskTiming {
            earliest_start: forward.earliest_start[idx],
            earliest_finish: forward.earliest_finish[idx],
            latest_start: backward.latest_start[idx],
            latest_finish: backward.latest_finish[idx],
            slack: backward.latest_start[idx] - forward.earliest_start[idx],
        };
        if timing.slack < 0 {
            return Err(EngineError::InvariantViolation(format!(
                "task {} has negative slack {}",
                graph.id(idx),
                timing.slack
            )));
        }
        timings.push(timing);
    }

    let critical_path = if n == 0 {
        Vec::new()
    } else {
        walk_critical_chain(graph, &timings, forward.project_duration)?
    };

    Ok(CriticalPathResult {
        timings,
        critical_path,
        project_duration: forward.project_duration,
    })
}

/// Depth-first walk over the critical subgraph from its entry tasks.
///
/// Entry tasks are critical tasks with no critical predecessor, tried in
/// input order. From each task the walk follows the first successor (input
/// order) that is critical and starts exactly when the current task
/// finishes, and stops at a sink finishing at the project duration. Other
/// critical chains that may exist are not reported.
fn walk_critical_chain(
    graph: &TaskGraph,
    timings: &[TaskTiming],
    project_duration: i64,
) -> EngineResult<Vec<NodeIdx>> {
    let n = graph.len();
    let critical: Vec<bool> = timings.iter().map(TaskTiming::is_critical).collect();

    let entries: Vec<NodeIdx> = (0..n)
        .filter(|&idx| critical[idx])
        .filter(|&idx| !graph.predecessors(idx).iter().any(|&p| critical[p]))
        .collect();

    if entries.is_empty() {
        return Err(EngineError::InvariantViolation(
            "non-empty network has no critical entry task".to_string(),
        ));
    }

    let mut visited = vec![false; n];
    let mut stack: Vec<(NodeIdx, usize)> = Vec::new();

    for &entry in &entries {
        if visited[entry] {
            continue;
        }
        visited[entry] = true;
        stack.push((entry, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, pos) = *frame;
            let successors = graph.successors(node);

            if successors.is_empty() && timings[node].earliest_finish == project_duration {
                return Ok(stack.iter().map(|&(idx, _)| idx).collect());
            }

            let next = successors
                .iter()
                .enumerate()
                .skip(pos)
                .find(|&(_, &succ)| {
                    critical[succ]
                        && !visited[succ]
                        && timings[succ].earliest_start == timings[node].earliest_finish
                });

            match next {
                Some((succ_pos, &succ)) => {
                    frame.1 = succ_pos + 1;
                    visited[succ] = true;
                    stack.push((succ, 0));
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    Err(EngineError::InvariantViolation(
        "no critical chain reaches a sink at the project duration".to_string(),
    ))
}

/// Build the boundary-facing analysis from an index-addressed result.
pub(crate) fn to_network_analysis(
    graph: &TaskGraph,
    result: &CriticalPathResult,
) -> NetworkAnalysis {
    let task_values = result
        .timings
        .iter()
        .enumerate()
        .map(|(idx, timing)| TaskValue {
            id: graph.id(idx).to_string(),
            es: timing.earliest_start,
            ef: timing.earliest_finish,
            ls: timing.latest_start,
            lf: timing.latest_finish,
            slack: timing.slack,
            is_critical: timing.is_critical(),
        })
        .collect();

    NetworkAnalysis {
        critical_path: graph.ids().resolve_all(&result.critical_path),
        critical_tasks: graph.ids().resolve_all(&result.critical_tasks()),
        task_values,
        project_duration: result.project_duration,
    }
}

/// Full network analysis: graph construction, both passes, slack and the
/// critical path.
///
/// Any structural problem aborts the whole computation; no partial result
/// is returned.
pub fn analyze_network(tasks: &[Task]) -> EngineResult<NetworkAnalysis> {
    let graph = TaskGraph::build(tasks)?;
    let result = calculate_critical_path(&graph)?;
    Ok(to_network_analysis(&graph, &result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(id: &str, duration: i64, deps: &[&str]) -> Task {
        Task::new(id, id.to_uppercase(), duration).with_dependencies(deps.iter().copied())
    }

    fn value<'a>(analysis: &'a NetworkAnalysis, id: &str) -> &'a TaskValue {
        analysis.task_value(id).unwrap()
    }

    #[test]
    fn test_linear_chain_all_critical() {
        let tasks = vec![
            make_task("a", 3, &[]),
            make_task("b", 2, &["a"]),
            make_task("c", 4, &["b"]),
        ];
        let analysis = analyze_network(&tasks).unwrap();

        assert_eq!(analysis.project_duration, 9);
        assert_eq!(analysis.critical_path, vec!["a", "b", "c"]);
        assert_eq!((value(&analysis, "a").es, value(&analysis, "a").ef), (0, 3));
        assert_eq!((value(&analysis, "b").es, value(&analysis, "b").ef), (3, 5));
        assert_eq!((value(&analysis, "c").es, value(&analysis, "c").ef), (5, 9));
        for v in &analysis.task_values {
            assert_eq!(v.slack, 0);
            assert!(v.is_critical);
        }
    }

    #[test]
    fn test_diamond() {
        let tasks = vec![
            make_task("a", 2, &[]),
            make_task("b", 3, &["a"]),
            make_task("c", 1, &["a"]),
            make_task("d", 2, &["b", "c"]),
        ];
        let analysis = analyze_network(&tasks).unwrap();

        assert_eq!(value(&analysis, "b").es, 2);
        assert_eq!(value(&analysis, "c").es, 2);
        assert_eq!(value(&analysis, "b").ef, 5);
        assert_eq!(value(&analysis, "c").ef, 3);
        assert_eq!(value(&analysis, "d").es, 5);
        assert_eq!(analysis.project_duration, 7);
        assert_eq!(analysis.critical_path, vec!["a", "b", "d"]);
        assert_eq!(value(&analysis, "c").slack, 2);
        assert!(!value(&analysis, "c").is_critical);
        assert_eq!(analysis.critical_tasks, vec!["a", "b", "d"]);
    }

    #[test]
    fn test_first_successor_tie_break() {
        // Two equally long branches: both critical, the first listed is followed
        let tasks = vec![
            make_task("a", 1, &[]),
            make_task("left", 4, &["a"]),
            make_task("right", 4, &["a"]),
            make_task("z", 1, &["left", "right"]),
        ];
        let analysis = analyze_network(&tasks).unwrap();

        assert_eq!(analysis.critical_tasks.len(), 4);
        assert_eq!(analysis.critical_path, vec!["a", "left", "z"]);
    }

    #[test]
    fn test_chain_skips_loose_edge_between_critical_tasks() {
        // a -> x is an edge between two critical tasks, but x is driven by b,
        // so the chain must go a -> b -> x rather than a -> x.
        let tasks = vec![
            make_task("a", 2, &[]),
            make_task("x", 1, &["a", "b"]),
            make_task("b", 3, &["a"]),
        ];
        let analysis = analyze_network(&tasks).unwrap();

        assert_eq!(analysis.project_duration, 6);
        assert_eq!(analysis.critical_path, vec!["a", "b", "x"]);
    }

    #[test]
    fn test_independent_chains_pick_the_longest() {
        let tasks = vec![
            make_task("short", 2, &[]),
            make_task("long1", 3, &[]),
            make_task("long2", 4, &["long1"]),
        ];
        let analysis = analyze_network(&tasks).unwrap();

        assert_eq!(analysis.project_duration, 7);
        assert_eq!(analysis.critical_path, vec!["long1", "long2"]);
        assert_eq!(value(&analysis, "short").slack, 5);
    }

    #[test]
    fn test_project_duration_equals_sink_latest_finish() {
        let tasks = vec![
            make_task("a", 2, &[]),
            make_task("b", 5, &["a"]),
            make_task("c", 1, &["a"]),
            make_task("d", 3, &[]),
        ];
        let analysis = analyze_network(&tasks).unwrap();
        let max_ef = analysis.task_values.iter().map(|v| v.ef).max().unwrap();

        assert_eq!(analysis.project_duration, max_ef);
        for sink in ["b", "c", "d"] {
            assert_eq!(value(&analysis, sink).lf, analysis.project_duration);
        }
    }

    #[test]
    fn test_idempotent() {
        let tasks = vec![
            make_task("a", 2, &[]),
            make_task("b", 3, &["a"]),
            make_task("c", 1, &["a"]),
            make_task("d", 2, &["b", "c"]),
        ];
        let first = analyze_network(&tasks).unwrap();
        let second = analyze_network(&tasks).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_task_list() {
        let analysis = analyze_network(&[]).unwrap();
        assert_eq!(analysis.project_duration, 0);
        assert!(analysis.critical_path.is_empty());
        assert!(analysis.task_values.is_empty());
    }

    #[test]
    fn test_errors_abort_analysis() {
        let cyclic = vec![make_task("a", 1, &["b"]), make_task("b", 1, &["a"])];
        assert!(matches!(
            analyze_network(&cyclic),
            Err(EngineError::CyclicDependency { .. })
        ));

        let dangling = vec![make_task("a", 1, &["nope"])];
        assert_eq!(
            analyze_network(&dangling).unwrap_err(),
            EngineError::DanglingDependency {
                task_id: "a".to_string(),
                missing_id: "nope".to_string(),
            }
        );

        let huge = i64::MAX / 2 + 1;
        let overflowing = vec![make_task("a", huge, &[]), make_task("b", huge, &["a"])];
        assert!(matches!(
            analyze_network(&overflowing),
            Err(EngineError::DurationOverflow { .. })
        ));
    }

    #[test]
    fn test_task_values_in_input_order() {
        let tasks = vec![
            make_task("z", 1, &["y"]),
            make_task("y", 1, &[]),
        ];
        let analysis = analyze_network(&tasks).unwrap();
        let ids: Vec<&str> = analysis.task_values.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "y"]);
        assert_eq!(analysis.critical_path, vec!["y", "z"]);
    }
}

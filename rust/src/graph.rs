//! Dependency graph construction and structural validation.

use std::collections::VecDeque;

use crate::error::{EngineError, EngineResult};
use crate::interner::{IdIndex, NodeIdx};
use crate::models::Task;

/// Directed acyclic graph of finish-to-start dependencies.
///
/// Nodes are addressed by dense index in input order. Construction rejects
/// duplicate ids, non-positive durations, dangling dependencies and cycles,
/// so every `TaskGraph` in existence is a schedulable DAG.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    index: IdIndex,
    durations: Vec<i64>,
    predecessors: Vec<Vec<NodeIdx>>,
    successors: Vec<Vec<NodeIdx>>,
    sources: Vec<NodeIdx>,
    sinks: Vec<NodeIdx>,
}

impl TaskGraph {
    /// Build the graph from an ordered task list in O(n + e).
    pub fn build(tasks: &[Task]) -> EngineResult<Self> {
        let n = tasks.len();
        let mut index = IdIndex::with_capacity(n);
        for task in tasks {
            if index.insert_unique(&task.id).is_none() {
                return Err(EngineError::DuplicateTaskId(task.id.clone()));
            }
        }

        let mut durations = Vec::with_capacity(n);
        let mut predecessors: Vec<Vec<NodeIdx>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<NodeIdx>> = vec![Vec::new(); n];

        for (idx, task) in tasks.iter().enumerate() {
            if task.duration < 1 {
                return Err(EngineError::InvalidDuration {
                    task_id: task.id.clone(),
                    duration: task.duration,
                });
            }
            durations.push(task.duration);

            for dep_id in &task.dependencies {
                let dep_idx =
                    index
                        .get(dep_id)
                        .ok_or_else(|| EngineError::DanglingDependency {
                            task_id: task.id.clone(),
                            missing_id: dep_id.clone(),
                        })?;
                if dep_idx == idx {
                    return Err(EngineError::CyclicDependency {
                        task_id: task.id.clone(),
                    });
                }
                // Repeated ids in one dependency list collapse to a single edge
                if predecessors[idx].contains(&dep_idx) {
                    continue;
                }
                predecessors[idx].push(dep_idx);
                successors[dep_idx].push(idx);
            }
        }

        if let Some(on_cycle) = find_cycle(&successors) {
            return Err(EngineError::CyclicDependency {
                task_id: index.resolve(on_cycle).to_string(),
            });
        }

        let sources: Vec<NodeIdx> = (0..n).filter(|&i| predecessors[i].is_empty()).collect();
        let sinks: Vec<NodeIdx> = (0..n).filter(|&i| successors[i].is_empty()).collect();

        if n > 0 && (sources.is_empty() || sinks.is_empty()) {
            return Err(EngineError::DisconnectedGraph {
                sources: sources.len(),
                sinks: sinks.len(),
            });
        }

        Ok(Self {
            index,
            durations,
            predecessors,
            successors,
            sources,
            sinks,
        })
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    #[inline]
    pub fn id(&self, idx: NodeIdx) -> &str {
        self.index.resolve(idx)
    }

    #[inline]
    pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
        self.index.get(id)
    }

    pub fn ids(&self) -> &IdIndex {
        &self.index
    }

    #[inline]
    pub fn duration(&self, idx: NodeIdx) -> i64 {
        self.durations[idx]
    }

    #[inline]
    pub fn predecessors(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.predecessors[idx]
    }

    #[inline]
    pub fn successors(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.successors[idx]
    }

    /// Tasks with no dependencies, in input order.
    pub fn sources(&self) -> &[NodeIdx] {
        &self.sources
    }

    /// Tasks nothing depends on, in input order.
    pub fn sinks(&self) -> &[NodeIdx] {
        &self.sinks
    }

    /// Kahn's algorithm over successor edges, seeded with sources in input order.
    ///
    /// A task is emitted only after every predecessor has been emitted. If the
    /// traversal covers fewer than `len()` tasks the remaining ids are reported.
    pub fn topological_order(&self) -> EngineResult<Vec<NodeIdx>> {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut queue: VecDeque<NodeIdx> = self.sources.iter().copied().collect();
        let mut order = Vec::with_capacity(n);

        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            for &succ in &self.successors[idx] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push_back(succ);
                }
            }
        }

        if order.len() != n {
            let mut seen = vec![false; n];
            for &idx in &order {
                seen[idx] = true;
            }
            let unscheduled = (0..n)
                .filter(|&i| !seen[i])
                .map(|i| self.id(i).to_string())
                .collect();
            return Err(EngineError::UnscheduledTask { unscheduled });
        }

        Ok(order)
    }
}

/// Iterative DFS cycle search. Returns a node that lies on a cycle, if any.
///
/// Uses an explicit stack of (node, next successor position) plus an
/// on-stack marker, so deep chains cannot overflow the call stack.
pub(crate) fn find_cycle(successors: &[Vec<NodeIdx>]) -> Option<NodeIdx> {
    let n = successors.len();
    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<(NodeIdx, usize)> = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        on_stack[root] = true;
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let (node, pos) = *frame;
            if let Some(&next) = successors[node].get(pos) {
                frame.1 += 1;
                if on_stack[next] {
                    return Some(next);
                }
                if !visited[next] {
                    visited[next] = true;
                    on_stack[next] = true;
                    stack.push((next, 0));
                }
            } else {
                on_stack[node] = false;
                stack.pop();
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(id: &str, duration: i64, deps: &[&str]) -> Task {
        Task::new(id, id.to_uppercase(), duration).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_empty_graph() {
        let graph = TaskGraph::build(&[]).unwrap();
        assert!(graph.is_empty());
        assert!(graph.topological_order().unwrap().is_empty());
    }

    #[test]
    fn test_adjacency_both_directions() {
        let tasks = vec![
            make_task("a", 2, &[]),
            make_task("b", 3, &["a"]),
            make_task("c", 1, &["a"]),
            make_task("d", 2, &["b", "c"]),
        ];
        let graph = TaskGraph::build(&tasks).unwrap();

        assert_eq!(graph.successors(0), &[1, 2]);
        assert_eq!(graph.predecessors(3), &[1, 2]);
        assert_eq!(graph.sources(), &[0]);
        assert_eq!(graph.sinks(), &[3]);
        assert_eq!(graph.index_of("c"), Some(2));
        assert_eq!(graph.id(3), "d");
    }

    #[test]
    fn test_topological_order_respects_dependencies() {
        // Listed out of dependency order on purpose
        let tasks = vec![
            make_task("d", 1, &["b", "c"]),
            make_task("c", 1, &["a"]),
            make_task("b", 1, &["a"]),
            make_task("a", 1, &[]),
        ];
        let graph = TaskGraph::build(&tasks).unwrap();
        let order = graph.topological_order().unwrap();

        let pos = |id: &str| {
            let idx = graph.index_of(id).unwrap();
            order.iter().position(|&i| i == idx).unwrap()
        };
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }

    #[test]
    fn test_mutual_dependency_is_cycle() {
        let tasks = vec![make_task("a", 1, &["b"]), make_task("b", 1, &["a"])];
        let err = TaskGraph::build(&tasks).unwrap_err();
        assert!(matches!(err, EngineError::CyclicDependency { .. }));
    }

    #[test]
    fn test_cycle_behind_valid_prefix() {
        let tasks = vec![
            make_task("start", 1, &[]),
            make_task("x", 1, &["start", "z"]),
            make_task("y", 1, &["x"]),
            make_task("z", 1, &["y"]),
        ];
        match TaskGraph::build(&tasks) {
            Err(EngineError::CyclicDependency { task_id }) => {
                assert!(["x", "y", "z"].contains(&task_id.as_str()));
            }
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let tasks = vec![make_task("a", 1, &["a"])];
        assert_eq!(
            TaskGraph::build(&tasks).unwrap_err(),
            EngineError::CyclicDependency {
                task_id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_dangling_dependency_names_both_ids() {
        let tasks = vec![make_task("a", 1, &[]), make_task("b", 1, &["ghost"])];
        assert_eq!(
            TaskGraph::build(&tasks).unwrap_err(),
            EngineError::DanglingDependency {
                task_id: "b".to_string(),
                missing_id: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_duration() {
        let tasks = vec![make_task("a", 0, &[])];
        assert_eq!(
            TaskGraph::build(&tasks).unwrap_err(),
            EngineError::InvalidDuration {
                task_id: "a".to_string(),
                duration: 0,
            }
        );
        let tasks = vec![make_task("a", -2, &[])];
        assert!(matches!(
            TaskGraph::build(&tasks),
            Err(EngineError::InvalidDuration { duration: -2, .. })
        ));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let tasks = vec![make_task("a", 1, &[]), make_task("a", 2, &[])];
        assert_eq!(
            TaskGraph::build(&tasks).unwrap_err(),
            EngineError::DuplicateTaskId("a".to_string())
        );
    }

    #[test]
    fn test_repeated_dependency_collapses() {
        let tasks = vec![make_task("a", 1, &[]), make_task("b", 1, &["a", "a"])];
        let graph = TaskGraph::build(&tasks).unwrap();
        assert_eq!(graph.predecessors(1), &[0]);
        assert_eq!(graph.successors(0), &[1]);
        assert_eq!(graph.topological_order().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let n = 50_000;
        let mut tasks = vec![make_task("t0", 1, &[])];
        for i in 1..n {
            let prev = format!("t{}", i - 1);
            tasks.push(make_task(&format!("t{}", i), 1, &[prev.as_str()]));
        }
        let graph = TaskGraph::build(&tasks).unwrap();
        assert_eq!(graph.topological_order().unwrap().len(), n);
    }

    #[test]
    fn test_find_cycle_on_raw_adjacency() {
        assert_eq!(find_cycle(&[vec![1], vec![2], vec![]]), None);
        assert!(find_cycle(&[vec![1], vec![2], vec![0]]).is_some());
    }
}

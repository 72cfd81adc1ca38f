//! Whole-project validation.
//!
//! Unlike graph construction, which stops at the first error, this walks the
//! complete task and resource lists and reports every problem it finds.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::find_cycle;
use crate::interner::NodeIdx;
use crate::models::{Resource, Task};

pub type ValidationResult = Result<(), Vec<ValidationIssue>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub kind: ValidationIssueKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationIssueKind {
    /// Task name is empty or whitespace.
    BlankName,
    /// Duration below one day.
    InvalidDuration,
    /// Two tasks or two resources share an id.
    DuplicateId,
    /// A dependency names a task that does not exist.
    DanglingDependency,
    /// A task names a resource that does not exist.
    DanglingResource,
    /// A task lists itself as a dependency.
    SelfDependency,
    CyclicDependency,
    /// Progress above 100 percent.
    InvalidProgress,
    /// Resource can carry no tasks at all.
    ZeroCapacity,
}

impl ValidationIssue {
    fn new(kind: ValidationIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Check tasks and resources, collecting every issue.
///
/// A cycle is reported once, naming one task on it. Self-dependencies are
/// reported as such and left out of the cycle search.
pub fn validate_project(tasks: &[Task], resources: &[Resource]) -> ValidationResult {
    let mut issues = Vec::new();

    let mut resource_ids: FxHashSet<&str> = FxHashSet::default();
    for resource in resources {
        if !resource_ids.insert(resource.id.as_str()) {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::DuplicateId,
                format!("Duplicate resource id: {}", resource.id),
            ));
        }
        if resource.max_concurrent_tasks == Some(0) {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::ZeroCapacity,
                format!("Resource '{}' has a capacity of 0", resource.id),
            ));
        }
    }

    // First occurrence wins for duplicate task ids
    let mut task_index: FxHashMap<&str, NodeIdx> = FxHashMap::default();
    for (idx, task) in tasks.iter().enumerate() {
        if task_index.contains_key(task.id.as_str()) {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::DuplicateId,
                format!("Duplicate task id: {}", task.id),
            ));
        } else {
            task_index.insert(task.id.as_str(), idx);
        }
    }

    let mut successors: Vec<Vec<NodeIdx>> = vec![Vec::new(); tasks.len()];

    for (idx, task) in tasks.iter().enumerate() {
        if task.name.trim().is_empty() {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::BlankName,
                format!("Task '{}' has no name", task.id),
            ));
        }
        if task.duration < 1 {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::InvalidDuration,
                format!(
                    "Task '{}' has duration {}, expected at least 1",
                    task.id, task.duration
                ),
            ));
        }
        if task.progress > 100 {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::InvalidProgress,
                format!("Task '{}' has progress {}%", task.id, task.progress),
            ));
        }

        for dep_id in &task.dependencies {
            if *dep_id == task.id {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::SelfDependency,
                    format!("Task '{}' depends on itself", task.id),
                ));
                continue;
            }
            match task_index.get(dep_id.as_str()) {
                Some(&dep_idx) => {
                    if !successors[dep_idx].contains(&idx) {
                        successors[dep_idx].push(idx);
                    }
                }
                None => issues.push(ValidationIssue::new(
                    ValidationIssueKind::DanglingDependency,
                    format!("Task '{}' depends on unknown task '{}'", task.id, dep_id),
                )),
            }
        }

        for resource_id in &task.resources {
            if !resource_ids.contains(resource_id.as_str()) {
                issues.push(ValidationIssue::new(
                    ValidationIssueKind::DanglingResource,
                    format!(
                        "Task '{}' uses unknown resource '{}'",
                        task.id, resource_id
                    ),
                ));
            }
        }
    }

    if let Some(on_cycle) = find_cycle(&successors) {
        issues.push(ValidationIssue::new(
            ValidationIssueKind::CyclicDependency,
            format!(
                "Circular dependency involving task '{}'",
                tasks[on_cycle].id
            ),
        ));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

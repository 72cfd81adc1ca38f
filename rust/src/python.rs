//! Python bindings.
//!
//! Inputs arrive as `Task`/`Resource` classes; results go back as JSON
//! strings in the same camelCase shape the serde models produce.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde::Serialize;

use crate::config::{LevelingBaseline, SchedulingConfig};
use crate::error::EngineError;
use crate::logging::Verbosity;
use crate::models::{Resource, Task};
use crate::scheduler::ResourceScheduler;

impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn to_json<T: Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn make_config(verbosity: u8, cursor_baseline: bool) -> SchedulingConfig {
    let baseline = if cursor_baseline {
        LevelingBaseline::ResourceCursor
    } else {
        LevelingBaseline::DependencyOnly
    };
    SchedulingConfig::default()
        .with_verbosity(Verbosity::from_level(verbosity))
        .with_leveling_baseline(baseline)
}

/// Task in the project network (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub duration: i64,
    #[pyo3(get, set)]
    pub progress: u8,
    #[pyo3(get, set)]
    pub dependencies: Vec<String>,
    #[pyo3(get, set)]
    pub resources: Vec<String>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (id, name, duration, dependencies=Vec::new(), resources=Vec::new(), progress=0))]
    fn new(
        id: String,
        name: String,
        duration: i64,
        dependencies: Vec<String>,
        resources: Vec<String>,
        progress: u8,
    ) -> Self {
        Self {
            id,
            name,
            duration,
            progress,
            dependencies,
            resources,
        }
    }

    fn __repr__(&self) -> String {
        format!("Task(id={:?}, duration={})", self.id, self.duration)
    }
}

impl From<PyTask> for Task {
    fn from(task: PyTask) -> Self {
        Task {
            id: task.id,
            name: task.name,
            duration: task.duration,
            progress: task.progress,
            dependencies: task.dependencies,
            resources: task.resources,
        }
    }
}

/// Resource tasks can be assigned to (PyO3 wrapper).
#[pyclass(name = "Resource")]
#[derive(Clone, Debug)]
pub struct PyResource {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub available_from: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub available_to: Option<NaiveDate>,
    #[pyo3(get, set)]
    pub max_concurrent_tasks: Option<u32>,
}

#[pymethods]
impl PyResource {
    #[new]
    #[pyo3(signature = (id, name=None, available_from=None, available_to=None, max_concurrent_tasks=None))]
    fn new(
        id: String,
        name: Option<String>,
        available_from: Option<NaiveDate>,
        available_to: Option<NaiveDate>,
        max_concurrent_tasks: Option<u32>,
    ) -> Self {
        let name = name.unwrap_or_else(|| id.clone());
        Self {
            id,
            name,
            available_from,
            available_to,
            max_concurrent_tasks,
        }
    }

    fn __repr__(&self) -> String {
        format!("Resource(id={:?})", self.id)
    }
}

impl From<PyResource> for Resource {
    fn from(resource: PyResource) -> Self {
        Resource {
            id: resource.id,
            name: resource.name,
            available_from: resource.available_from,
            available_to: resource.available_to,
            max_concurrent_tasks: resource.max_concurrent_tasks,
        }
    }
}

fn convert(tasks: Vec<PyTask>, resources: Vec<PyResource>) -> (Vec<Task>, Vec<Resource>) {
    (
        tasks.into_iter().map(Task::from).collect(),
        resources.into_iter().map(Resource::from).collect(),
    )
}

/// Compute ES/EF/LS/LF, slack and the critical path.
///
/// # Returns
/// * JSON string of the network analysis
///
/// # Raises
/// * ValueError for invalid durations, dangling dependencies or cycles
#[pyfunction]
#[pyo3(name = "analyze_network")]
fn py_analyze_network(tasks: Vec<PyTask>) -> PyResult<String> {
    let (tasks, _) = convert(tasks, Vec::new());
    to_json(&crate::critical_path::analyze_network(&tasks)?)
}

/// Resource-aware ASAP schedule starting no earlier than `anchor`.
#[pyfunction]
#[pyo3(name = "schedule_forward", signature = (tasks, resources, anchor, verbosity=0))]
fn py_schedule_forward(
    tasks: Vec<PyTask>,
    resources: Vec<PyResource>,
    anchor: NaiveDate,
    verbosity: u8,
) -> PyResult<String> {
    let (tasks, resources) = convert(tasks, resources);
    let scheduler = ResourceScheduler::new(&tasks, &resources, make_config(verbosity, false))?;
    to_json(&scheduler.schedule_forward(anchor)?)
}

/// ALAP schedule finishing on `deadline`.
#[pyfunction]
#[pyo3(name = "schedule_from_deadline", signature = (tasks, resources, deadline, verbosity=0))]
fn py_schedule_from_deadline(
    tasks: Vec<PyTask>,
    resources: Vec<PyResource>,
    deadline: NaiveDate,
    verbosity: u8,
) -> PyResult<String> {
    let (tasks, resources) = convert(tasks, resources);
    let scheduler = ResourceScheduler::new(&tasks, &resources, make_config(verbosity, false))?;
    to_json(&scheduler.schedule_from_deadline(deadline)?)
}

/// Schedule from `anchor` and level overallocated resources within slack.
#[pyfunction]
#[pyo3(name = "level_resources", signature = (tasks, resources, anchor, verbosity=0, cursor_baseline=false))]
fn py_level_resources(
    tasks: Vec<PyTask>,
    resources: Vec<PyResource>,
    anchor: NaiveDate,
    verbosity: u8,
    cursor_baseline: bool,
) -> PyResult<String> {
    let (tasks, resources) = convert(tasks, resources);
    let config = make_config(verbosity, cursor_baseline);
    to_json(&crate::leveling::level_resources(
        &tasks, &resources, anchor, &config,
    )?)
}

/// Collect every validation issue as `(kind, message)` pairs.
#[pyfunction]
#[pyo3(name = "validate_project")]
fn py_validate_project(
    tasks: Vec<PyTask>,
    resources: Vec<PyResource>,
) -> Vec<(String, String)> {
    let (tasks, resources) = convert(tasks, resources);
    match crate::validation::validate_project(&tasks, &resources) {
        Ok(()) => Vec::new(),
        Err(issues) => issues
            .into_iter()
            .map(|issue| (format!("{:?}", issue.kind), issue.message))
            .collect(),
    }
}

#[pymodule]
fn pertnet(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Input types
    m.add_class::<PyTask>()?;
    m.add_class::<PyResource>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_analyze_network, m)?)?;
    m.add_function(wrap_pyfunction!(py_schedule_forward, m)?)?;
    m.add_function(wrap_pyfunction!(py_schedule_from_deadline, m)?)?;
    m.add_function(wrap_pyfunction!(py_level_resources, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate_project, m)?)?;

    Ok(())
}

//! Critical Path Method scheduling core for timeline charts.
//!
//! Pure functions over a task list and a dependency list: graph building,
//! cycle detection, topological ordering, CPM forward/backward passes, float
//! and critical path extraction, and structural validation. Every call
//! recomputes from its inputs and returns a fresh result.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

pub mod baseline;
mod config;
pub mod critical_path;
pub mod graph;
mod interner;
pub mod logging;
mod models;
pub mod resources;
pub mod topology;
pub mod validation;

pub use baseline::{baseline_variance, BaselineVariance};
pub use config::{CycleScope, ScheduleConfig, ValidationConfig};
pub use critical_path::{
    schedule, schedule_checked, Propagation, ScheduleError, ScheduleResult, TaskSchedule,
};
pub use graph::{DependencyGraph, Edge, PredecessorGraph};
pub use interner::{TaskIdInterner, TaskSlot};
pub use models::{ConstraintType, Dependency, DependencyType, ModelError, Resource, Task, TaskType};
pub use resources::{resource_utilization, ResourceUtilization, UtilizationReport};
pub use topology::{detect_cycles, topological_sort};
pub use validation::{validate, Diagnostic, ValidationCode, ValidationResult};

/// Run CPM over tasks and explicit dependencies.
///
/// Always returns a result; on cyclic input some tasks carry fallback dates.
/// Run `validate` first before presenting the critical path.
#[pyfunction]
#[pyo3(name = "schedule", signature = (tasks, dependencies=Vec::new(), config=None))]
fn py_schedule(
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    config: Option<ScheduleConfig>,
) -> ScheduleResult {
    schedule(&tasks, &dependencies, &config.unwrap_or_default())
}

/// Validate, then run CPM.
///
/// # Raises
/// * ValueError if validation reports errors or the dependency graph has a cycle
#[pyfunction]
#[pyo3(name = "schedule_checked", signature = (tasks, dependencies=Vec::new(), config=None))]
fn py_schedule_checked(
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    config: Option<ScheduleConfig>,
) -> PyResult<ScheduleResult> {
    Ok(schedule_checked(
        &tasks,
        &dependencies,
        &config.unwrap_or_default(),
    )?)
}

/// Structural validation; never raises on malformed tasks.
#[pyfunction]
#[pyo3(name = "validate", signature = (tasks, dependencies=Vec::new(), config=None))]
fn py_validate(
    tasks: Vec<Task>,
    dependencies: Vec<Dependency>,
    config: Option<ValidationConfig>,
) -> ValidationResult {
    validate(&tasks, &dependencies, &config.unwrap_or_default())
}

/// Cycles among the tasks' predecessor-id lists.
#[pyfunction]
#[pyo3(name = "detect_cycles")]
fn py_detect_cycles(tasks: Vec<Task>) -> Vec<Vec<String>> {
    detect_cycles(&tasks)
}

/// Task ids with predecessors first, or None if the predecessor lists are cyclic.
#[pyfunction]
#[pyo3(name = "topological_sort")]
fn py_topological_sort(tasks: Vec<Task>) -> Option<Vec<String>> {
    topological_sort(&tasks)
}

#[pyfunction]
#[pyo3(name = "resource_utilization")]
fn py_resource_utilization(tasks: Vec<Task>, resources: Vec<Resource>) -> UtilizationReport {
    resource_utilization(&tasks, &resources)
}

#[pyfunction]
#[pyo3(name = "baseline_variance")]
fn py_baseline_variance(tasks: Vec<Task>) -> Vec<BaselineVariance> {
    baseline_variance(&tasks)
}

/// The `cpm` Python module.
#[pymodule]
fn cpm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Model types
    m.add_class::<Task>()?;
    m.add_class::<Dependency>()?;
    m.add_class::<Resource>()?;

    // Config types
    m.add_class::<ScheduleConfig>()?;
    m.add_class::<ValidationConfig>()?;

    // Result types
    m.add_class::<TaskSchedule>()?;
    m.add_class::<ScheduleResult>()?;
    m.add_class::<Diagnostic>()?;
    m.add_class::<ValidationResult>()?;
    m.add_class::<ResourceUtilization>()?;
    m.add_class::<UtilizationReport>()?;
    m.add_class::<BaselineVariance>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(py_schedule, m)?)?;
    m.add_function(wrap_pyfunction!(py_schedule_checked, m)?)?;
    m.add_function(wrap_pyfunction!(py_validate, m)?)?;
    m.add_function(wrap_pyfunction!(py_detect_cycles, m)?)?;
    m.add_function(wrap_pyfunction!(py_topological_sort, m)?)?;
    m.add_function(wrap_pyfunction!(py_resource_utilization, m)?)?;
    m.add_function(wrap_pyfunction!(py_baseline_variance, m)?)?;

    Ok(())
}

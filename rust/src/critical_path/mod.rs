//! Critical Path Method scheduling.
//!
//! A forward pass computes early dates, a backward pass from the project end
//! computes late dates, and float falls out of the difference. Tasks with zero
//! total float form the critical path.
//!
//! [`schedule`] is total: it accepts any input and terminates on cyclic graphs,
//! but its numbers are only meaningful for a validated acyclic task set.
//! [`schedule_checked`] validates first and refuses invalid input.

mod calculation;
mod float;
mod types;

use thiserror::Error;

use crate::config::ScheduleConfig;
use crate::graph::DependencyGraph;
use crate::models::{Dependency, Task};
use crate::validation::{validate, Diagnostic, ValidationCode};
use crate::log_changes;

use calculation::{backward_pass, forward_pass, SlotData};

pub use types::{Propagation, ScheduleResult, TaskSchedule};

/// Reasons the checked entry point declines to schedule.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Invalid task set: {}", summarize(.errors))]
    InvalidInput { errors: Vec<Diagnostic> },
    #[error("Circular dependency detected: {}", format_cycles(.cycles))]
    CircularDependency { cycles: Vec<Vec<String>> },
}

fn summarize(errors: &[Diagnostic]) -> String {
    errors
        .iter()
        .map(|d| d.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|c| c.join(" → "))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ScheduleError> for pyo3::PyErr {
    fn from(err: ScheduleError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Run CPM over the merged dependency graph.
///
/// # Arguments
/// * `tasks` - Tasks in display order; the first occurrence of a duplicate id wins
/// * `dependencies` - Explicit typed dependencies; edges to unknown tasks are dropped
/// * `config` - Verbosity for logging
pub fn schedule(tasks: &[Task], dependencies: &[Dependency], config: &ScheduleConfig) -> ScheduleResult {
    let verbosity = config.verbosity;
    let graph = DependencyGraph::build(tasks, dependencies);
    if graph.is_empty() {
        return ScheduleResult::default();
    }
    log_changes!(
        verbosity,
        "Scheduling {} tasks over {} dependency edges ({} dropped)",
        graph.len(),
        graph.edge_count(),
        graph.dropped_edges()
    );

    let data = SlotData::new(&graph, tasks);
    let forward = forward_pass(&graph, &data, verbosity);

    let project_end = forward.early_finish.iter().copied().max();
    let project_start = tasks
        .iter()
        .flat_map(|t| std::iter::once(t.start).chain(t.baseline_start))
        .min();

    // Non-empty graph, so there is at least one early finish.
    let Some(end) = project_end else {
        return ScheduleResult::default();
    };
    let backward = backward_pass(&graph, &data, end, verbosity);
    let result = float::extract(&graph, &forward, &backward, project_start, project_end);

    log_changes!(
        verbosity,
        "Project end {}, {} critical tasks",
        end,
        result.critical_path.len()
    );
    let negative = result.negative_float();
    if !negative.is_empty() {
        log_changes!(verbosity, "Negative float (over-constrained): {:?}", negative);
    }

    result
}

/// Validate, confirm the typed graph is acyclic, then run CPM.
///
/// # Returns
/// * `Err(ScheduleError::CircularDependency)` if every validation error is a cycle,
///   or the typed graph has a cycle validation did not look at
/// * `Err(ScheduleError::InvalidInput)` for any other validation error
pub fn schedule_checked(
    tasks: &[Task],
    dependencies: &[Dependency],
    config: &ScheduleConfig,
) -> Result<ScheduleResult, ScheduleError> {
    let validation = validate(tasks, dependencies, &config.validation);
    if !validation.is_valid() {
        let only_cycles = validation
            .errors
            .iter()
            .all(|d| d.code == ValidationCode::CircularDependency);
        if !only_cycles {
            return Err(ScheduleError::InvalidInput {
                errors: validation.errors,
            });
        }
    }

    let graph = DependencyGraph::build(tasks, dependencies);
    if graph.topological_order().is_none() {
        return Err(ScheduleError::CircularDependency {
            cycles: graph.find_cycles(),
        });
    }

    Ok(schedule(tasks, dependencies, config))
}

//! Result types for critical path scheduling.

use chrono::{Duration, NaiveDateTime};
use pyo3::prelude::*;
use std::collections::HashMap;

/// How a pass arrived at a task's dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Propagation {
    /// Reached through the dependency queue; dates honour every edge.
    #[default]
    Propagated,
    /// Never released by the queue (a cycle upstream or downstream), so the
    /// pass fell back to the task's declared dates (forward) or the project
    /// end (backward).
    Fallback,
}

impl Propagation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Propagated => "propagated",
            Self::Fallback => "fallback",
        }
    }
}

/// Per-task CPM output.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct TaskSchedule {
    #[pyo3(get)]
    pub early_start: NaiveDateTime,
    #[pyo3(get)]
    pub early_finish: NaiveDateTime,
    #[pyo3(get)]
    pub late_start: NaiveDateTime,
    #[pyo3(get)]
    pub late_finish: NaiveDateTime,
    /// `late_start - early_start`, exact.
    #[pyo3(get)]
    pub total_float_duration: Duration,
    /// Total float in whole days, rounded down, so any shortfall reads as at
    /// least one day negative.
    #[pyo3(get)]
    pub total_float: i64,
    /// Days this task can slip without moving any successor's early dates.
    #[pyo3(get)]
    pub free_float: i64,
    #[pyo3(get)]
    pub is_critical: bool,
    pub forward: Propagation,
    pub backward: Propagation,
}

impl TaskSchedule {
    /// True when both passes reached the task through its dependencies.
    pub fn was_constrained(&self) -> bool {
        self.forward == Propagation::Propagated && self.backward == Propagation::Propagated
    }
}

#[pymethods]
impl TaskSchedule {
    #[getter(forward)]
    fn py_forward(&self) -> &'static str {
        self.forward.as_str()
    }

    #[getter(backward)]
    fn py_backward(&self) -> &'static str {
        self.backward.as_str()
    }

    #[pyo3(name = "was_constrained")]
    fn py_was_constrained(&self) -> bool {
        self.was_constrained()
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskSchedule(es={}, ef={}, ls={}, lf={}, total_float={}, critical={})",
            self.early_start,
            self.early_finish,
            self.late_start,
            self.late_finish,
            self.total_float,
            self.is_critical
        )
    }
}

/// Output of one scheduling run. Built fresh per call and never mutated.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScheduleResult {
    #[pyo3(get)]
    pub schedules: HashMap<String, TaskSchedule>,
    /// Critical task ids by early start, ties in input order.
    #[pyo3(get)]
    pub critical_path: Vec<String>,
    /// Earliest declared or baseline start. `None` for an empty task list.
    #[pyo3(get)]
    pub project_start: Option<NaiveDateTime>,
    /// Latest early finish. `None` for an empty task list.
    #[pyo3(get)]
    pub project_end: Option<NaiveDateTime>,
    #[pyo3(get)]
    pub project_duration_days: i64,
    /// Scheduled task ids in input order.
    pub(crate) task_order: Vec<String>,
}

impl ScheduleResult {
    pub fn get(&self, task_id: &str) -> Option<&TaskSchedule> {
        self.schedules.get(task_id)
    }

    /// Tasks whose total float is negative, in input order.
    pub fn negative_float(&self) -> Vec<String> {
        self.filter_ids(|s| s.total_float_duration < Duration::zero())
    }

    /// False when some constraint cannot be met by the current plan.
    pub fn is_feasible(&self) -> bool {
        self.schedules
            .values()
            .all(|s| s.total_float_duration >= Duration::zero())
    }

    /// Tasks for which either pass used its fallback dates, in input order.
    pub fn fallback_task_ids(&self) -> Vec<String> {
        self.filter_ids(|s| !s.was_constrained())
    }

    fn filter_ids(&self, pred: impl Fn(&TaskSchedule) -> bool) -> Vec<String> {
        self.task_order
            .iter()
            .filter(|id| self.schedules.get(id.as_str()).is_some_and(&pred))
            .cloned()
            .collect()
    }
}

#[pymethods]
impl ScheduleResult {
    #[pyo3(name = "negative_float")]
    fn py_negative_float(&self) -> Vec<String> {
        self.negative_float()
    }

    #[pyo3(name = "is_feasible")]
    fn py_is_feasible(&self) -> bool {
        self.is_feasible()
    }

    #[pyo3(name = "fallback_task_ids")]
    fn py_fallback_task_ids(&self) -> Vec<String> {
        self.fallback_task_ids()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(tasks={}, critical_path={:?}, duration_days={})",
            self.schedules.len(),
            self.critical_path,
            self.project_duration_days
        )
    }
}

//! Baseline variance: how far each task's current dates drifted from its baseline.

use pyo3::prelude::*;

use crate::models::Task;

/// Drift of one task against its baseline. Positive days mean later than planned.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaselineVariance {
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub start_variance_days: i64,
    #[pyo3(get)]
    pub finish_variance_days: i64,
    /// Finishes later than the baseline finish.
    #[pyo3(get)]
    pub slipped: bool,
}

#[pymethods]
impl BaselineVariance {
    fn __repr__(&self) -> String {
        format!(
            "BaselineVariance(task_id={:?}, start={:+}d, finish={:+}d)",
            self.task_id, self.start_variance_days, self.finish_variance_days
        )
    }
}

/// Variance for every task carrying both baseline dates, in input order.
pub fn baseline_variance(tasks: &[Task]) -> Vec<BaselineVariance> {
    tasks
        .iter()
        .filter_map(|task| {
            let (baseline_start, baseline_end) = task.baseline_start.zip(task.baseline_end)?;
            let finish_variance_days = (task.end - baseline_end).num_days();
            Some(BaselineVariance {
                task_id: task.id.clone(),
                start_variance_days: (task.start - baseline_start).num_days(),
                finish_variance_days,
                slipped: finish_variance_days > 0,
            })
        })
        .collect()
}

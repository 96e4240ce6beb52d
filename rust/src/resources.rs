//! Resource utilization reporting over declared task dates.
//!
//! Read-only analysis: nothing here moves a task. Busy time is the union of
//! each resource's assigned `[start, end)` intervals.

use chrono::{Duration, NaiveDateTime};
use pyo3::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::models::{Resource, Task};

/// Usage summary for one resource.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceUtilization {
    #[pyo3(get)]
    pub resource_id: String,
    #[pyo3(get)]
    pub task_ids: Vec<String>,
    /// Whole days covered by at least one assigned task.
    #[pyo3(get)]
    pub busy_days: i64,
    /// Most tasks assigned at the same instant.
    #[pyo3(get)]
    pub peak_concurrency: u32,
    #[pyo3(get)]
    pub capacity: u32,
    #[pyo3(get)]
    pub over_allocated: bool,
    /// Busy time over the project span, in `[0, 1]`.
    #[pyo3(get)]
    pub utilization: f64,
}

#[pymethods]
impl ResourceUtilization {
    fn __repr__(&self) -> String {
        format!(
            "ResourceUtilization(resource_id={:?}, tasks={}, peak={}/{}, utilization={:.2})",
            self.resource_id,
            self.task_ids.len(),
            self.peak_concurrency,
            self.capacity,
            self.utilization
        )
    }
}

/// Utilization for every declared resource.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UtilizationReport {
    /// One entry per resource, in the order resources were given.
    #[pyo3(get)]
    pub resources: Vec<ResourceUtilization>,
    /// Resource ids tasks reference that no declared resource matches.
    #[pyo3(get)]
    pub unassigned_resource_ids: Vec<String>,
}

impl UtilizationReport {
    pub fn get(&self, resource_id: &str) -> Option<&ResourceUtilization> {
        self.resources.iter().find(|r| r.resource_id == resource_id)
    }

    pub fn over_allocated(&self) -> impl Iterator<Item = &ResourceUtilization> {
        self.resources.iter().filter(|r| r.over_allocated)
    }
}

#[pymethods]
impl UtilizationReport {
    fn __repr__(&self) -> String {
        format!(
            "UtilizationReport(resources={}, unassigned={:?})",
            self.resources.len(),
            self.unassigned_resource_ids
        )
    }
}

/// Merge intervals into a sorted, non-overlapping list. Touching intervals merge.
fn merge_periods(
    mut periods: Vec<(NaiveDateTime, NaiveDateTime)>,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    periods.sort_by_key(|(start, _)| *start);
    let mut merged: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::with_capacity(periods.len());
    for (start, end) in periods {
        if let Some((_, last_end)) = merged.last_mut() {
            if start <= *last_end {
                *last_end = (*last_end).max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// Maximum number of simultaneously open intervals.
fn peak_overlap(periods: &[(NaiveDateTime, NaiveDateTime)]) -> u32 {
    // Ends sort before starts at the same instant: [a, b) and [b, c) don't overlap.
    let mut events: Vec<(NaiveDateTime, i32)> = periods
        .iter()
        .flat_map(|&(start, end)| [(start, 1), (end, -1)])
        .collect();
    events.sort();

    let mut open = 0i32;
    let mut peak = 0i32;
    for (_, delta) in events {
        open += delta;
        peak = peak.max(open);
    }
    peak as u32
}

/// Report how each resource is loaded by the tasks assigned to it.
///
/// Utilization is measured against the span from the earliest task start to the
/// latest task end across the whole task set.
pub fn resource_utilization(tasks: &[Task], resources: &[Resource]) -> UtilizationReport {
    let declared: FxHashSet<&str> = resources.iter().map(|r| r.id.as_str()).collect();
    let mut assigned: FxHashMap<&str, Vec<&Task>> = FxHashMap::default();
    let mut unknown: Vec<String> = Vec::new();

    for task in tasks {
        let Some(resource_id) = task.resource_id.as_deref() else {
            continue;
        };
        if declared.contains(resource_id) {
            assigned.entry(resource_id).or_default().push(task);
        } else if !unknown.iter().any(|u| u == resource_id) {
            unknown.push(resource_id.to_string());
        }
    }

    let span = match (
        tasks.iter().map(|t| t.start).min(),
        tasks.iter().map(|t| t.end).max(),
    ) {
        (Some(start), Some(end)) if end > start => end - start,
        _ => Duration::zero(),
    };

    let report = resources
        .iter()
        .map(|resource| {
            let assigned = assigned.get(resource.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let periods: Vec<(NaiveDateTime, NaiveDateTime)> = assigned
                .iter()
                .filter(|t| t.end > t.start)
                .map(|t| (t.start, t.end))
                .collect();
            let peak = peak_overlap(&periods);
            let busy: Duration = merge_periods(periods)
                .into_iter()
                .map(|(start, end)| end - start)
                .fold(Duration::zero(), |acc, d| acc + d);
            let utilization = if span > Duration::zero() {
                busy.num_seconds() as f64 / span.num_seconds() as f64
            } else {
                0.0
            };

            ResourceUtilization {
                resource_id: resource.id.clone(),
                task_ids: assigned.iter().map(|t| t.id.clone()).collect(),
                busy_days: busy.num_days(),
                peak_concurrency: peak,
                capacity: resource.capacity,
                over_allocated: peak > resource.capacity,
                utilization,
            }
        })
        .collect();

    UtilizationReport {
        resources: report,
        unassigned_resource_ids: unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(d)
    }

    fn assigned(id: &str, start: i64, end: i64, resource: &str) -> Task {
        Task::new(id, id, at(start), at(end)).with_resource(resource)
    }

    #[test]
    fn test_merge_periods() {
        let merged = merge_periods(vec![(at(5), at(8)), (at(0), at(3)), (at(3), at(4)), (at(6), at(10))]);
        assert_eq!(merged, vec![(at(0), at(4)), (at(5), at(10))]);
    }

    #[test]
    fn test_back_to_back_tasks_do_not_overlap() {
        assert_eq!(peak_overlap(&[(at(0), at(3)), (at(3), at(6))]), 1);
        assert_eq!(peak_overlap(&[(at(0), at(4)), (at(3), at(6)), (at(2), at(5))]), 3);
        assert_eq!(peak_overlap(&[]), 0);
    }

    #[test]
    fn test_over_allocation_and_utilization() {
        let tasks = vec![
            assigned("a", 0, 4, "dev"),
            assigned("b", 2, 6, "dev"),
            assigned("c", 0, 10, "qa"),
            assigned("d", 1, 2, "ops"),
        ];
        let resources = vec![Resource::new("dev", "Developers", 1), Resource::new("qa", "QA", 1)];
        let report = resource_utilization(&tasks, &resources);

        let dev = report.get("dev").unwrap();
        assert_eq!(dev.task_ids, vec!["a", "b"]);
        assert_eq!(dev.busy_days, 6);
        assert_eq!(dev.peak_concurrency, 2);
        assert!(dev.over_allocated);
        assert!((dev.utilization - 0.6).abs() < 1e-9);

        let qa = report.get("qa").unwrap();
        assert!(!qa.over_allocated);
        assert!((qa.utilization - 1.0).abs() < 1e-9);

        assert_eq!(report.unassigned_resource_ids, vec!["ops"]);
        assert_eq!(report.over_allocated().count(), 1);
    }

    #[test]
    fn test_idle_resource() {
        let tasks = vec![Task::new("a", "a", at(0), at(3))];
        let report = resource_utilization(&tasks, &[Resource::new("r", "Idle", 2)]);
        let r = report.get("r").unwrap();
        assert!(r.task_ids.is_empty());
        assert_eq!(r.busy_days, 0);
        assert_eq!(r.utilization, 0.0);
    }
}

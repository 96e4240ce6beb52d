//! Structural validation of a task set.
//!
//! Runs independently of CPM and never fails: every problem is reported as a
//! [`Diagnostic`]. Errors make the set invalid; warnings are advisory.
//! Detects:
//! - empty and duplicate task ids
//! - end before start (non-milestones), progress outside `[0, 1]`
//! - dependencies naming unknown tasks
//! - circular dependencies

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use rustc_hash::FxHashSet;
use std::fmt;

use crate::config::{CycleScope, ValidationConfig};
use crate::graph::DependencyGraph;
use crate::models::{Dependency, Task};
use crate::topology::detect_cycles;

/// Machine-readable diagnostic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    // Errors
    EmptyTaskId,
    DuplicateTaskId,
    InvalidDateRange,
    InvalidProgress,
    MissingDependency,
    CircularDependency,
    // Warnings
    ZeroDuration,
    CompletedInFuture,
    EmptyLabel,
    MissingParent,
    MissingConstraintDate,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyTaskId => "emptyTaskId",
            Self::DuplicateTaskId => "duplicateTaskId",
            Self::InvalidDateRange => "invalidDateRange",
            Self::InvalidProgress => "invalidProgress",
            Self::MissingDependency => "missingDependency",
            Self::CircularDependency => "circularDependency",
            Self::ZeroDuration => "zeroDuration",
            Self::CompletedInFuture => "completedInFuture",
            Self::EmptyLabel => "emptyLabel",
            Self::MissingParent => "missingParent",
            Self::MissingConstraintDate => "missingConstraintDate",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding about one task.
#[pyclass]
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: ValidationCode,
    #[pyo3(get)]
    pub task_id: String,
    #[pyo3(get)]
    pub message: String,
}

impl Diagnostic {
    fn new(code: ValidationCode, task_id: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            task_id: task_id.to_string(),
            message: message.into(),
        }
    }
}

#[pymethods]
impl Diagnostic {
    #[getter(code)]
    fn py_code(&self) -> &'static str {
        self.code.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "Diagnostic(code={}, task_id={:?}, message={:?})",
            self.code, self.task_id, self.message
        )
    }
}

/// Errors and warnings from one validation call.
#[pyclass]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    #[pyo3(get)]
    pub errors: Vec<Diagnostic>,
    #[pyo3(get)]
    pub warnings: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Valid iff there are no errors; warnings never affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_with(&self, code: ValidationCode) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().filter(move |d| d.code == code)
    }

    pub fn warnings_with(&self, code: ValidationCode) -> impl Iterator<Item = &Diagnostic> {
        self.warnings.iter().filter(move |d| d.code == code)
    }

    fn error(&mut self, code: ValidationCode, task_id: &str, message: impl Into<String>) {
        self.errors.push(Diagnostic::new(code, task_id, message));
    }

    fn warning(&mut self, code: ValidationCode, task_id: &str, message: impl Into<String>) {
        self.warnings.push(Diagnostic::new(code, task_id, message));
    }
}

#[pymethods]
impl ValidationResult {
    #[getter(is_valid)]
    fn py_is_valid(&self) -> bool {
        self.is_valid()
    }

    fn __repr__(&self) -> String {
        format!(
            "ValidationResult(errors={}, warnings={})",
            self.errors.len(),
            self.warnings.len()
        )
    }
}

/// Validate a task set and its explicit dependencies.
///
/// Checks, per task:
/// 1. Non-empty id (otherwise the task is skipped)
/// 2. Id not seen before (otherwise the repeat is skipped)
/// 3. End not before start, unless a milestone
/// 4. Progress within `[0, 1]`
/// 5. Every predecessor id names an existing task
///
/// Then explicit dependency endpoints, then one error per dependency cycle.
pub fn validate(
    tasks: &[Task],
    dependencies: &[Dependency],
    config: &ValidationConfig,
) -> ValidationResult {
    let mut result = ValidationResult::default();
    let now = config.reference_time();
    let known: FxHashSet<&str> = tasks
        .iter()
        .filter(|t| !t.id.is_empty())
        .map(|t| t.id.as_str())
        .collect();
    let mut seen: FxHashSet<&str> = FxHashSet::default();

    for (index, task) in tasks.iter().enumerate() {
        if task.id.is_empty() {
            result.error(
                ValidationCode::EmptyTaskId,
                "",
                format!("Task at position {} has an empty id", index),
            );
            continue;
        }
        if !seen.insert(task.id.as_str()) {
            result.error(
                ValidationCode::DuplicateTaskId,
                &task.id,
                format!("Duplicate task id '{}' at position {}", task.id, index),
            );
            continue;
        }
        check_task(task, &known, now, &mut result);
    }

    for dep in dependencies {
        for endpoint in [&dep.from_task_id, &dep.to_task_id] {
            if !known.contains(endpoint.as_str()) {
                result.error(
                    ValidationCode::MissingDependency,
                    &dep.to_task_id,
                    format!(
                        "Dependency {} -> {} references unknown task '{}'",
                        dep.from_task_id, dep.to_task_id, endpoint
                    ),
                );
            }
        }
    }

    let cycles = match config.cycle_scope {
        CycleScope::SimplePredecessors => detect_cycles(tasks),
        CycleScope::AllDependencies => DependencyGraph::build(tasks, dependencies).find_cycles(),
    };
    for cycle in cycles {
        let first = cycle.first().cloned().unwrap_or_default();
        result.error(
            ValidationCode::CircularDependency,
            &first,
            format!("Circular dependency: {}", cycle.join(" → ")),
        );
    }

    result
}

fn check_task(task: &Task, known: &FxHashSet<&str>, now: NaiveDateTime, result: &mut ValidationResult) {
    let id = task.id.as_str();

    if task.end < task.start && !task.is_milestone() {
        result.error(
            ValidationCode::InvalidDateRange,
            id,
            format!("Task '{}' ends ({}) before it starts ({})", id, task.end, task.start),
        );
    }

    if !(0.0..=1.0).contains(&task.progress) {
        result.error(
            ValidationCode::InvalidProgress,
            id,
            format!("Task '{}' has progress {} outside [0, 1]", id, task.progress),
        );
    }

    for pred in &task.dependencies {
        if !known.contains(pred.as_str()) {
            result.error(
                ValidationCode::MissingDependency,
                id,
                format!("Task '{}' depends on unknown task '{}'", id, pred),
            );
        }
    }

    if task.end == task.start && !task.is_milestone() {
        result.warning(
            ValidationCode::ZeroDuration,
            id,
            format!("Task '{}' has zero duration but is not a milestone", id),
        );
    }

    if task.progress >= 1.0 && task.end > now {
        result.warning(
            ValidationCode::CompletedInFuture,
            id,
            format!("Task '{}' is complete but ends in the future ({})", id, task.end),
        );
    }

    if task.label.trim().is_empty() {
        result.warning(
            ValidationCode::EmptyLabel,
            id,
            format!("Task '{}' has an empty label", id),
        );
    }

    if let Some(parent) = &task.parent_id {
        if !known.contains(parent.as_str()) {
            result.warning(
                ValidationCode::MissingParent,
                id,
                format!("Task '{}' has unknown parent '{}'", id, parent),
            );
        }
    }

    if let Some(constraint) = task.constraint_type {
        if constraint.requires_date() && task.constraint_date.is_none() {
            result.warning(
                ValidationCode::MissingConstraintDate,
                id,
                format!(
                    "Task '{}' has constraint '{}' without a date",
                    id,
                    constraint.as_str()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConstraintType, TaskType};
    use chrono::{Duration, NaiveDate};

    fn at(d: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(d)
    }

    fn make_task(id: &str, start: i64, end: i64, deps: &[&str]) -> Task {
        Task::new(id, &format!("Task {}", id), at(start), at(end))
            .with_dependencies(deps.iter().copied())
    }

    fn config() -> ValidationConfig {
        ValidationConfig::at(at(100))
    }

    #[test]
    fn test_single_valid_task() {
        let tasks = vec![make_task("t1", 0, 5, &[]).with_progress(0.5)];
        let result = validate(&tasks, &[], &config());

        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert!(result.is_valid());
    }

    #[test]
    fn test_duplicate_id_reported_once() {
        let tasks = vec![
            make_task("t1", 0, 5, &[]).with_progress(1.5),
            make_task("t1", 0, 5, &[]),
        ];
        let result = validate(&tasks, &[], &config());

        let dups: Vec<_> = result.errors_with(ValidationCode::DuplicateTaskId).collect();
        assert_eq!(dups.len(), 1);
        assert!(dups[0].message.contains("position 1"));
        // First occurrence still checked
        assert_eq!(result.errors_with(ValidationCode::InvalidProgress).count(), 1);
    }

    #[test]
    fn test_empty_id_skips_other_checks() {
        let tasks = vec![Task::new("", "", at(5), at(1)).with_progress(2.0)];
        let result = validate(&tasks, &[], &config());

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, ValidationCode::EmptyTaskId);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_bad_range_and_progress_together() {
        let tasks = vec![make_task("a", 5, 2, &[]).with_progress(1.5)];
        let result = validate(&tasks, &[], &config());

        assert_eq!(result.errors_with(ValidationCode::InvalidDateRange).count(), 1);
        assert_eq!(result.errors_with(ValidationCode::InvalidProgress).count(), 1);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_milestone_may_end_before_start() {
        let tasks = vec![make_task("m", 5, 2, &[]).with_type(TaskType::Milestone)];
        let result = validate(&tasks, &[], &config());
        assert!(result.is_valid());
    }

    #[test]
    fn test_nan_progress_is_invalid() {
        let tasks = vec![make_task("a", 0, 2, &[]).with_progress(f64::NAN)];
        let result = validate(&tasks, &[], &config());
        assert_eq!(result.errors_with(ValidationCode::InvalidProgress).count(), 1);
    }

    #[test]
    fn test_missing_dependencies() {
        let tasks = vec![make_task("a", 0, 2, &["x", "y"])];
        let deps = vec![Dependency::finish_to_start("ghost", "a")];
        let result = validate(&tasks, &deps, &config());

        assert_eq!(result.errors_with(ValidationCode::MissingDependency).count(), 3);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let tasks = vec![
            make_task("zero", 3, 3, &[]),
            make_task("done", 0, 200, &[]).with_progress(1.0),
            Task::new("blank", "  ", at(0), at(1)),
            make_task("child", 0, 1, &[]).with_parent("nobody", 1),
            make_task("snet", 0, 1, &[]).with_constraint(ConstraintType::StartNoEarlierThan, None),
        ];
        let result = validate(&tasks, &[], &config());

        assert!(result.is_valid());
        assert_eq!(result.warnings_with(ValidationCode::ZeroDuration).count(), 1);
        assert_eq!(result.warnings_with(ValidationCode::CompletedInFuture).count(), 1);
        assert_eq!(result.warnings_with(ValidationCode::EmptyLabel).count(), 1);
        assert_eq!(result.warnings_with(ValidationCode::MissingParent).count(), 1);
        assert_eq!(
            result
                .warnings_with(ValidationCode::MissingConstraintDate)
                .count(),
            1
        );
    }

    #[test]
    fn test_completed_in_past_is_fine() {
        let tasks = vec![make_task("done", 0, 10, &[]).with_progress(1.0)];
        let result = validate(&tasks, &[], &config());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_cycle_reported_with_path() {
        let tasks = vec![
            make_task("a", 0, 1, &["b"]),
            make_task("b", 0, 1, &["c"]),
            make_task("c", 0, 1, &["a"]),
        ];
        let result = validate(&tasks, &[], &config());

        let cycles: Vec<_> = result.errors_with(ValidationCode::CircularDependency).collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].message, "Circular dependency: a → b → c");
    }

    #[test]
    fn test_cycle_scope() {
        let tasks = vec![make_task("a", 0, 1, &[]), make_task("b", 0, 1, &["a"])];
        let deps = vec![Dependency::finish_to_start("b", "a")];

        let all = validate(&tasks, &deps, &config());
        assert_eq!(all.errors_with(ValidationCode::CircularDependency).count(), 1);

        let simple = ValidationConfig {
            cycle_scope: CycleScope::SimplePredecessors,
            ..config()
        };
        assert!(validate(&tasks, &deps, &simple).is_valid());
    }
}

//! Core data types for the scheduling system.

use chrono::{Duration, NaiveDateTime};
use pyo3::prelude::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when parsing model tags at the API boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),
    #[error("Unknown constraint type: {0}")]
    UnknownConstraintType(String),
    #[error("Unknown dependency type: {0}")]
    UnknownDependencyType(String),
}

impl From<ModelError> for PyErr {
    fn from(err: ModelError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Kind of timeline entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskType {
    #[default]
    Task,
    /// Zero-duration marker.
    Milestone,
    /// Grouping row over child tasks.
    Summary,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Milestone => "milestone",
            Self::Summary => "summary",
        }
    }
}

impl FromStr for TaskType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "milestone" => Ok(Self::Milestone),
            "summary" => Ok(Self::Summary),
            _ => Err(ModelError::UnknownTaskType(s.to_string())),
        }
    }
}

/// Scheduling constraint attached to a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    /// As soon as possible.
    #[default]
    Asap,
    /// As late as possible.
    Alap,
    MustStartOn,
    MustFinishOn,
    StartNoEarlierThan,
    StartNoLaterThan,
    FinishNoEarlierThan,
    FinishNoLaterThan,
}

impl ConstraintType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asap => "asap",
            Self::Alap => "alap",
            Self::MustStartOn => "mso",
            Self::MustFinishOn => "mfo",
            Self::StartNoEarlierThan => "snet",
            Self::StartNoLaterThan => "snlt",
            Self::FinishNoEarlierThan => "fnet",
            Self::FinishNoLaterThan => "fnlt",
        }
    }

    /// Whether this constraint is meaningless without a constraint date.
    pub fn requires_date(self) -> bool {
        !matches!(self, Self::Asap | Self::Alap)
    }
}

impl FromStr for ConstraintType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asap" => Ok(Self::Asap),
            "alap" => Ok(Self::Alap),
            "mso" | "must_start_on" => Ok(Self::MustStartOn),
            "mfo" | "must_finish_on" => Ok(Self::MustFinishOn),
            "snet" | "start_no_earlier_than" => Ok(Self::StartNoEarlierThan),
            "snlt" | "start_no_later_than" => Ok(Self::StartNoLaterThan),
            "fnet" | "finish_no_earlier_than" => Ok(Self::FinishNoEarlierThan),
            "fnlt" | "finish_no_later_than" => Ok(Self::FinishNoLaterThan),
            _ => Err(ModelError::UnknownConstraintType(s.to_string())),
        }
    }
}

/// Relationship between a predecessor and a successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DependencyType {
    /// Successor starts after predecessor finishes.
    #[default]
    FinishToStart,
    /// Successor starts after predecessor starts.
    StartToStart,
    /// Successor finishes after predecessor finishes.
    FinishToFinish,
    /// Successor finishes after predecessor starts.
    StartToFinish,
}

impl DependencyType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FinishToStart => "fs",
            Self::StartToStart => "ss",
            Self::FinishToFinish => "ff",
            Self::StartToFinish => "sf",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

impl FromStr for DependencyType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fs" | "finish_to_start" => Ok(Self::FinishToStart),
            "ss" | "start_to_start" => Ok(Self::StartToStart),
            "ff" | "finish_to_finish" => Ok(Self::FinishToFinish),
            "sf" | "start_to_finish" => Ok(Self::StartToFinish),
            _ => Err(ModelError::UnknownDependencyType(s.to_string())),
        }
    }
}

/// A typed dependency edge `from_task_id -> to_task_id` with lag (negative = lead).
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Dependency {
    #[pyo3(get, set)]
    pub from_task_id: String,
    #[pyo3(get, set)]
    pub to_task_id: String,
    pub kind: DependencyType,
    #[pyo3(get, set)]
    pub lag: Duration,
}

impl Dependency {
    pub fn new(from_task_id: &str, to_task_id: &str, kind: DependencyType, lag: Duration) -> Self {
        Self {
            from_task_id: from_task_id.to_string(),
            to_task_id: to_task_id.to_string(),
            kind,
            lag,
        }
    }

    /// Finish-to-start with zero lag, the relationship implied by a task's own predecessor list.
    pub fn finish_to_start(from_task_id: &str, to_task_id: &str) -> Self {
        Self::new(
            from_task_id,
            to_task_id,
            DependencyType::FinishToStart,
            Duration::zero(),
        )
    }
}

#[pymethods]
impl Dependency {
    #[new]
    #[pyo3(signature = (from_task_id, to_task_id, kind="fs", lag=Duration::zero()))]
    fn py_new(from_task_id: String, to_task_id: String, kind: &str, lag: Duration) -> PyResult<Self> {
        Ok(Self {
            from_task_id,
            to_task_id,
            kind: kind.parse()?,
            lag,
        })
    }

    #[getter(kind)]
    fn py_kind(&self) -> &'static str {
        self.kind.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency({:?} -> {:?}, kind={}, lag={})",
            self.from_task_id, self.to_task_id, self.kind, self.lag
        )
    }
}

/// A timeline task.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub label: String,
    #[pyo3(get, set)]
    pub start: NaiveDateTime,
    #[pyo3(get, set)]
    pub end: NaiveDateTime,
    /// Completion fraction, expected in `[0, 1]`.
    #[pyo3(get, set)]
    pub progress: f64,
    /// Simple predecessor ids (finish-to-start, zero lag).
    #[pyo3(get, set)]
    pub dependencies: Vec<String>,
    #[pyo3(get, set)]
    pub baseline_start: Option<NaiveDateTime>,
    #[pyo3(get, set)]
    pub baseline_end: Option<NaiveDateTime>,
    #[pyo3(get, set)]
    pub resource_id: Option<String>,
    #[pyo3(get, set)]
    pub parent_id: Option<String>,
    #[pyo3(get, set)]
    pub level: u32,
    pub task_type: TaskType,
    pub constraint_type: Option<ConstraintType>,
    #[pyo3(get, set)]
    pub constraint_date: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(id: &str, label: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            start,
            end,
            progress: 0.0,
            dependencies: Vec::new(),
            baseline_start: None,
            baseline_end: None,
            resource_id: None,
            parent_id: None,
            level: 0,
            task_type: TaskType::Task,
            constraint_type: None,
            constraint_date: None,
        }
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_dependencies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_baseline(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.baseline_start = Some(start);
        self.baseline_end = Some(end);
        self
    }

    pub fn with_resource(mut self, resource_id: &str) -> Self {
        self.resource_id = Some(resource_id.to_string());
        self
    }

    pub fn with_parent(mut self, parent_id: &str, level: u32) -> Self {
        self.parent_id = Some(parent_id.to_string());
        self.level = level;
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_constraint(mut self, constraint: ConstraintType, date: Option<NaiveDateTime>) -> Self {
        self.constraint_type = Some(constraint);
        self.constraint_date = date;
        self
    }

    /// `end - start`. Milestones are zero-duration by convention.
    pub fn duration(&self) -> Duration {
        if self.is_milestone() {
            Duration::zero()
        } else {
            self.end - self.start
        }
    }

    pub fn is_milestone(&self) -> bool {
        self.task_type == TaskType::Milestone
    }
}

#[pymethods]
impl Task {
    #[new]
    #[pyo3(signature = (
        id,
        label,
        start,
        end,
        progress=0.0,
        dependencies=Vec::new(),
        baseline_start=None,
        baseline_end=None,
        resource_id=None,
        parent_id=None,
        level=0,
        task_type="task",
        constraint_type=None,
        constraint_date=None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn py_new(
        id: String,
        label: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
        progress: f64,
        dependencies: Vec<String>,
        baseline_start: Option<NaiveDateTime>,
        baseline_end: Option<NaiveDateTime>,
        resource_id: Option<String>,
        parent_id: Option<String>,
        level: u32,
        task_type: &str,
        constraint_type: Option<&str>,
        constraint_date: Option<NaiveDateTime>,
    ) -> PyResult<Self> {
        Ok(Self {
            id,
            label,
            start,
            end,
            progress,
            dependencies,
            baseline_start,
            baseline_end,
            resource_id,
            parent_id,
            level,
            task_type: task_type.parse()?,
            constraint_type: constraint_type.map(str::parse).transpose()?,
            constraint_date,
        })
    }

    #[getter(task_type)]
    fn py_task_type(&self) -> &'static str {
        self.task_type.as_str()
    }

    #[getter(constraint_type)]
    fn py_constraint_type(&self) -> Option<&'static str> {
        self.constraint_type.map(ConstraintType::as_str)
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={:?}, start={}, end={}, type={}, deps={})",
            self.id,
            self.start,
            self.end,
            self.task_type.as_str(),
            self.dependencies.len()
        )
    }
}

/// A resource tasks can be assigned to.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    /// Maximum number of tasks the resource can carry at once.
    #[pyo3(get, set)]
    pub capacity: u32,
}

impl Resource {
    pub fn new(id: &str, name: &str, capacity: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            capacity: capacity.max(1),
        }
    }
}

#[pymethods]
impl Resource {
    #[new]
    #[pyo3(signature = (id, name, capacity=1))]
    fn py_new(id: String, name: String, capacity: u32) -> Self {
        Self::new(&id, &name, capacity)
    }

    fn __repr__(&self) -> String {
        format!(
            "Resource(id={:?}, name={:?}, capacity={})",
            self.id, self.name, self.capacity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_dependency_types() {
        assert_eq!("FS".parse::<DependencyType>(), Ok(DependencyType::FinishToStart));
        assert_eq!("ss".parse::<DependencyType>(), Ok(DependencyType::StartToStart));
        assert_eq!(
            "finish_to_finish".parse::<DependencyType>(),
            Ok(DependencyType::FinishToFinish)
        );
        assert_eq!("sf".parse::<DependencyType>(), Ok(DependencyType::StartToFinish));
        assert_eq!(
            "xx".parse::<DependencyType>(),
            Err(ModelError::UnknownDependencyType("xx".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_types() {
        assert_eq!("snet".parse::<ConstraintType>(), Ok(ConstraintType::StartNoEarlierThan));
        assert_eq!("MFO".parse::<ConstraintType>(), Ok(ConstraintType::MustFinishOn));
        assert!("later".parse::<ConstraintType>().is_err());
        assert!(!ConstraintType::Alap.requires_date());
        assert!(ConstraintType::FinishNoLaterThan.requires_date());
    }

    #[test]
    fn test_milestone_has_zero_duration() {
        let task = Task::new("m", "Launch", day(5), day(6)).with_type(TaskType::Milestone);
        assert_eq!(task.duration(), Duration::zero());

        let task = Task::new("t", "Build", day(1), day(6));
        assert_eq!(task.duration(), Duration::days(5));
    }

    #[test]
    fn test_resource_capacity_at_least_one() {
        assert_eq!(Resource::new("r", "Crew", 0).capacity, 1);
        assert_eq!(Resource::new("r", "Crew", 3).capacity, 3);
    }
}

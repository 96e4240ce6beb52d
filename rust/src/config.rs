//! Configuration types for scheduling and validation.

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use std::str::FromStr;

/// Which edges the validator's cycle check walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleScope {
    /// Only each task's own predecessor-id list.
    SimplePredecessors,
    /// The merged typed graph CPM consumes (explicit edges plus predecessor ids).
    #[default]
    AllDependencies,
}

impl CycleScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SimplePredecessors => "simple",
            Self::AllDependencies => "all",
        }
    }
}

impl FromStr for CycleScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(Self::SimplePredecessors),
            "all" => Ok(Self::AllDependencies),
            other => Err(format!("Unknown cycle scope: {}", other)),
        }
    }
}

/// Configuration for the structural validator.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ValidationConfig {
    /// "Now" for the completed-but-ends-in-future warning. `None` reads the clock.
    #[pyo3(get, set)]
    pub reference_time: Option<NaiveDateTime>,
    pub cycle_scope: CycleScope,
}

impl ValidationConfig {
    pub fn at(reference_time: NaiveDateTime) -> Self {
        Self {
            reference_time: Some(reference_time),
            ..Self::default()
        }
    }

    pub fn reference_time(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| chrono::Local::now().naive_local())
    }
}

#[pymethods]
impl ValidationConfig {
    #[new]
    #[pyo3(signature = (reference_time=None, cycle_scope="all"))]
    fn new(reference_time: Option<NaiveDateTime>, cycle_scope: &str) -> PyResult<Self> {
        let cycle_scope = cycle_scope
            .parse::<CycleScope>()
            .map_err(pyo3::exceptions::PyValueError::new_err)?;
        Ok(Self {
            reference_time,
            cycle_scope,
        })
    }

    #[getter(cycle_scope)]
    fn py_cycle_scope(&self) -> &'static str {
        self.cycle_scope.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "ValidationConfig(reference_time={:?}, cycle_scope={:?})",
            self.reference_time,
            self.cycle_scope.as_str()
        )
    }
}

/// Configuration for a scheduling run.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScheduleConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Used by the checked entry point before running CPM.
    #[pyo3(get, set)]
    pub validation: ValidationConfig,
}

#[pymethods]
impl ScheduleConfig {
    #[new]
    #[pyo3(signature = (verbosity=0, validation=None))]
    fn new(verbosity: u8, validation: Option<ValidationConfig>) -> Self {
        Self {
            verbosity,
            validation: validation.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!("ScheduleConfig(verbosity={})", self.verbosity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScheduleConfig::default();
        assert_eq!(config.verbosity, 0);
        assert_eq!(config.validation.cycle_scope, CycleScope::AllDependencies);
        assert!(config.validation.reference_time.is_none());
    }

    #[test]
    fn test_cycle_scope_parse() {
        assert_eq!("simple".parse::<CycleScope>(), Ok(CycleScope::SimplePredecessors));
        assert_eq!("all".parse::<CycleScope>(), Ok(CycleScope::AllDependencies));
        assert!("typed".parse::<CycleScope>().is_err());
    }
}

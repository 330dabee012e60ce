//! results::errors — result-assembly failures.

use std::path::PathBuf;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsError {
    /// Two outputs of one invocation resolve to the same path.
    DuplicateOutputPath(PathBuf),
}

impl std::error::Error for ResultsError {}

impl std::fmt::Display for ResultsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultsError::DuplicateOutputPath(path) => write!(
                f,
                "Output path '{}' is produced more than once; contrast names must be unique.",
                path.display()
            ),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<ResultsError> for PyErr {
    fn from(err: ResultsError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

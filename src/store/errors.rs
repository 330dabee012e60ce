//! store::errors — map persistence failures.

use std::path::PathBuf;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No map is stored under this path.
    NotFound(PathBuf),

    /// Filesystem failure.
    Io { path: PathBuf, message: String },

    /// Map could not be encoded or decoded.
    Encoding { path: PathBuf, message: String },

    /// The store's lock was poisoned by a panicking writer.
    Poisoned,

    /// A map value cannot be represented by the store's encoding.
    NonFinite { path: PathBuf, index: usize, value: f64 },

    /// Maps read together have different lengths.
    LengthMismatch { path: PathBuf, expected: usize, actual: usize },
}

impl std::error::Error for StoreError {}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(path) => write!(f, "No map stored at '{}'.", path.display()),
            StoreError::Io { path, message } => {
                write!(f, "I/O error at '{}': {message}", path.display())
            }
            StoreError::Encoding { path, message } => {
                write!(f, "Could not encode/decode map '{}': {message}", path.display())
            }
            StoreError::Poisoned => write!(f, "Map store lock is poisoned."),
            StoreError::NonFinite { path, index, value } => write!(
                f,
                "Map '{}' holds non-finite value {value} at index {index}.",
                path.display()
            ),
            StoreError::LengthMismatch { path, expected, actual } => write!(
                f,
                "Map '{}' has {actual} values; expected {expected}.",
                path.display()
            ),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<StoreError> for PyErr {
    fn from(err: StoreError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

//! metadata::errors — failures while pairing upstream results with metadata.
//!
//! Matching itself is a total predicate and never fails; errors arise only
//! when the upstream stream is structurally inconsistent (metadata and
//! payload lists of different lengths) or when a matching record lacks the
//! field used to group inputs downstream.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MetadataError {
    /// Parallel upstream lists disagree in length.
    LengthMismatch { what: &'static str, expected: usize, actual: usize },

    /// A matching record does not carry the grouping field.
    MissingField { index: usize, field: String },

    /// The grouping field is present but is not a string.
    NonStringField { index: usize, field: String },
}

impl std::error::Error for MetadataError {}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataError::LengthMismatch { what, expected, actual } => {
                write!(f, "Upstream {what} length mismatch: expected {expected}, got {actual}")
            }
            MetadataError::MissingField { index, field } => {
                write!(f, "Upstream record {index} matches the query but has no '{field}' entity.")
            }
            MetadataError::NonStringField { index, field } => {
                write!(f, "Upstream record {index} has a non-string '{field}' entity.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<MetadataError> for PyErr {
    fn from(err: MetadataError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

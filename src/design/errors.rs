//! design::errors — design-matrix and design-preparation failures.
//!
//! Purpose
//! -------
//! Report malformed design frames, invalid acquisition options, and the
//! data-quality failure raised when confound columns are entirely missing
//! and the caller has not opted into dropping them.
//!
//! Conventions
//! -----------
//! - [`DesignError::EmptyColumns`] lists every offending column and tells
//!   the caller how to opt into drop-missing behavior; its message is meant
//!   to be shown to end users as-is.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type DesignResult<T> = Result<T, DesignError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DesignError {
    // ---- Data quality ----
    /// Confound columns whose every value is missing.
    EmptyColumns { names: Vec<String> },

    // ---- Frames ----
    /// Matrix dimensions disagree with the supplied labels.
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    /// A column label occurs twice.
    DuplicateColumn(String),

    /// A column label is empty.
    EmptyColumnName,

    // ---- Options / events ----
    /// Repetition time must be finite and > 0.
    InvalidRepetitionTime(f64),

    /// At least one volume is required.
    InvalidVolumeCount(usize),

    /// Event onset or duration is NaN/±∞ (or the duration is negative).
    InvalidEvent { index: usize, field: &'static str, value: f64 },

    // ---- External builder ----
    /// Failure reported by an injected design-matrix builder.
    Builder(String),
}

impl std::error::Error for DesignError {}

impl std::fmt::Display for DesignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignError::EmptyColumns { names } => write!(
                f,
                "The following columns are empty: {}. Use --drop-missing to drop before model fitting.",
                names.join(", ")
            ),
            DesignError::ShapeMismatch { what, expected, actual } => {
                write!(f, "Design {what} mismatch: expected {expected}, got {actual}")
            }
            DesignError::DuplicateColumn(name) => {
                write!(f, "Design column '{name}' occurs more than once.")
            }
            DesignError::EmptyColumnName => write!(f, "Design column names must be non-empty."),
            DesignError::InvalidRepetitionTime(tr) => {
                write!(f, "Repetition time must be finite and > 0; got: {tr}")
            }
            DesignError::InvalidVolumeCount(n) => {
                write!(f, "Number of volumes must be at least 1; got: {n}")
            }
            DesignError::InvalidEvent { index, field, value } => {
                write!(f, "Event {index} has an invalid {field}: {value}")
            }
            DesignError::Builder(msg) => write!(f, "Design matrix builder failed: {msg}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DesignError> for PyErr {
    fn from(err: DesignError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The empty-columns message names every column and the opt-in flag.
    //
    // Given
    // -----
    // - `EmptyColumns { names: ["rot_x", "fd"] }`.
    //
    // Expect
    // ------
    // - Message contains "rot_x, fd" and "--drop-missing".
    fn empty_columns_message_names_columns_and_remedy() {
        let err = DesignError::EmptyColumns { names: vec!["rot_x".into(), "fd".into()] };

        let msg = err.to_string();

        assert!(msg.contains("rot_x, fd"), "Got: {msg}");
        assert!(msg.contains("--drop-missing"), "Got: {msg}");
    }
}

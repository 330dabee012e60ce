//! contrasts::errors — construction and parsing errors for contrast inputs.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias used while *building* contrast
//! declarations and contrast tables. Resolution against a design never fails
//! (unresolvable declarations are skipped), so every variant here describes
//! malformed user input: empty names, non-finite weights, unknown statistic
//! codes, inconsistent table shapes, or unparsable JSON.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the offending contrast or regressor
//!   name so that pipeline logs point straight at the model file entry.
//! - At the Python boundary every [`ContrastError`] becomes a `ValueError`
//!   carrying the `Display` message verbatim.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Result alias for contrast construction and parsing.
pub type ContrastResult<T> = Result<T, ContrastError>;

/// Unified error type for contrast declarations and contrast tables.
#[derive(Debug, Clone, PartialEq)]
pub enum ContrastError {
    // ---- Declarations ----
    /// A contrast declaration (or table row) has an empty name.
    EmptyContrastName,

    /// A weight row references a regressor with an empty name.
    EmptyRegressorName,

    /// A weight is NaN or ±∞.
    NonFiniteWeight { regressor: String, value: f64 },

    /// Statistic code is not one of `t`, `F`, `FEMA`.
    UnknownStatType(String),

    // ---- Tables ----
    /// Table dimensions disagree with the supplied names/types.
    TableShape { what: &'static str, expected: usize, actual: usize },

    /// A contrast or regressor name occurs twice in a table axis.
    DuplicateName { axis: &'static str, name: String },

    /// Multi-row (F-style) declarations cannot be laid out as a single table row.
    MultiRowDeclaration { name: String, rows: usize },

    // ---- Parsing ----
    /// JSON input could not be parsed into declarations.
    Json(String),
}

impl std::error::Error for ContrastError {}

impl std::fmt::Display for ContrastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Declarations ----
            ContrastError::EmptyContrastName => {
                write!(f, "Contrast name must be a non-empty string.")
            }
            ContrastError::EmptyRegressorName => {
                write!(f, "Weight rows must not reference an empty regressor name.")
            }
            ContrastError::NonFiniteWeight { regressor, value } => {
                write!(f, "Weight for regressor '{regressor}' must be finite; got: {value}")
            }
            ContrastError::UnknownStatType(code) => {
                write!(f, "Unknown statistic type '{code}'. Expected one of: t, F, FEMA.")
            }
            // ---- Tables ----
            ContrastError::TableShape { what, expected, actual } => {
                write!(f, "Contrast table {what} mismatch: expected {expected}, got {actual}")
            }
            ContrastError::DuplicateName { axis, name } => {
                write!(f, "Duplicate {axis} name '{name}' in contrast table.")
            }
            ContrastError::MultiRowDeclaration { name, rows } => {
                write!(
                    f,
                    "Contrast '{name}' has {rows} weight rows; a contrast table needs exactly one."
                )
            }
            // ---- Parsing ----
            ContrastError::Json(msg) => write!(f, "Could not parse contrast declarations: {msg}"),
        }
    }
}

impl From<serde_json::Error> for ContrastError {
    fn from(err: serde_json::Error) -> ContrastError {
        ContrastError::Json(err.to_string())
    }
}

#[cfg(feature = "python-bindings")]
impl From<ContrastError> for PyErr {
    fn from(err: ContrastError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that `NonFiniteWeight` names the regressor and embeds the value.
    //
    // Given
    // -----
    // - `NonFiniteWeight { regressor: "motion_x", value: NaN }`.
    //
    // Expect
    // ------
    // - The message contains both `motion_x` and `NaN`.
    fn non_finite_weight_display_names_regressor_and_value() {
        let err = ContrastError::NonFiniteWeight { regressor: "motion_x".into(), value: f64::NAN };

        let msg = err.to_string();

        assert!(msg.contains("motion_x"), "Got: {msg}");
        assert!(msg.contains("NaN"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure an unknown statistic code is echoed back together with the
    // accepted alternatives.
    //
    // Given
    // -----
    // - `UnknownStatType("chi2")`.
    //
    // Expect
    // ------
    // - The message mentions `chi2` and lists `FEMA`.
    fn unknown_stat_type_display_lists_alternatives() {
        let msg = ContrastError::UnknownStatType("chi2".into()).to_string();

        assert!(msg.contains("chi2"));
        assert!(msg.contains("FEMA"));
    }

    #[test]
    // Purpose
    // -------
    // Check that serde_json failures are wrapped into `ContrastError::Json`.
    //
    // Given
    // -----
    // - An unterminated JSON array.
    //
    // Expect
    // ------
    // - Conversion yields the `Json` variant.
    fn serde_json_errors_convert_to_json_variant() {
        let err = serde_json::from_str::<Vec<f64>>("[1.0,").unwrap_err();

        let converted = ContrastError::from(err);

        assert!(matches!(converted, ContrastError::Json(_)));
    }
}

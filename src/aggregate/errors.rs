//! aggregate::errors — level-aggregation failures.
//!
//! Purpose
//! -------
//! Provide the top-level error type of a level invocation. Aggregation is
//! where every layer meets, so [`AggregateError`] wraps the errors of the
//! contrast, metadata, design, engine, store, and results layers and adds
//! the configuration failures specific to combining inputs.
//!
//! Conventions
//! -----------
//! - [`AggregateError::InsufficientInputs`] names the contrast type that
//!   needed a model fit and the required minimum, so users can tell which
//!   declaration triggered it.
//! - Lower-layer errors convert with `?` via `From` and keep their own
//!   messages.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::{
    contrasts::{ContrastError, StatType},
    design::DesignError,
    engine::EngineError,
    metadata::MetadataError,
    results::ResultsError,
    store::StoreError,
};

pub type AggregateResult<T> = Result<T, AggregateError>;

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateError {
    // ---- Configuration ----
    /// Too few filtered inputs to fit a higher-level model.
    InsufficientInputs { stat: StatType, required: usize, found: usize },

    /// A fixed-effects contrast was requested without variance maps.
    MissingVarianceMaps { contrast: String },

    /// A fixed-effects contrast selected no inputs.
    EmptySelection { contrast: String },

    /// Smoothing kernel width must be finite and > 0.
    InvalidSmoothing(f64),

    // ---- Fixed-effects numerics ----
    /// No effect/variance pairs were supplied to the combiner.
    EmptyCombination,

    /// Effects and variances disagree in shape.
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    /// A variance is zero, negative, or non-finite.
    NonPositiveVariance { input: usize, voxel: usize, value: f64 },

    /// An effect is NaN or ±∞.
    NonFiniteEffect { input: usize, voxel: usize, value: f64 },

    // ---- Wrapped layers ----
    Contrast(ContrastError),
    Metadata(MetadataError),
    Design(DesignError),
    Engine(EngineError),
    Store(StoreError),
    Results(ResultsError),
}

impl std::error::Error for AggregateError {}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateError::InsufficientInputs { stat, required, found } => write!(
                f,
                "Insufficient second-level inputs: a '{stat}' contrast requires at least \
                 {required} inputs to fit a model; found {found}."
            ),
            AggregateError::MissingVarianceMaps { contrast } => write!(
                f,
                "Fixed-effects contrast '{contrast}' requires variance maps, but none were given."
            ),
            AggregateError::EmptySelection { contrast } => {
                write!(f, "Fixed-effects contrast '{contrast}' selects no inputs.")
            }
            AggregateError::InvalidSmoothing(fwhm) => {
                write!(f, "Smoothing FWHM must be finite and > 0; got: {fwhm}")
            }
            AggregateError::EmptyCombination => {
                write!(f, "Fixed-effects combination needs at least one input.")
            }
            AggregateError::ShapeMismatch { what, expected, actual } => {
                write!(f, "Fixed-effects {what} mismatch: expected {expected}, got {actual}")
            }
            AggregateError::NonPositiveVariance { input, voxel, value } => write!(
                f,
                "Variance of input {input} at voxel {voxel} must be finite and > 0; got: {value}"
            ),
            AggregateError::NonFiniteEffect { input, voxel, value } => {
                write!(f, "Effect of input {input} at voxel {voxel} is non-finite: {value}")
            }
            AggregateError::Contrast(e) => write!(f, "{e}"),
            AggregateError::Metadata(e) => write!(f, "{e}"),
            AggregateError::Design(e) => write!(f, "{e}"),
            AggregateError::Engine(e) => write!(f, "{e}"),
            AggregateError::Store(e) => write!(f, "{e}"),
            AggregateError::Results(e) => write!(f, "{e}"),
        }
    }
}

impl From<ContrastError> for AggregateError {
    fn from(err: ContrastError) -> Self {
        AggregateError::Contrast(err)
    }
}

impl From<MetadataError> for AggregateError {
    fn from(err: MetadataError) -> Self {
        AggregateError::Metadata(err)
    }
}

impl From<DesignError> for AggregateError {
    fn from(err: DesignError) -> Self {
        AggregateError::Design(err)
    }
}

impl From<EngineError> for AggregateError {
    fn from(err: EngineError) -> Self {
        AggregateError::Engine(err)
    }
}

impl From<StoreError> for AggregateError {
    fn from(err: StoreError) -> Self {
        AggregateError::Store(err)
    }
}

impl From<ResultsError> for AggregateError {
    fn from(err: ResultsError) -> Self {
        AggregateError::Results(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<AggregateError> for PyErr {
    fn from(err: AggregateError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The insufficient-inputs diagnostic names the type and the minimum.
    //
    // Given
    // -----
    // - `InsufficientInputs { stat: T, required: 2, found: 1 }`.
    //
    // Expect
    // ------
    // - Message mentions `'t'`, `at least 2`, and `found 1`.
    fn insufficient_inputs_message_names_type_and_minimum() {
        let err = AggregateError::InsufficientInputs { stat: StatType::T, required: 2, found: 1 };

        let msg = err.to_string();

        assert!(msg.contains("'t'"), "Got: {msg}");
        assert!(msg.contains("at least 2"), "Got: {msg}");
        assert!(msg.contains("found 1"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Wrapped layer errors keep their own messages.
    //
    // Given
    // -----
    // - `StoreError::Poisoned` converted with `From`.
    //
    // Expect
    // ------
    // - Same `Display` text as the store error.
    fn wrapped_errors_forward_display() {
        let err: AggregateError = StoreError::Poisoned.into();

        assert_eq!(err.to_string(), StoreError::Poisoned.to_string());
    }
}

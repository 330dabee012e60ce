//! engine::errors — statistics-engine failures.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by the [`StatsEngine`] /
//! [`FittedModel`] seam and the reference OLS engine, plus the Python
//! bridge used by the bindings.
//!
//! Conventions
//! -----------
//! - External engines wrap their own failures in
//!   [`EngineError::Backend`] rather than adding variants here.
//! - Distribution construction failures from `statrs` are reported as
//!   [`EngineError::Distribution`] with the parameter that was rejected.
//!
//! [`StatsEngine`]: crate::engine::StatsEngine
//! [`FittedModel`]: crate::engine::FittedModel

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::contrasts::StatType;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    // ---- Inputs ----
    /// Array dimensions disagree (rows of data vs. design, contrast width vs.
    /// regressor count, ...).
    ShapeMismatch { what: &'static str, expected: usize, actual: usize },

    /// No observations or no voxels were supplied.
    EmptyData,

    /// Data contains NaN or ±∞.
    NonFiniteData { row: usize, col: usize },

    /// The design leaves no residual degrees of freedom.
    InsufficientDof { n_obs: usize, rank: usize },

    /// A contrast with no rows cannot be evaluated.
    EmptyContrast,

    // ---- Capability ----
    /// Requested feature is not available in this engine.
    Unsupported(String),

    /// Statistic type that an engine cannot compute (e.g. `FEMA`).
    UnsupportedStat(StatType),

    // ---- Numerics ----
    /// Contrast covariance `C (XᵀX)⁺ Cᵀ` is singular.
    SingularContrast,

    /// Invalid parameters passed to a `statrs` distribution.
    Distribution { name: &'static str, param: f64 },

    // ---- External ----
    Backend(String),
}

impl std::error::Error for EngineError {}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::ShapeMismatch { what, expected, actual } => {
                write!(f, "Engine {what} mismatch: expected {expected}, got {actual}")
            }
            EngineError::EmptyData => write!(f, "Engine input data must be non-empty."),
            EngineError::NonFiniteData { row, col } => {
                write!(f, "Engine input data is non-finite at ({row}, {col}).")
            }
            EngineError::InsufficientDof { n_obs, rank } => write!(
                f,
                "Design leaves no residual degrees of freedom: {n_obs} observations, rank {rank}."
            ),
            EngineError::EmptyContrast => write!(f, "Contrast weights must have at least one row."),
            EngineError::Unsupported(what) => write!(f, "Unsupported engine option: {what}"),
            EngineError::UnsupportedStat(stat) => {
                write!(f, "Engine cannot compute contrasts of type '{stat}'.")
            }
            EngineError::SingularContrast => {
                write!(f, "Contrast covariance is singular; the contrast is not estimable.")
            }
            EngineError::Distribution { name, param } => {
                write!(f, "Invalid parameter for {name} distribution: {param}")
            }
            EngineError::Backend(msg) => write!(f, "Statistics engine failed: {msg}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<EngineError> for PyErr {
    fn from(err: EngineError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

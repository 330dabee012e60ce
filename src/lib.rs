//! rust_glm_levels — contrast resolution and multi-level GLM aggregation.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes contrast resolution, entity matching, fixed-effects combination,
//! and second-level aggregation to Python via the `_rust_glm_levels`
//! extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules as the public crate surface:
//!   [`contrasts`], [`metadata`], [`design`], [`engine`], [`aggregate`],
//!   [`results`], and [`store`].
//! - When `python-bindings` is enabled, define `#[pyfunction]` wrappers and
//!   register them under the `contrasts` and `aggregate` submodules.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical and bookkeeping work lives in the inner modules; this
//!   file performs only FFI glue, input conversion, and error mapping.
//! - Structured inputs (contrast declarations, entities, level inputs and
//!   options) cross the boundary as JSON strings so that the Python side
//!   can pass the same documents the surrounding pipeline already uses.
//!
//! Conventions
//! -----------
//! - Statistic types are exchanged as the strings `"t"`, `"F"`, `"FEMA"`.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on the inner modules and can ignore the
//!   items guarded by the `python-bindings` feature.
//! - Python wrappers import `_rust_glm_levels.contrasts` and
//!   `_rust_glm_levels.aggregate`.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by
//!   `tests/integration_level_pipeline.rs`; the bindings are thin enough to
//!   be exercised from Python smoke tests only.

pub mod aggregate;
pub mod contrasts;
pub mod design;
pub mod engine;
pub mod metadata;
pub mod results;
pub mod store;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    aggregate::{LevelOptions, SecondLevel, SecondLevelInputs},
    contrasts::ContrastSpec,
    design::GroupingDesign,
    engine::OlsEngine,
    metadata::Entities,
    store::JsonMapStore,
    utils::{extract_f64_matrix, parse_json},
};

/// Resolve contrast declarations against design regressors.
///
/// Returns a list of `(name, weights, stat)` with `weights` shaped
/// `(n_rows, len(regressors))`. Declarations naming absent regressors are
/// dropped.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (contrasts_json, regressors))]
fn prepare_contrasts<'py>(
    py: Python<'py>, contrasts_json: &str, regressors: Vec<String>,
) -> PyResult<Vec<(String, Bound<'py, PyArray2<f64>>, String)>> {
    let spec = ContrastSpec::from_json(contrasts_json)?;
    let resolution = contrasts::prepare_contrasts(&spec, &regressors);
    Ok(resolution
        .resolved
        .into_iter()
        .map(|c| (c.name, c.weights.into_pyarray(py), c.stat.as_str().to_string()))
        .collect())
}

/// `True` when every key of `query` is in `candidate` with an equal value.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn match_entities(query_json: &str, candidate_json: &str) -> PyResult<bool> {
    let query: Entities = parse_json(query_json, "query entities")?;
    let candidate: Entities = parse_json(candidate_json, "candidate entities")?;
    Ok(metadata::matches(&query, &candidate))
}

/// Dummy-code contrast names; returns `(columns, matrix)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn grouping_design<'py>(
    py: Python<'py>, names: Vec<String>,
) -> (Vec<String>, Bound<'py, PyArray2<f64>>) {
    let design = GroupingDesign::from_names(&names);
    (design.columns().to_vec(), design.matrix().clone().into_pyarray(py))
}

/// Inverse-variance fixed effects over rows; returns `(effect, variance, stat)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn compute_fixed_effects<'py>(
    py: Python<'py>, effects: &Bound<'py, PyAny>, variances: &Bound<'py, PyAny>,
) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>, Bound<'py, PyArray1<f64>>)> {
    let effects = extract_f64_matrix(py, effects)?;
    let variances = extract_f64_matrix(py, variances)?;
    let fx = aggregate::compute_fixed_effects(effects.as_array(), variances.as_array())?;
    Ok((fx.effect.into_pyarray(py), fx.variance.into_pyarray(py), fx.stat.into_pyarray(py)))
}

/// Run a second-level invocation over JSON map files with the OLS engine.
///
/// `inputs_json` and `options_json` follow `SecondLevelInputs` and
/// `LevelOptions`; the return value is the JSON encoding of the outputs
/// (`effect_maps`, `variance_maps`, ..., `contrast_metadata`).
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn run_second_level(inputs_json: &str, options_json: &str) -> PyResult<String> {
    let inputs: SecondLevelInputs = parse_json(inputs_json, "second-level inputs")?;
    let options: LevelOptions = parse_json(options_json, "level options")?;
    let results = SecondLevel::new(OlsEngine, JsonMapStore, options).run(&inputs)?;
    serde_json::to_string(&results.to_outputs())
        .map_err(|e| PyValueError::new_err(format!("could not encode outputs: {e}")))
}

/// Python module initializer for `_rust_glm_levels`.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_glm_levels<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let contrasts_mod = PyModule::new(_py, "contrasts")?;
    let aggregate_mod = PyModule::new(_py, "aggregate")?;
    contrasts_module(_py, m, &contrasts_mod)?;
    aggregate_module(_py, m, &aggregate_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_glm_levels.contrasts", contrasts_mod)?;

    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_glm_levels.aggregate", aggregate_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn contrasts_module<'py>(
    _py: Python, root: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(prepare_contrasts, m)?)?;
    m.add_function(wrap_pyfunction!(match_entities, m)?)?;
    m.add_function(wrap_pyfunction!(grouping_design, m)?)?;
    root.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn aggregate_module<'py>(
    _py: Python, root: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_fixed_effects, m)?)?;
    m.add_function(wrap_pyfunction!(run_second_level, m)?)?;
    root.add_submodule(m)?;
    Ok(())
}

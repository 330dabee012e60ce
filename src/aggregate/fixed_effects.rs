//! aggregate::fixed_effects — inverse-variance fixed-effects combination.
//!
//! Purpose
//! -------
//! Combine per-input effect and variance maps into one effect, variance,
//! and statistic map without fitting a model. This is the pass-through
//! path used by `FEMA` contrasts at higher levels.
//!
//! Key behaviors
//! -------------
//! - Voxel-wise, with inputs `i`:
//!   `variance = 1 / Σᵢ (1 / vᵢ)`,
//!   `effect = variance · Σᵢ (eᵢ / vᵢ)`,
//!   `stat = effect / √variance`.
//! - A single input passes through unchanged (`stat = e / √v`).
//! - The combination is invariant to input order up to floating-point
//!   summation error.
//!
//! Invariants & assumptions
//! ------------------------
//! - `effects` and `variances` are `[n_inputs × n_voxels]` with equal
//!   shapes; rows pair up.
//! - Effects are finite; variances are finite and strictly positive.
use ndarray::{Array1, ArrayView2, Zip};

use crate::{
    aggregate::errors::{AggregateError, AggregateResult},
    engine::StatMap,
};

/// FixedEffectsResult — combined effect, variance and statistic maps.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedEffectsResult {
    pub effect: StatMap,
    pub variance: StatMap,
    pub stat: StatMap,
}

/// Seam for the fixed-effects combination routine.
pub trait FixedEffectsCombiner {
    fn combine(
        &self, effects: ArrayView2<'_, f64>, variances: ArrayView2<'_, f64>,
    ) -> AggregateResult<FixedEffectsResult>;
}

/// InverseVariance — the default combiner, see [`compute_fixed_effects`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseVariance;

impl FixedEffectsCombiner for InverseVariance {
    fn combine(
        &self, effects: ArrayView2<'_, f64>, variances: ArrayView2<'_, f64>,
    ) -> AggregateResult<FixedEffectsResult> {
        compute_fixed_effects(effects, variances)
    }
}

/// Inverse-variance weighted combination of `effects` (rows = inputs).
///
/// Errors
/// ------
/// - `AggregateError::EmptyCombination` when there are no inputs.
/// - `AggregateError::ShapeMismatch` when the two arrays differ in shape.
/// - `AggregateError::NonFiniteEffect` / `NonPositiveVariance` for invalid
///   values.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_glm_levels::aggregate::compute_fixed_effects;
/// let fx = compute_fixed_effects(
///     array![[1.0], [2.0], [3.0]].view(),
///     array![[1.0], [1.0], [1.0]].view(),
/// ).unwrap();
/// assert!((fx.effect[0] - 2.0).abs() < 1e-12);
/// assert!((fx.variance[0] - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn compute_fixed_effects(
    effects: ArrayView2<'_, f64>, variances: ArrayView2<'_, f64>,
) -> AggregateResult<FixedEffectsResult> {
    validate(effects, variances)?;

    if effects.nrows() == 1 {
        let effect = effects.row(0).to_owned();
        let variance = variances.row(0).to_owned();
        let stat = Zip::from(&effect).and(&variance).map_collect(|&e, &v| e / v.sqrt());
        return Ok(FixedEffectsResult { effect, variance, stat });
    }

    let n_voxels = effects.ncols();
    let mut precision = Array1::<f64>::zeros(n_voxels);
    let mut weighted = Array1::<f64>::zeros(n_voxels);
    for (e_row, v_row) in effects.rows().into_iter().zip(variances.rows()) {
        Zip::from(&mut precision)
            .and(&mut weighted)
            .and(&e_row)
            .and(&v_row)
            .for_each(|p, w, &e, &v| {
                *p += 1.0 / v;
                *w += e / v;
            });
    }

    let variance = precision.mapv(|p| 1.0 / p);
    let effect = &variance * &weighted;
    let stat = Zip::from(&effect).and(&variance).map_collect(|&e, &v| e / v.sqrt());
    Ok(FixedEffectsResult { effect, variance, stat })
}

fn validate(effects: ArrayView2<'_, f64>, variances: ArrayView2<'_, f64>) -> AggregateResult<()> {
    if effects.nrows() == 0 {
        return Err(AggregateError::EmptyCombination);
    }
    if variances.nrows() != effects.nrows() {
        return Err(AggregateError::ShapeMismatch {
            what: "input count",
            expected: effects.nrows(),
            actual: variances.nrows(),
        });
    }
    if variances.ncols() != effects.ncols() {
        return Err(AggregateError::ShapeMismatch {
            what: "voxel count",
            expected: effects.ncols(),
            actual: variances.ncols(),
        });
    }
    if let Some(((input, voxel), &value)) = effects.indexed_iter().find(|(_, e)| !e.is_finite()) {
        return Err(AggregateError::NonFiniteEffect { input, voxel, value });
    }
    if let Some(((input, voxel), &value)) =
        variances.indexed_iter().find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
        return Err(AggregateError::NonPositiveVariance { input, voxel, value });
    }
    Ok(())
}

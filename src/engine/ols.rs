//! engine::ols — mass-univariate ordinary least squares.
//!
//! Purpose
//! -------
//! Provide a self-contained reference [`StatsEngine`]: one OLS fit per voxel
//! sharing a single design, with t and F contrasts evaluated against the
//! fit. It backs tests and small in-process analyses; production pipelines
//! are expected to inject their own engine.
//!
//! Key behaviors
//! -------------
//! - `(XᵀX)⁺` is computed once per fit by symmetric eigendecomposition
//!   (`nalgebra`) with eigenvalue truncation; rank-deficient designs are
//!   therefore supported and their rank reduces the residual dof.
//! - t contrast (one row `c`): effect `cβ`, variance `σ² c(XᵀX)⁺cᵀ`,
//!   statistic `t = effect / √variance`, one-sided p-value from Student-t
//!   with `dof` degrees of freedom, and `z = Φ⁻¹(1 − p)`.
//! - z-scores are taken from whichever tail is smaller (`−Φ⁻¹(sf)` for
//!   positive statistics, `Φ⁻¹(cdf)` otherwise), so extreme statistics of
//!   either sign keep a finite z.
//! - F contrast (`q` rows `C`): `F = (Cβ)ᵀ [C(XᵀX)⁺Cᵀ]⁺ (Cβ) / (q σ²)`,
//!   upper-tail p-value from `F(q, dof)`; effect/variance maps are emitted
//!   only when `q == 1`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `data` rows align with design rows; all data must be finite.
//! - `dof = n − rank(X) ≥ 1`, otherwise the fit fails.
//! - A t contrast is non-estimable when `c(XᵀX)⁺cᵀ ≤ EIGEN_EPS · ‖c‖²`.
//! - Spatial smoothing requires geometry this engine does not have, so any
//!   `smoothing_fwhm` is rejected.
//!
//! Testing notes
//! -------------
//! - Unit tests compare against closed-form results for intercept-only and
//!   duplicated-column designs and check `F = t²` for single-row contrasts.
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};
use tracing::debug;

use crate::{
    design::DesignFrame,
    engine::{
        errors::{EngineError, EngineResult},
        traits::{FittedModel, StatsEngine},
        types::{ContrastMaps, EngineStat, FitOptions, OutputKind},
    },
};

/// Relative eigenvalue cutoff for the pseudoinverse.
pub const EIGEN_EPS: f64 = 1e-10;

/// Added to variances before taking square roots.
const TINY: f64 = 1e-50;

/// Tail probabilities are clipped to `[P_MIN, P_MAX]` before `Φ⁻¹`.
const P_MIN: f64 = 1e-300;
const P_MAX: f64 = 1.0 - 1e-16;

/// OlsEngine — reference mass-univariate OLS engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct OlsEngine;

/// OlsModel — per-voxel OLS fit sharing one design.
///
/// Fields
/// ------
/// - `beta`: `[n_regressors × n_voxels]` coefficients.
/// - `xtx_pinv`: `(XᵀX)⁺`, `[n_regressors × n_regressors]`.
/// - `sigma2`: residual variance per voxel.
/// - `dof`: residual degrees of freedom, `n − rank(X)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsModel {
    regressors: Vec<String>,
    beta: Array2<f64>,
    xtx_pinv: Array2<f64>,
    sigma2: Array1<f64>,
    rank: usize,
    dof: usize,
}

impl OlsModel {
    pub fn beta(&self) -> &Array2<f64> {
        &self.beta
    }

    pub fn sigma2(&self) -> &Array1<f64> {
        &self.sigma2
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn dof(&self) -> usize {
        self.dof
    }

    fn t_contrast(&self, weights: ArrayView2<'_, f64>) -> EngineResult<ContrastMaps> {
        if weights.nrows() != 1 {
            return Err(EngineError::ShapeMismatch {
                what: "t contrast rows",
                expected: 1,
                actual: weights.nrows(),
            });
        }
        let c = weights.row(0);
        let c_var = c.dot(&self.xtx_pinv.dot(&c));
        if c_var <= EIGEN_EPS * c.dot(&c) {
            return Err(EngineError::SingularContrast);
        }

        let effect = c.dot(&self.beta);
        let variance = self.sigma2.mapv(|s2| s2 * c_var);
        let stat = ndarray::Zip::from(&effect)
            .and(&variance)
            .map_collect(|&e, &v| e / (v + TINY).sqrt());

        let t_dist = StudentsT::new(0.0, 1.0, self.dof as f64)
            .map_err(|_| EngineError::Distribution { name: "Student-t", param: self.dof as f64 })?;
        let p_value = stat.mapv(|t| t_dist.sf(t));
        let lower = stat.mapv(|t| t_dist.cdf(t));
        let z_score = z_from_tails(&p_value, &lower)?;

        Ok(ContrastMaps::new()
            .with(OutputKind::EffectSize, effect)
            .with(OutputKind::EffectVariance, variance)
            .with(OutputKind::ZScore, z_score)
            .with(OutputKind::PValue, p_value)
            .with(OutputKind::Stat, stat))
    }

    fn f_contrast(&self, weights: ArrayView2<'_, f64>) -> EngineResult<ContrastMaps> {
        let q = weights.nrows();
        let c_beta = weights.dot(&self.beta);
        let c_cov = weights.dot(&self.xtx_pinv).dot(&weights.t());
        let (c_cov_pinv, c_rank) = pseudo_inverse(&c_cov);
        if c_rank == 0 {
            return Err(EngineError::SingularContrast);
        }

        let stat = Array1::from_shape_fn(self.beta.ncols(), |v| {
            let cb = c_beta.column(v);
            cb.dot(&c_cov_pinv.dot(&cb)) / (q as f64 * self.sigma2[v] + TINY)
        });

        let f_dist = FisherSnedecor::new(q as f64, self.dof as f64)
            .map_err(|_| EngineError::Distribution { name: "Fisher-Snedecor", param: q as f64 })?;
        let p_value = stat.mapv(|f| f_dist.sf(f));
        let lower = stat.mapv(|f| f_dist.cdf(f));
        let z_score = z_from_tails(&p_value, &lower)?;

        let mut maps = ContrastMaps::new()
            .with(OutputKind::ZScore, z_score)
            .with(OutputKind::PValue, p_value)
            .with(OutputKind::Stat, stat);
        if q == 1 {
            let c_var = c_cov[[0, 0]];
            maps.insert(OutputKind::EffectSize, c_beta.row(0).to_owned());
            maps.insert(OutputKind::EffectVariance, self.sigma2.mapv(|s2| s2 * c_var));
        }
        Ok(maps)
    }
}

impl StatsEngine for OlsEngine {
    type Model = OlsModel;

    /// Errors
    /// ------
    /// - `EngineError::Unsupported` if smoothing is requested.
    /// - `EngineError::EmptyData` / `ShapeMismatch` / `NonFiniteData` for
    ///   malformed inputs.
    /// - `EngineError::InsufficientDof` when `n ≤ rank(X)`.
    fn fit(
        &self, data: ArrayView2<'_, f64>, design: &DesignFrame, options: &FitOptions,
    ) -> EngineResult<OlsModel> {
        if let Some(fwhm) = options.smoothing_fwhm {
            return Err(EngineError::Unsupported(format!(
                "spatial smoothing (fwhm = {fwhm}) requires image geometry"
            )));
        }
        validate_data(data, design)?;

        let x = design.matrix();
        let (xtx_pinv, rank) = pseudo_inverse(&x.t().dot(x));
        let n_obs = x.nrows();
        if n_obs <= rank {
            return Err(EngineError::InsufficientDof { n_obs, rank });
        }
        let dof = n_obs - rank;

        let beta = xtx_pinv.dot(&x.t().dot(&data));
        let residuals = &data - &x.dot(&beta);
        let sigma2 = residuals.mapv(|r| r * r).sum_axis(Axis(0)) / dof as f64;

        debug!(n_obs, n_voxels = data.ncols(), rank, dof, "fitted OLS model");
        Ok(OlsModel {
            regressors: design.columns().to_vec(),
            beta,
            xtx_pinv,
            sigma2,
            rank,
            dof,
        })
    }
}

impl FittedModel for OlsModel {
    fn regressors(&self) -> &[String] {
        &self.regressors
    }

    fn compute_contrast(
        &self, weights: ArrayView2<'_, f64>, stat: EngineStat,
    ) -> EngineResult<ContrastMaps> {
        if weights.nrows() == 0 {
            return Err(EngineError::EmptyContrast);
        }
        if weights.ncols() != self.regressors.len() {
            return Err(EngineError::ShapeMismatch {
                what: "contrast width",
                expected: self.regressors.len(),
                actual: weights.ncols(),
            });
        }
        match stat {
            EngineStat::T => self.t_contrast(weights),
            EngineStat::F => self.f_contrast(weights),
        }
    }
}

fn validate_data(data: ArrayView2<'_, f64>, design: &DesignFrame) -> EngineResult<()> {
    if data.nrows() == 0 || data.ncols() == 0 || design.columns().is_empty() {
        return Err(EngineError::EmptyData);
    }
    if data.nrows() != design.n_rows() {
        return Err(EngineError::ShapeMismatch {
            what: "observation count",
            expected: design.n_rows(),
            actual: data.nrows(),
        });
    }
    if let Some(((row, col), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(EngineError::NonFiniteData { row, col });
    }
    Ok(())
}

/// Moore–Penrose pseudoinverse of a symmetric matrix and its numerical rank.
///
/// Eigenvalues at or below `EIGEN_EPS · max(1, λ_max)` are treated as zero.
fn pseudo_inverse(sym: &Array2<f64>) -> (Array2<f64>, usize) {
    let n = sym.nrows();
    let mut m = DMatrix::<f64>::zeros(n, n);
    for j in 0..n {
        for i in 0..n {
            m[(i, j)] = sym[[i, j]];
        }
    }
    let eigen = m.symmetric_eigen();
    let lambda_max = eigen.eigenvalues.iter().fold(0.0_f64, |acc, l| acc.max(*l));
    let cutoff = EIGEN_EPS * lambda_max.max(1.0);

    let q = eigen.eigenvectors;
    let kept: Vec<(usize, f64)> =
        eigen.eigenvalues.iter().copied().enumerate().filter(|(_, l)| *l > cutoff).collect();
    let pinv = Array2::from_shape_fn((n, n), |(i, j)| {
        kept.iter().map(|&(k, l)| q[(i, k)] * q[(j, k)] / l).sum()
    });
    (pinv, kept.len())
}

/// `z = Φ⁻¹(1 − p)` from the upper tail `p` and the lower tail `1 − p`.
///
/// The smaller tail is inverted, so `z` stays finite when the other tail
/// rounds to 1.
fn z_from_tails(upper: &Array1<f64>, lower: &Array1<f64>) -> EngineResult<Array1<f64>> {
    let normal = Normal::new(0.0, 1.0)
        .map_err(|_| EngineError::Distribution { name: "Normal", param: 1.0 })?;
    Ok(ndarray::Zip::from(upper).and(lower).map_collect(|&u, &l| {
        if u < 0.5 {
            -normal.inverse_cdf(u.clamp(P_MIN, P_MAX))
        } else {
            normal.inverse_cdf(l.clamp(P_MIN, P_MAX))
        }
    }))
}

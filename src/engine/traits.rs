//! engine::traits — the statistics-engine seam.
//!
//! Purpose
//! -------
//! Decouple contrast aggregation from the numerical GLM machinery. The
//! aggregators only need to (1) fit a model to stacked data against a
//! labelled design and (2) evaluate weight matrices against the fit.
//!
//! Conventions
//! -----------
//! - `data` is `[n_observations × n_voxels]`; its rows align with the rows
//!   of the design frame.
//! - `weights` passed to [`FittedModel::compute_contrast`] are
//!   `[n_rows × n_regressors]` in the order of [`FittedModel::regressors`].
//! - Engines return only the kinds they can compute; callers must not
//!   assume all five kinds are present.
use ndarray::ArrayView2;

use crate::{
    design::DesignFrame,
    engine::{
        errors::EngineResult,
        types::{ContrastMaps, EngineStat, FitOptions},
    },
};

pub trait StatsEngine {
    type Model: FittedModel;

    fn fit(
        &self, data: ArrayView2<'_, f64>, design: &DesignFrame, options: &FitOptions,
    ) -> EngineResult<Self::Model>;
}

pub trait FittedModel {
    /// Design column names, in weight-column order.
    fn regressors(&self) -> &[String];

    fn compute_contrast(
        &self, weights: ArrayView2<'_, f64>, stat: EngineStat,
    ) -> EngineResult<ContrastMaps>;
}

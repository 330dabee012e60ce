//! aggregate::first_level — per-run model fit and contrast loop.
//!
//! Purpose
//! -------
//! Fit the statistics engine on one run's time series against its design,
//! resolve the run's contrasts against the fitted regressors, and write the
//! maps of every resolved contrast.
//!
//! Key behaviors
//! -------------
//! - Contrasts are resolved against [`FittedModel::regressors`], i.e. the
//!   design column order the engine actually used.
//! - Metadata records carry the entities of the first declaration.
//! - `FEMA` declarations cannot be evaluated against a fitted model; the
//!   engine-stat conversion rejects them.
use ndarray::ArrayView2;
use tracing::info;

use crate::{
    aggregate::{emit::emit_contrast, errors::AggregateResult, options::LevelOptions},
    contrasts::{ContrastSpec, prepare_contrasts},
    design::DesignFrame,
    engine::{EngineStat, FittedModel, StatsEngine},
    results::{LevelResults, ResultAssembler},
    store::MapStore,
};

/// FirstLevel — runs one first-level invocation.
#[derive(Debug, Clone)]
pub struct FirstLevel<E, S> {
    engine: E,
    store: S,
    options: LevelOptions,
}

impl<E, S> FirstLevel<E, S> {
    pub fn new(engine: E, store: S, options: LevelOptions) -> Self {
        FirstLevel { engine, store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<E: StatsEngine, S: MapStore> FirstLevel<E, S> {
    /// Fit `data` (`[n_volumes × n_voxels]`) against `design` and write the
    /// maps of every resolvable contrast in `contrasts`.
    ///
    /// Errors
    /// ------
    /// - Wrapped engine errors (fit, contrast evaluation, `FEMA` requests).
    /// - Wrapped store and results errors.
    pub fn run(
        &self, data: ArrayView2<'_, f64>, design: &DesignFrame, contrasts: &ContrastSpec,
    ) -> AggregateResult<LevelResults> {
        self.options.validate()?;
        let model = self.engine.fit(data, design, &self.options.fit_options())?;
        let resolution = prepare_contrasts(contrasts, model.regressors());
        info!(
            volumes = data.nrows(),
            regressors = model.regressors().len(),
            contrasts = resolution.resolved.len(),
            skipped = resolution.skipped.len(),
            "running first-level contrasts"
        );

        let mut assembler =
            ResultAssembler::new(contrasts.shared_entities()).with_skipped(resolution.skipped);
        for contrast in &resolution.resolved {
            let stat = EngineStat::try_from(contrast.stat)?;
            let maps = model.compute_contrast(contrast.weights.view(), stat)?;
            emit_contrast(&self.store, &self.options.output_dir, &mut assembler, contrast, maps)?;
        }
        Ok(assembler.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    use crate::{
        aggregate::errors::AggregateError,
        contrasts::{ContrastDeclaration, StatType, WeightRow},
        engine::{EngineError, OlsEngine, OutputKind},
        metadata::{Entities, EntityValue},
        store::InMemoryStore,
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The fit → resolve → compute → write loop with the OLS engine.
    // - Skipped declarations and first-declaration entities in metadata.
    // - Rejection of FEMA at the first level.
    // -------------------------------------------------------------------------

    fn design() -> DesignFrame {
        let x = array![[1.0, 1.0], [0.0, 1.0], [1.0, 1.0], [0.0, 1.0], [1.0, 1.0], [0.0, 1.0]];
        DesignFrame::new(vec!["go".into(), "constant".into()], x).unwrap()
    }

    fn data() -> Array2<f64> {
        array![[3.1], [1.0], [2.9], [1.1], [3.0], [0.9]]
    }

    fn decl(name: &str, pairs: &[(&str, f64)], stat: StatType) -> ContrastDeclaration {
        ContrastDeclaration::new(name, vec![WeightRow::new(pairs.iter().copied()).unwrap()], stat)
            .unwrap()
            .with_entities(Entities::new().with("subject", "01").with("run", 1))
    }

    #[test]
    // Purpose
    // -------
    // Resolvable contrasts are fitted and written; others are skipped.
    //
    // Given
    // -----
    // - Design `[go, constant]`; contrasts `go` (t) and `stop` (t).
    //
    // Expect
    // ------
    // - One record for `go` with `run = 1`; `stop` skipped; the written
    //   effect is the go/rest difference `3.0 − 1.0 = 2.0`.
    fn run_writes_resolved_contrasts() {
        let store = InMemoryStore::new();
        let level = FirstLevel::new(OlsEngine, &store, LevelOptions::new("run1", None).unwrap());
        let spec = ContrastSpec::Declared(vec![
            decl("go", &[("go", 1.0)], StatType::T),
            decl("stop", &[("stop", 1.0)], StatType::T),
        ]);

        let results = level.run(data().view(), &design(), &spec).unwrap();

        let effect = store.read(Path::new("run1/go_effect_size.nii.gz")).unwrap();
        assert_relative_eq!(effect[0], 2.0, epsilon = 1e-10);
        assert_eq!(results.len(), 1);
        assert_eq!(results.metadata()[0].get("run"), Some(&EntityValue::Int(1)));
        assert_eq!(results.skipped()[0].name, "stop");
        assert_eq!(
            results.paths(OutputKind::PValue),
            Some(vec![PathBuf::from("run1/go_p_value.nii.gz")])
        );
    }

    #[test]
    // Purpose
    // -------
    // FEMA cannot be evaluated against a fitted first-level model.
    //
    // Given
    // -----
    // - Contrast `go` declared as FEMA.
    //
    // Expect
    // ------
    // - `Engine(UnsupportedStat(Fema))`.
    fn fema_is_rejected_at_first_level() {
        let store = InMemoryStore::new();
        let level = FirstLevel::new(OlsEngine, &store, LevelOptions::default());
        let spec = ContrastSpec::Declared(vec![decl("go", &[("go", 1.0)], StatType::Fema)]);

        let err = level.run(data().view(), &design(), &spec).unwrap_err();

        assert_eq!(err, AggregateError::Engine(EngineError::UnsupportedStat(StatType::Fema)));
    }
}

//! aggregate::second_level — higher-level aggregation of upstream contrasts.
//!
//! Purpose
//! -------
//! Combine per-contrast outputs of a lower level (runs, sessions, subjects)
//! into higher-level contrasts. Upstream outputs are matched to this level
//! by entity metadata, grouped with a one-hot design over their contrast
//! names, and then either fitted with a statistics engine or combined by
//! fixed effects.
//!
//! Key behaviors
//! -------------
//! - Upstream lists are nested (one inner list per upstream unit) and are
//!   flattened before filtering; variance paths are filtered in lockstep
//!   with effect paths.
//! - The grouping design's column order (first appearance) is the regressor
//!   order contrasts are resolved against.
//! - A model is fitted once, only if some resolved contrast is not `FEMA`,
//!   and only with at least [`MIN_FIT_INPUTS`] filtered inputs.
//! - `FEMA` contrasts select the inputs in any column with non-zero weight
//!   and combine them through the injected [`FixedEffectsCombiner`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Output maps and metadata records follow the resolved contrast order.
//! - Declarations whose regressors are absent from the grouping design are
//!   reported in [`LevelResults::skipped`] and produce no outputs.
//!
//! Testing notes
//! -------------
//! - Unit tests use an in-memory store and a recording stub engine so that
//!   the fit count, the design handed to the engine, and the FEMA path can
//!   be checked without numerical GLM code.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    aggregate::{
        emit::emit_contrast,
        errors::{AggregateError, AggregateResult},
        fixed_effects::{FixedEffectsCombiner, InverseVariance},
        options::LevelOptions,
    },
    contrasts::{ContrastSpec, ResolvedContrast, StatType, prepare_contrasts},
    design::GroupingDesign,
    engine::{ContrastMaps, EngineStat, FittedModel, OutputKind, StatsEngine},
    metadata::{CONTRAST_KEY, Entities, MetadataError, filter_by_entities, flatten_nested},
    results::{LevelResults, ResultAssembler},
    store::MapStore,
};

/// Minimum number of filtered inputs needed to fit a higher-level model.
pub const MIN_FIT_INPUTS: usize = 2;

/// SecondLevelInputs — upstream outputs and this level's contrasts.
///
/// Fields
/// ------
/// - `effect_maps`: nested effect-map paths, one inner list per upstream
///   unit.
/// - `variance_maps`: nested variance-map paths parallel to `effect_maps`;
///   required only by `FEMA` contrasts.
/// - `stat_metadata`: nested metadata records parallel to `effect_maps`.
/// - `contrasts`: this level's declarations.
/// - `query`: entities an upstream record must carry to be included;
///   defaults to the entities of the first declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecondLevelInputs {
    pub effect_maps: Vec<Vec<PathBuf>>,
    #[serde(default)]
    pub variance_maps: Option<Vec<Vec<PathBuf>>>,
    pub stat_metadata: Vec<Vec<Entities>>,
    #[serde(default)]
    pub contrasts: ContrastSpec,
    #[serde(default)]
    pub query: Option<Entities>,
}

/// SecondLevel — runs one higher-level invocation.
#[derive(Debug, Clone)]
pub struct SecondLevel<E, S, C = InverseVariance> {
    engine: E,
    store: S,
    combiner: C,
    options: LevelOptions,
}

impl<E, S> SecondLevel<E, S, InverseVariance> {
    pub fn new(engine: E, store: S, options: LevelOptions) -> Self {
        SecondLevel { engine, store, combiner: InverseVariance, options }
    }
}

impl<E, S, C> SecondLevel<E, S, C> {
    pub fn with_combiner<C2>(self, combiner: C2) -> SecondLevel<E, S, C2> {
        SecondLevel { engine: self.engine, store: self.store, combiner, options: self.options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &LevelOptions {
        &self.options
    }
}

impl<E, S, C> SecondLevel<E, S, C>
where
    E: StatsEngine,
    S: MapStore,
    C: FixedEffectsCombiner,
{
    /// Aggregate `inputs` and write one set of maps per resolved contrast.
    ///
    /// Errors
    /// ------
    /// - `AggregateError::InsufficientInputs` when a model must be fitted
    ///   and fewer than [`MIN_FIT_INPUTS`] inputs match.
    /// - `AggregateError::MissingVarianceMaps` / `EmptySelection` for
    ///   `FEMA` contrasts that cannot be combined.
    /// - Wrapped metadata, design, engine, store, and results errors.
    pub fn run(&self, inputs: &SecondLevelInputs) -> AggregateResult<LevelResults> {
        self.options.validate()?;
        let query = inputs.query.clone().unwrap_or_else(|| inputs.contrasts.shared_entities());

        let metadata = flatten_nested(&inputs.stat_metadata);
        let effects = flatten_nested(&inputs.effect_maps);
        let filtered = filter_by_entities(&query, &metadata, &effects, CONTRAST_KEY)?;
        let variances = match &inputs.variance_maps {
            Some(nested) => {
                let flat = flatten_nested(nested);
                if flat.len() != effects.len() {
                    return Err(MetadataError::LengthMismatch {
                        what: "effect/variance",
                        expected: effects.len(),
                        actual: flat.len(),
                    }
                    .into());
                }
                Some(filtered.select(&flat, "variance maps")?)
            }
            None => None,
        };

        let design = GroupingDesign::from_names(&filtered.names);
        let resolution = prepare_contrasts(&inputs.contrasts, design.columns());
        info!(
            inputs = filtered.len(),
            groups = design.columns().len(),
            contrasts = resolution.resolved.len(),
            skipped = resolution.skipped.len(),
            "running second-level aggregation"
        );

        let mut model = resolution
            .first_fitted_stat()
            .map(|stat| self.fit_inputs(stat, &design, &filtered.payloads))
            .transpose()?;

        let mut assembler = ResultAssembler::new(query).with_skipped(resolution.skipped.clone());
        for contrast in &resolution.resolved {
            let maps = match contrast.stat {
                StatType::Fema => {
                    self.fixed_effects(contrast, &design, &filtered.payloads, variances.as_deref())?
                }
                stat => {
                    let fitted = match &mut model {
                        Some(fitted) => fitted,
                        slot => slot.insert(self.fit_inputs(stat, &design, &filtered.payloads)?),
                    };
                    fitted.compute_contrast(contrast.weights.view(), EngineStat::try_from(stat)?)?
                }
            };
            emit_contrast(&self.store, &self.options.output_dir, &mut assembler, contrast, maps)?;
        }
        Ok(assembler.finish())
    }

    /// Fit the engine once on the stacked `inputs` against the grouping design.
    fn fit_inputs(
        &self, stat: StatType, design: &GroupingDesign, inputs: &[PathBuf],
    ) -> AggregateResult<E::Model> {
        if inputs.len() < MIN_FIT_INPUTS {
            return Err(AggregateError::InsufficientInputs {
                stat,
                required: MIN_FIT_INPUTS,
                found: inputs.len(),
            });
        }
        let data = self.store.read_stacked(inputs)?;
        let frame = design.to_frame()?;
        Ok(self.engine.fit(data.view(), &frame, &self.options.fit_options())?)
    }

    fn fixed_effects(
        &self, contrast: &ResolvedContrast, design: &GroupingDesign, effects: &[PathBuf],
        variances: Option<&[PathBuf]>,
    ) -> AggregateResult<ContrastMaps> {
        let variances = variances
            .ok_or_else(|| AggregateError::MissingVarianceMaps { contrast: contrast.name.clone() })?;
        let rows = design.rows_in_columns(&contrast.nonzero_columns());
        if rows.is_empty() {
            return Err(AggregateError::EmptySelection { contrast: contrast.name.clone() });
        }
        debug!(contrast = %contrast.name, selected = rows.len(), "combining fixed effects");

        let effect_paths: Vec<PathBuf> = rows.iter().map(|&r| effects[r].clone()).collect();
        let variance_paths: Vec<PathBuf> = rows.iter().map(|&r| variances[r].clone()).collect();
        let e = self.store.read_stacked(&effect_paths)?;
        let v = self.store.read_stacked(&variance_paths)?;
        let fx = self.combiner.combine(e.view(), v.view())?;

        Ok(ContrastMaps::new()
            .with(OutputKind::EffectSize, fx.effect)
            .with(OutputKind::EffectVariance, fx.variance)
            .with(OutputKind::Stat, fx.stat))
    }
}

//! engine::types — vocabulary shared by statistics engines and aggregators.
//!
//! Purpose
//! -------
//! Name the per-contrast output maps ([`OutputKind`]), carry them in a
//! kind-ordered container ([`ContrastMaps`]), and describe the engine-level
//! statistic ([`EngineStat`]) and fit options ([`FitOptions`]).
//!
//! Conventions
//! -----------
//! - A map is a flat `Array1<f64>` with one value per voxel (or vertex);
//!   spatial layout is the map store's concern.
//! - [`OutputKind`] orders as listed, which is the processing order used by
//!   the result assembler.
use std::collections::BTreeMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{
    contrasts::StatType,
    engine::errors::{EngineError, EngineResult},
};

/// One statistic map, flattened.
pub type StatMap = Array1<f64>;

/// OutputKind — the five per-contrast map kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    EffectSize,
    EffectVariance,
    ZScore,
    PValue,
    Stat,
}

impl OutputKind {
    pub const ALL: [OutputKind; 5] = [
        OutputKind::EffectSize,
        OutputKind::EffectVariance,
        OutputKind::ZScore,
        OutputKind::PValue,
        OutputKind::Stat,
    ];

    /// File-name suffix, e.g. `effect_size`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::EffectSize => "effect_size",
            OutputKind::EffectVariance => "effect_variance",
            OutputKind::ZScore => "z_score",
            OutputKind::PValue => "p_value",
            OutputKind::Stat => "stat",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ContrastMaps — the maps produced for one contrast, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContrastMaps(BTreeMap<OutputKind, StatMap>);

impl ContrastMaps {
    pub fn new() -> Self {
        ContrastMaps::default()
    }

    pub fn with(mut self, kind: OutputKind, map: StatMap) -> Self {
        self.0.insert(kind, map);
        self
    }

    pub fn insert(&mut self, kind: OutputKind, map: StatMap) -> Option<StatMap> {
        self.0.insert(kind, map)
    }

    pub fn get(&self, kind: OutputKind) -> Option<&StatMap> {
        self.0.get(&kind)
    }

    pub fn contains(&self, kind: OutputKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = OutputKind> + '_ {
        self.0.keys().copied()
    }

    /// Maps in [`OutputKind`] order.
    pub fn iter(&self) -> impl Iterator<Item = (OutputKind, &StatMap)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for ContrastMaps {
    type Item = (OutputKind, StatMap);
    type IntoIter = std::collections::btree_map::IntoIter<OutputKind, StatMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// EngineStat — statistic an engine computes for a contrast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineStat {
    T,
    F,
}

impl TryFrom<StatType> for EngineStat {
    type Error = EngineError;

    fn try_from(stat: StatType) -> EngineResult<Self> {
        match stat {
            StatType::T => Ok(EngineStat::T),
            StatType::F => Ok(EngineStat::F),
            StatType::Fema => Err(EngineError::UnsupportedStat(stat)),
        }
    }
}

/// FitOptions — options passed to [`StatsEngine::fit`].
///
/// Fields
/// ------
/// - `smoothing_fwhm`: optional spatial smoothing kernel width (mm).
///
/// [`StatsEngine::fit`]: crate::engine::StatsEngine::fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    #[serde(default)]
    pub smoothing_fwhm: Option<f64>,
}

//! results::assembler — package per-contrast outputs for downstream stages.
//!
//! Purpose
//! -------
//! Collect, for each processed contrast, one metadata record and the paths
//! of the maps written for it, and expose them as position-aligned lists.
//!
//! Key behaviors
//! -------------
//! - Records are kept in push (contrast processing) order.
//! - The metadata record is the query entities overlaid with
//!   `{contrast: name, stat: type}`; those two keys win on collision.
//! - [`LevelResults::paths`] returns `None` for a kind no contrast produced;
//!   [`LevelResults::aligned`] always returns one slot per contrast.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output paths are unique across one assembler; a repeated path is a
//!   fatal [`ResultsError::DuplicateOutputPath`].
use std::{
    collections::{BTreeMap, HashSet},
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use crate::{
    contrasts::{SkippedContrast, StatType},
    engine::OutputKind,
    metadata::{CONTRAST_KEY, Entities, STAT_KEY},
    results::errors::{ResultsError, ResultsResult},
};

/// ContrastOutputs — the paths written for one contrast, by kind.
pub type ContrastOutputs = BTreeMap<OutputKind, PathBuf>;

#[derive(Debug, Clone, Default)]
pub struct ResultAssembler {
    query: Entities,
    metadata: Vec<Entities>,
    outputs: Vec<ContrastOutputs>,
    seen: HashSet<PathBuf>,
    skipped: Vec<SkippedContrast>,
}

impl ResultAssembler {
    /// `query` entities are attached to every metadata record.
    pub fn new(query: Entities) -> Self {
        ResultAssembler { query, ..Default::default() }
    }

    pub fn with_skipped(mut self, skipped: Vec<SkippedContrast>) -> Self {
        self.skipped = skipped;
        self
    }

    /// Record one contrast.
    ///
    /// Errors
    /// ------
    /// - `ResultsError::DuplicateOutputPath` if any path was already pushed;
    ///   the assembler is left unchanged in that case.
    pub fn push(&mut self, name: &str, stat: StatType, outputs: ContrastOutputs) -> ResultsResult<()> {
        let mut fresh = HashSet::with_capacity(outputs.len());
        for path in outputs.values() {
            if self.seen.contains(path) || !fresh.insert(path.clone()) {
                return Err(ResultsError::DuplicateOutputPath(path.clone()));
            }
        }
        self.seen.extend(fresh);

        let record = Entities::new().with(CONTRAST_KEY, name).with(STAT_KEY, stat.as_str());
        self.metadata.push(self.query.merged(&record));
        self.outputs.push(outputs);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    pub fn finish(self) -> LevelResults {
        LevelResults { metadata: self.metadata, outputs: self.outputs, skipped: self.skipped }
    }
}

/// LevelResults — assembled outputs of one level invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevelResults {
    metadata: Vec<Entities>,
    outputs: Vec<ContrastOutputs>,
    skipped: Vec<SkippedContrast>,
}

impl LevelResults {
    /// One record per processed contrast, in processing order.
    pub fn metadata(&self) -> &[Entities] {
        &self.metadata
    }

    /// Declarations dropped during resolution.
    pub fn skipped(&self) -> &[SkippedContrast] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }

    /// Per-contrast paths for `kind`, `None` where a contrast lacks it.
    pub fn aligned(&self, kind: OutputKind) -> Vec<Option<PathBuf>> {
        self.outputs.iter().map(|o| o.get(&kind).cloned()).collect()
    }

    /// Paths for `kind` in processing order, or `None` if no contrast
    /// produced it.
    pub fn paths(&self, kind: OutputKind) -> Option<Vec<PathBuf>> {
        let paths: Vec<PathBuf> = self.outputs.iter().filter_map(|o| o.get(&kind).cloned()).collect();
        if paths.is_empty() { None } else { Some(paths) }
    }

    /// Serializable view keyed the way downstream pipeline stages expect.
    pub fn to_outputs(&self) -> LevelOutputs {
        LevelOutputs {
            effect_maps: self.paths(OutputKind::EffectSize),
            variance_maps: self.paths(OutputKind::EffectVariance),
            zscore_maps: self.paths(OutputKind::ZScore),
            pvalue_maps: self.paths(OutputKind::PValue),
            stat_maps: self.paths(OutputKind::Stat),
            contrast_metadata: self.metadata.clone(),
        }
    }
}

/// LevelOutputs — JSON-friendly result lists; absent kinds are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelOutputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_maps: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance_maps: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zscore_maps: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pvalue_maps: Option<Vec<PathBuf>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stat_maps: Option<Vec<PathBuf>>,
    pub contrast_metadata: Vec<Entities>,
}

//! contrasts::types — declared and resolved contrast value types.
//!
//! Purpose
//! -------
//! Define the typed vocabulary shared by the resolver, the matrix builder
//! and the aggregators: statistic codes, validated weight rows, contrast
//! declarations (as read from a model description), the "undefined"
//! sentinel, and the dense resolved form handed to a statistics engine.
//!
//! Key behaviors
//! -------------
//! - [`StatType`] parses the pipeline codes `t`, `F`, `FEMA` and prints them
//!   back in canonical form.
//! - [`WeightRow`] is an insertion-ordered `regressor → weight` map whose
//!   constructor rejects empty regressor names and non-finite weights.
//! - [`ContrastDeclaration`] validates its name at construction (including
//!   when decoded from JSON).
//! - [`ContrastSpec`] is either `Undefined` (JSON `null`) or a declared list.
//! - [`ResolvedContrast`] carries a dense `[rows × regressors]` matrix.
//!
//! Invariants & assumptions
//! ------------------------
//! - A `WeightRow` never contains NaN/±∞ and never an empty key.
//! - A `ContrastDeclaration` name is never empty.
//! - A `ResolvedContrast` matrix has exactly as many columns as the
//!   regressor list it was resolved against.
use std::collections::HashSet;

use indexmap::IndexMap;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    contrasts::errors::{ContrastError, ContrastResult},
    metadata::entities::Entities,
};

/// StatType — statistic requested for a contrast.
///
/// Variants
/// --------
/// - `T`: single-row t-test.
/// - `F`: (possibly multi-row) F-test.
/// - `Fema`: fixed-effects meta-analytic combination of lower-level
///   estimates; no model is fitted for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatType {
    #[default]
    T,
    F,
    Fema,
}

impl StatType {
    /// Canonical pipeline code.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatType::T => "t",
            StatType::F => "F",
            StatType::Fema => "FEMA",
        }
    }

    /// Whether this contrast needs a fitted model.
    pub fn requires_fit(&self) -> bool {
        !matches!(self, StatType::Fema)
    }
}

impl std::fmt::Display for StatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StatType {
    type Err = ContrastError;

    fn from_str(s: &str) -> ContrastResult<Self> {
        match s {
            "t" | "T" => Ok(StatType::T),
            "F" | "f" => Ok(StatType::F),
            "FEMA" => Ok(StatType::Fema),
            other => Err(ContrastError::UnknownStatType(other.to_owned())),
        }
    }
}

impl TryFrom<String> for StatType {
    type Error = ContrastError;

    fn try_from(value: String) -> ContrastResult<Self> {
        value.parse()
    }
}

impl From<StatType> for String {
    fn from(value: StatType) -> String {
        value.as_str().to_owned()
    }
}

/// WeightRow — ordered `regressor → weight` mapping.
///
/// Purpose
/// -------
/// One row of a contrast's weight block. Regressors absent from the row
/// implicitly carry weight 0.
///
/// Invariants
/// ----------
/// - Keys are non-empty; values are finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, f64>", into = "IndexMap<String, f64>")]
pub struct WeightRow(IndexMap<String, f64>);

impl WeightRow {
    /// Build a validated row from `(regressor, weight)` pairs.
    ///
    /// Errors
    /// ------
    /// - `ContrastError::EmptyRegressorName` for an empty key.
    /// - `ContrastError::NonFiniteWeight` for NaN/±∞ weights.
    ///
    /// Notes
    /// -----
    /// - A repeated regressor keeps its first position and its last weight.
    pub fn new<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> ContrastResult<Self> {
        let mut row = IndexMap::new();
        for (name, weight) in pairs {
            let name: String = name.into();
            if name.is_empty() {
                return Err(ContrastError::EmptyRegressorName);
            }
            if !weight.is_finite() {
                return Err(ContrastError::NonFiniteWeight { regressor: name, value: weight });
            }
            row.insert(name, weight);
        }
        Ok(WeightRow(row))
    }

    /// Weight of `regressor`, or `0.0` when the row does not mention it.
    pub fn weight(&self, regressor: &str) -> f64 {
        self.0.get(regressor).copied().unwrap_or(0.0)
    }

    /// Regressors carrying a non-zero weight, in row order.
    pub fn needed(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|(_, w)| **w != 0.0).map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<IndexMap<String, f64>> for WeightRow {
    type Error = ContrastError;

    fn try_from(value: IndexMap<String, f64>) -> ContrastResult<Self> {
        WeightRow::new(value)
    }
}

impl From<WeightRow> for IndexMap<String, f64> {
    fn from(value: WeightRow) -> Self {
        value.0
    }
}

/// ContrastDeclaration — one named contrast as written in a model description.
///
/// Fields
/// ------
/// - `name`: non-empty contrast name; also used to name output files.
/// - `weights`: zero or more [`WeightRow`]s (more than one for F-tests).
/// - `stat`: requested statistic (`"type"` in JSON).
/// - `entities`: entities shared by the outputs of this contrast; absent in
///   JSON means empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDeclaration")]
pub struct ContrastDeclaration {
    pub name: String,
    pub weights: Vec<WeightRow>,
    #[serde(rename = "type")]
    pub stat: StatType,
    #[serde(default, skip_serializing_if = "Entities::is_empty")]
    pub entities: Entities,
}

#[derive(Deserialize)]
struct RawDeclaration {
    name: String,
    #[serde(default)]
    weights: Vec<WeightRow>,
    #[serde(rename = "type", default)]
    stat: StatType,
    #[serde(default)]
    entities: Entities,
}

impl TryFrom<RawDeclaration> for ContrastDeclaration {
    type Error = ContrastError;

    fn try_from(raw: RawDeclaration) -> ContrastResult<Self> {
        ContrastDeclaration::new(raw.name, raw.weights, raw.stat)
            .map(|decl| decl.with_entities(raw.entities))
    }
}

impl ContrastDeclaration {
    /// Errors
    /// ------
    /// - `ContrastError::EmptyContrastName` when `name` is empty.
    pub fn new(
        name: impl Into<String>, weights: Vec<WeightRow>, stat: StatType,
    ) -> ContrastResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ContrastError::EmptyContrastName);
        }
        Ok(ContrastDeclaration { name, weights, stat, entities: Entities::new() })
    }

    pub fn with_entities(mut self, entities: Entities) -> Self {
        self.entities = entities;
        self
    }

    /// Regressors with non-zero weight in any row that are not in `present`,
    /// deduplicated, in first-mention order.
    pub fn missing_regressors(&self, present: &HashSet<&str>) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for name in self.weights.iter().flat_map(WeightRow::needed) {
            if !present.contains(name) && !missing.iter().any(|m| m == name) {
                missing.push(name.to_owned());
            }
        }
        missing
    }
}

/// ContrastSpec — declared contrasts, or the "undefined" sentinel.
///
/// Notes
/// -----
/// - Decodes from JSON `null` as `Undefined` and from an array as
///   `Declared`; `Undefined` always resolves to no contrasts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<ContrastDeclaration>>", into = "Option<Vec<ContrastDeclaration>>")]
pub enum ContrastSpec {
    #[default]
    Undefined,
    Declared(Vec<ContrastDeclaration>),
}

impl ContrastSpec {
    /// Parse a JSON array of declarations or `null`.
    pub fn from_json(text: &str) -> ContrastResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, ContrastSpec::Declared(_))
    }

    pub fn declarations(&self) -> &[ContrastDeclaration] {
        match self {
            ContrastSpec::Undefined => &[],
            ContrastSpec::Declared(decls) => decls,
        }
    }

    /// Entities attached to the first declaration.
    ///
    /// All declarations handed to one invocation describe the same analysis
    /// unit, so the first one speaks for all. Empty when nothing is declared.
    pub fn shared_entities(&self) -> Entities {
        self.declarations().first().map(|d| d.entities.clone()).unwrap_or_default()
    }
}

impl From<Option<Vec<ContrastDeclaration>>> for ContrastSpec {
    fn from(value: Option<Vec<ContrastDeclaration>>) -> Self {
        match value {
            None => ContrastSpec::Undefined,
            Some(decls) => ContrastSpec::Declared(decls),
        }
    }
}

impl From<ContrastSpec> for Option<Vec<ContrastDeclaration>> {
    fn from(value: ContrastSpec) -> Self {
        match value {
            ContrastSpec::Undefined => None,
            ContrastSpec::Declared(decls) => Some(decls),
        }
    }
}

/// ResolvedContrast — a declaration aligned to a concrete regressor list.
///
/// Fields
/// ------
/// - `name`: declaration name.
/// - `weights`: `[n_rows × n_regressors]`, columns in design order.
/// - `stat`: requested statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContrast {
    pub name: String,
    pub weights: Array2<f64>,
    pub stat: StatType,
}

impl ResolvedContrast {
    /// Column indices that carry a non-zero weight in any row.
    pub fn nonzero_columns(&self) -> Vec<usize> {
        (0..self.weights.ncols())
            .filter(|&j| self.weights.column(j).iter().any(|&w| w != 0.0))
            .collect()
    }
}

/// SkippedContrast — a declaration dropped because regressors were absent.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedContrast {
    pub name: String,
    pub missing: Vec<String>,
}

/// ContrastResolution — resolver output plus the non-fatal skip diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContrastResolution {
    pub resolved: Vec<ResolvedContrast>,
    pub skipped: Vec<SkippedContrast>,
}

impl ContrastResolution {
    /// Whether any resolved contrast needs a fitted model.
    pub fn requires_fit(&self) -> bool {
        self.resolved.iter().any(|c| c.stat.requires_fit())
    }

    /// First resolved statistic that needs a fitted model, if any.
    pub fn first_fitted_stat(&self) -> Option<StatType> {
        self.resolved.iter().map(|c| c.stat).find(StatType::requires_fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Parsing/printing of statistic codes.
    // - WeightRow validation and JSON decoding.
    // - ContrastSpec null/array decoding and shared entities.
    // - `nonzero_columns` on multi-row weight blocks.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that pipeline codes parse and print canonically.
    //
    // Given
    // -----
    // - Codes `t`, `T`, `F`, `FEMA`, and `z`.
    //
    // Expect
    // ------
    // - Known codes parse; `T` prints back as `t`; `z` is rejected.
    fn stat_type_parses_pipeline_codes() {
        assert_eq!("t".parse::<StatType>().unwrap(), StatType::T);
        assert_eq!("T".parse::<StatType>().unwrap().to_string(), "t");
        assert_eq!("F".parse::<StatType>().unwrap(), StatType::F);
        assert_eq!("FEMA".parse::<StatType>().unwrap(), StatType::Fema);
        assert_eq!("z".parse::<StatType>(), Err(ContrastError::UnknownStatType("z".into())));
    }

    #[test]
    // Purpose
    // -------
    // Ensure WeightRow rejects non-finite weights and empty names.
    //
    // Given
    // -----
    // - `[("A", inf)]` and `[("", 1.0)]`.
    //
    // Expect
    // ------
    // - `NonFiniteWeight` and `EmptyRegressorName` respectively.
    fn weight_row_rejects_invalid_entries() {
        let inf = WeightRow::new([("A", f64::INFINITY)]).unwrap_err();
        let empty = WeightRow::new([("", 1.0)]).unwrap_err();

        assert!(matches!(inf, ContrastError::NonFiniteWeight { .. }));
        assert_eq!(empty, ContrastError::EmptyRegressorName);
    }

    #[test]
    // Purpose
    // -------
    // Check that `needed` only lists non-zero weights in row order.
    //
    // Given
    // -----
    // - Row `{B: 0, A: 1, C: -1}`.
    //
    // Expect
    // ------
    // - `["A", "C"]`.
    fn weight_row_needed_skips_zero_weights() {
        let row = WeightRow::new([("B", 0.0), ("A", 1.0), ("C", -1.0)]).unwrap();

        assert_eq!(row.needed().collect::<Vec<_>>(), vec!["A", "C"]);
        assert_eq!(row.weight("missing"), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify JSON decoding of a declaration list, default type, and `null`.
    //
    // Given
    // -----
    // - A list with one declaration lacking `type`, and the literal `null`.
    //
    // Expect
    // ------
    // - `Declared` with `StatType::T`; `null` decodes as `Undefined`.
    fn contrast_spec_decodes_list_and_null() {
        let spec = ContrastSpec::from_json(
            r#"[{"name": "A-B", "weights": [{"A": 1, "B": -1}],
                 "entities": {"subject": "01"}}]"#,
        )
        .unwrap();
        let undefined = ContrastSpec::from_json("null").unwrap();

        assert_eq!(spec.declarations().len(), 1);
        assert_eq!(spec.declarations()[0].stat, StatType::T);
        assert_eq!(spec.shared_entities(), Entities::new().with("subject", "01"));
        assert_eq!(undefined, ContrastSpec::Undefined);
        assert!(undefined.declarations().is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Ensure an empty contrast name is rejected even through serde.
    //
    // Given
    // -----
    // - `[{"name": "", "weights": [], "type": "t"}]`.
    //
    // Expect
    // ------
    // - `from_json` returns an error.
    fn contrast_spec_rejects_empty_name_from_json() {
        let result = ContrastSpec::from_json(r#"[{"name": "", "weights": [], "type": "t"}]"#);

        assert!(matches!(result, Err(ContrastError::Json(_))));
    }

    #[test]
    // Purpose
    // -------
    // Check `nonzero_columns` across a two-row (F-style) block.
    //
    // Given
    // -----
    // - Weights `[[1, 0, 0], [0, 0, -1]]`.
    //
    // Expect
    // ------
    // - Columns `[0, 2]`.
    fn nonzero_columns_unions_rows() {
        let contrast = ResolvedContrast {
            name: "F".into(),
            weights: array![[1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
            stat: StatType::F,
        };

        assert_eq!(contrast.nonzero_columns(), vec![0, 2]);
    }
}

//! contrasts::builder — contrast tables and identity-augmented contrast matrices.
//!
//! Purpose
//! -------
//! Provide the table-oriented variant of contrast resolution: a
//! [`ContrastTable`] (one row per contrast, one column per regressor, plus
//! an optional statistic type per row) is transposed and re-indexed onto a
//! design's regressors, and identity contrasts are synthesized for a chosen
//! set of explanatory regressors.
//!
//! Key behaviors
//! -------------
//! - Output weights are `[n_regressors × n_contrasts]` (transposed relative
//!   to the table) with rows in design order.
//! - Regressors present in the design but absent from the table get zero
//!   weights; table columns absent from the design are dropped.
//! - Each identity regressor gets a unit column of type `t`, unless a
//!   contrast of the same name already exists, in which case that column
//!   keeps its explicit weights and type but receives weight 1 at its own
//!   regressor row.
//! - Rows without an explicit type default to `t`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output column set = explicit contrast names ∪ identity names that are
//!   present in the design; explicit columns come first, in table order,
//!   then appended identity columns in identity order.
//! - Identity names absent from the design are skipped with a warning.
use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contrasts::{
    errors::{ContrastError, ContrastResult},
    types::{ContrastDeclaration, ResolvedContrast, StatType},
};

/// IdentitySet — regressors that always receive a single-regressor contrast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySet {
    #[default]
    None,
    /// Every design regressor.
    All,
    Named(Vec<String>),
}

impl IdentitySet {
    fn names(&self, regressors: &[String]) -> Vec<String> {
        match self {
            IdentitySet::None => Vec::new(),
            IdentitySet::All => regressors.to_vec(),
            IdentitySet::Named(names) => names.clone(),
        }
    }
}

/// ContrastTable — contrasts laid out as rows over regressor columns.
///
/// Fields
/// ------
/// - `names`: contrast names (row labels), unique and non-empty.
/// - `columns`: regressor names (column labels), unique and non-empty.
/// - `weights`: `[names.len() × columns.len()]`, finite.
/// - `types`: optional statistic per row; `None` means "default".
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastTable {
    names: Vec<String>,
    columns: Vec<String>,
    weights: Array2<f64>,
    types: Vec<Option<StatType>>,
}

impl ContrastTable {
    /// Build a validated table.
    ///
    /// Errors
    /// ------
    /// - `ContrastError::TableShape` when `weights` or `types` disagree with
    ///   the label lengths.
    /// - `ContrastError::DuplicateName` for repeated row or column labels.
    /// - `ContrastError::EmptyContrastName` / `EmptyRegressorName` for empty
    ///   labels.
    /// - `ContrastError::NonFiniteWeight` for NaN/±∞ entries.
    pub fn new(
        names: Vec<String>, columns: Vec<String>, weights: Array2<f64>,
        types: Vec<Option<StatType>>,
    ) -> ContrastResult<Self> {
        if weights.nrows() != names.len() {
            return Err(ContrastError::TableShape {
                what: "row count",
                expected: names.len(),
                actual: weights.nrows(),
            });
        }
        if weights.ncols() != columns.len() {
            return Err(ContrastError::TableShape {
                what: "column count",
                expected: columns.len(),
                actual: weights.ncols(),
            });
        }
        if types.len() != names.len() {
            return Err(ContrastError::TableShape {
                what: "type count",
                expected: names.len(),
                actual: types.len(),
            });
        }
        check_labels(&names, "contrast", ContrastError::EmptyContrastName)?;
        check_labels(&columns, "regressor", ContrastError::EmptyRegressorName)?;
        for ((i, j), &value) in weights.indexed_iter() {
            if !value.is_finite() {
                return Err(ContrastError::NonFiniteWeight {
                    regressor: format!("{}[{}]", columns[j], names[i]),
                    value,
                });
            }
        }
        Ok(ContrastTable { names, columns, weights, types })
    }

    /// Lay single-row declarations out as a table.
    ///
    /// Columns are the union of regressors mentioned by any declaration, in
    /// first-mention order; unmentioned cells are 0.
    ///
    /// Errors
    /// ------
    /// - `ContrastError::MultiRowDeclaration` for declarations whose weight
    ///   list does not have exactly one row.
    /// - Any error of [`ContrastTable::new`] (e.g. duplicate names).
    pub fn from_declarations(decls: &[ContrastDeclaration]) -> ContrastResult<Self> {
        let mut columns: Vec<String> = Vec::new();
        for decl in decls {
            if decl.weights.len() != 1 {
                return Err(ContrastError::MultiRowDeclaration {
                    name: decl.name.clone(),
                    rows: decl.weights.len(),
                });
            }
            for (reg, _) in decl.weights[0].iter() {
                if !columns.contains(reg) {
                    columns.push(reg.clone());
                }
            }
        }
        let weights = Array2::from_shape_fn((decls.len(), columns.len()), |(i, j)| {
            decls[i].weights[0].weight(&columns[j])
        });
        let names = decls.iter().map(|d| d.name.clone()).collect();
        let types = decls.iter().map(|d| Some(d.stat)).collect();
        ContrastTable::new(names, columns, weights, types)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }
}

fn check_labels(labels: &[String], axis: &'static str, empty: ContrastError) -> ContrastResult<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if label.is_empty() {
            return Err(empty);
        }
        if !seen.insert(label.as_str()) {
            return Err(ContrastError::DuplicateName { axis, name: label.clone() });
        }
    }
    Ok(())
}

/// ContrastMatrix — design-aligned weights, one column per contrast.
///
/// Fields
/// ------
/// - `regressors`: design regressor names (row labels).
/// - `contrasts`: contrast names (column labels).
/// - `weights`: `[regressors.len() × contrasts.len()]`.
/// - `types`: statistic per contrast column.
#[derive(Debug, Clone, PartialEq)]
pub struct ContrastMatrix {
    pub regressors: Vec<String>,
    pub contrasts: Vec<String>,
    pub weights: Array2<f64>,
    pub types: Vec<StatType>,
}

impl ContrastMatrix {
    /// Weight column of the named contrast.
    pub fn column(&self, contrast: &str) -> Option<ArrayView1<'_, f64>> {
        let k = self.contrasts.iter().position(|c| c == contrast)?;
        Some(self.weights.column(k))
    }

    /// One single-row [`ResolvedContrast`] per column, in column order.
    pub fn into_resolved(self) -> Vec<ResolvedContrast> {
        let n_reg = self.regressors.len();
        self.contrasts
            .into_iter()
            .zip(self.types)
            .enumerate()
            .map(|(k, (name, stat))| {
                let weights = Array2::from_shape_fn((1, n_reg), |(_, r)| self.weights[[r, k]]);
                ResolvedContrast { name, weights, stat }
            })
            .collect()
    }
}

/// Build a design-aligned contrast matrix with identity contrasts.
///
/// Parameters
/// ----------
/// - `table`: explicit contrasts (rows) over regressors (columns).
/// - `regressors`: design column names, in design order.
/// - `identity`: regressors that must each own a unit contrast.
///
/// Returns
/// -------
/// `ContrastMatrix` whose rows follow `regressors` and whose columns are
/// the explicit contrasts followed by appended identity contrasts.
pub fn build_contrast_matrix(
    table: &ContrastTable, regressors: &[String], identity: &IdentitySet,
) -> ContrastMatrix {
    let table_col: HashMap<&str, usize> =
        table.columns.iter().enumerate().map(|(j, c)| (c.as_str(), j)).collect();
    let design_set: HashSet<&str> = regressors.iter().map(String::as_str).collect();

    let dropped: Vec<&str> =
        table.columns.iter().map(String::as_str).filter(|c| !design_set.contains(c)).collect();
    if !dropped.is_empty() {
        debug!(?dropped, "contrast table columns absent from design were dropped");
    }

    // Column-major working copy: one weight vector (design order) per contrast.
    let mut names = table.names.clone();
    let mut types: Vec<StatType> = table.types.iter().map(|t| t.unwrap_or_default()).collect();
    let mut cols: Vec<Vec<f64>> = (0..table.names.len())
        .map(|k| {
            regressors
                .iter()
                .map(|r| table_col.get(r.as_str()).map_or(0.0, |&j| table.weights[[k, j]]))
                .collect()
        })
        .collect();

    for id in identity.names(regressors) {
        let Some(row) = regressors.iter().position(|r| *r == id) else {
            warn!(regressor = %id, "identity regressor absent from design; skipped");
            continue;
        };
        match names.iter().position(|n| *n == id) {
            Some(k) => cols[k][row] = 1.0,
            None => {
                let mut unit = vec![0.0; regressors.len()];
                unit[row] = 1.0;
                cols.push(unit);
                names.push(id);
                types.push(StatType::T);
            }
        }
    }

    let weights = Array2::from_shape_fn((regressors.len(), cols.len()), |(r, k)| cols[k][r]);
    ContrastMatrix { regressors: regressors.to_vec(), contrasts: names, weights, types }
}

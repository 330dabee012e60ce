//! design::confounds — dense confound regressors and drift-model selection.
//!
//! Purpose
//! -------
//! Prepare the dense (per-volume) regressors that accompany the event
//! model in a first-level design: detect columns that are entirely missing,
//! either drop them or fail with an actionable message, and decide whether
//! a cosine drift basis still needs to be generated.
//!
//! Key behaviors
//! -------------
//! - Missing values are encoded as NaN. A column is *empty* when every value
//!   is NaN (a zero-row table has no empty columns).
//! - With `drop_missing`, empty columns are removed; without it, any empty
//!   column aborts with [`DesignError::EmptyColumns`].
//! - A table left with no columns is reported as `None`.
//! - [`select_drift_model`] returns `None` when the confounds already carry a
//!   cosine basis (`cosine00` or `cosine_00`), `Cosine` otherwise.
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::design::errors::{DesignError, DesignResult};

/// Column names that mark an existing cosine drift basis.
pub const COSINE_MARKERS: [&str; 2] = ["cosine00", "cosine_00"];

/// DriftModel — low-frequency drift basis requested from the design builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftModel {
    Cosine,
}

/// ConfoundTable — named dense regressors, one row per volume.
///
/// Invariants
/// ----------
/// - `values.ncols() == columns.len()`; NaN marks a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfoundTable {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl ConfoundTable {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> DesignResult<Self> {
        if values.ncols() != columns.len() {
            return Err(DesignError::ShapeMismatch {
                what: "confound column count",
                expected: columns.len(),
                actual: values.ncols(),
            });
        }
        Ok(ConfoundTable { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Names of columns whose every value is missing.
    pub fn empty_columns(&self) -> Vec<String> {
        if self.values.nrows() == 0 {
            return Vec::new();
        }
        self.columns
            .iter()
            .zip(self.values.columns())
            .filter(|(_, col)| col.iter().all(|v| v.is_nan()))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn without(&self, drop: &[String]) -> ConfoundTable {
        let keep: Vec<usize> =
            (0..self.columns.len()).filter(|&j| !drop.contains(&self.columns[j])).collect();
        ConfoundTable {
            columns: keep.iter().map(|&j| self.columns[j].clone()).collect(),
            values: self.values.select(Axis(1), &keep),
        }
    }
}

/// Validate confounds against the drop-missing policy.
///
/// Returns
/// -------
/// `DesignResult<Option<ConfoundTable>>`
///   - `Ok(Some(table))` with empty columns removed (when allowed).
///   - `Ok(None)` when no columns remain.
///
/// Errors
/// ------
/// - `DesignError::EmptyColumns` when empty columns exist and
///   `drop_missing` is `false`.
pub fn prepare_confounds(
    table: ConfoundTable, drop_missing: bool,
) -> DesignResult<Option<ConfoundTable>> {
    let empty = table.empty_columns();
    let table = if empty.is_empty() {
        table
    } else if drop_missing {
        info!(columns = ?empty, "dropping empty confound columns");
        table.without(&empty)
    } else {
        return Err(DesignError::EmptyColumns { names: empty });
    };

    if table.is_empty() {
        debug!("no confound columns remain");
        return Ok(None);
    }
    Ok(Some(table))
}

/// Drift basis to request given the (prepared) confounds.
pub fn select_drift_model(confounds: Option<&ConfoundTable>) -> Option<DriftModel> {
    let has_cosine = confounds
        .map(|t| t.columns().iter().any(|c| COSINE_MARKERS.contains(&c.as_str())))
        .unwrap_or(false);
    if has_cosine { None } else { Some(DriftModel::Cosine) }
}

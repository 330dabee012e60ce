//! design::frame — labelled design matrices.
//!
//! Purpose
//! -------
//! Carry a design matrix together with its column (regressor) names. The
//! column order of a [`DesignFrame`] is the contract on which every
//! contrast alignment depends.
//!
//! Invariants & assumptions
//! ------------------------
//! - `matrix.ncols() == columns.len()`.
//! - Column names are non-empty and unique.
//! - Rows are observations (time points at the first level, inputs at the
//!   second level).
use std::collections::HashSet;

use ndarray::{Array2, ArrayView1};

use crate::design::errors::{DesignError, DesignResult};

/// DesignFrame — a design matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignFrame {
    columns: Vec<String>,
    matrix: Array2<f64>,
}

impl DesignFrame {
    /// Errors
    /// ------
    /// - `DesignError::ShapeMismatch` if the column count differs from the
    ///   number of names.
    /// - `DesignError::EmptyColumnName` / `DuplicateColumn` for bad labels.
    pub fn new(columns: Vec<String>, matrix: Array2<f64>) -> DesignResult<Self> {
        if matrix.ncols() != columns.len() {
            return Err(DesignError::ShapeMismatch {
                what: "column count",
                expected: columns.len(),
                actual: matrix.ncols(),
            });
        }
        let mut seen = HashSet::new();
        for name in &columns {
            if name.is_empty() {
                return Err(DesignError::EmptyColumnName);
            }
            if !seen.insert(name.as_str()) {
                return Err(DesignError::DuplicateColumn(name.clone()));
            }
        }
        Ok(DesignFrame { columns, matrix })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn n_rows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(self.matrix.column(j))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Validate label/shape checks of `DesignFrame::new`.
    //
    // Given
    // -----
    // - Two names for a 3-column matrix; duplicate names for a 2-column one.
    //
    // Expect
    // ------
    // - `ShapeMismatch`, then `DuplicateColumn("a")`.
    fn new_rejects_shape_and_duplicate_errors() {
        let shape = DesignFrame::new(vec!["a".into(), "b".into()], Array2::zeros((4, 3)));
        let dup = DesignFrame::new(vec!["a".into(), "a".into()], Array2::zeros((4, 2)));

        assert!(matches!(shape, Err(DesignError::ShapeMismatch { .. })));
        assert_eq!(dup.unwrap_err(), DesignError::DuplicateColumn("a".into()));
    }

    #[test]
    // Purpose
    // -------
    // Columns are addressable by name.
    //
    // Given
    // -----
    // - Frame `[x, constant]` over `[[1, 1], [2, 1]]`.
    //
    // Expect
    // ------
    // - `column("x") == [1, 2]`; unknown names return `None`.
    fn column_lookup_by_name() {
        let frame =
            DesignFrame::new(vec!["x".into(), "constant".into()], array![[1.0, 1.0], [2.0, 1.0]])
                .unwrap();

        assert_eq!(frame.column("x").unwrap().to_vec(), vec![1.0, 2.0]);
        assert!(frame.column("y").is_none());
    }
}

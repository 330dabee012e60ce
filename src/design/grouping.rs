//! design::grouping — dummy-coded grouping designs for higher levels.
//!
//! Purpose
//! -------
//! Build the one-hot design used at second and higher levels: one row per
//! filtered upstream input, one column per distinct contrast name observed
//! among those inputs.
//!
//! Key behaviors
//! -------------
//! - Column order is the order of **first appearance** of each distinct
//!   name in the input sequence. This rule is part of the public contract:
//!   the fixed-effects path selects inputs by column index, so the same
//!   order must be used when building the design and when slicing it.
//! - Every row has exactly one `1.0`, in the column of its own name.
//!
//! Invariants & assumptions
//! ------------------------
//! - `matrix.nrows() == names.len()` and `matrix.ncols() == columns.len()`.
//! - Row sums are exactly `1.0`.
use ndarray::Array2;

use crate::design::{errors::DesignResult, frame::DesignFrame};

/// GroupingDesign — one-hot input-by-name design.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingDesign {
    columns: Vec<String>,
    matrix: Array2<f64>,
}

impl GroupingDesign {
    /// Dummy-code `names` with first-appearance column order.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use rust_glm_levels::design::GroupingDesign;
    /// let design = GroupingDesign::from_names(&["B", "A", "B"]);
    /// assert_eq!(design.columns(), ["B".to_string(), "A".to_string()]);
    /// assert_eq!(design.matrix().row(2).to_vec(), vec![1.0, 0.0]);
    /// ```
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut membership = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let k = match columns.iter().position(|c| c == name) {
                Some(k) => k,
                None => {
                    columns.push(name.to_owned());
                    columns.len() - 1
                }
            };
            membership.push(k);
        }
        let mut matrix = Array2::zeros((names.len(), columns.len()));
        for (row, &k) in membership.iter().enumerate() {
            matrix[[row, k]] = 1.0;
        }
        GroupingDesign { columns, matrix }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn n_inputs(&self) -> usize {
        self.matrix.nrows()
    }

    /// Rows with a non-zero entry in any of `columns`, ascending.
    ///
    /// Out-of-range column indices are ignored.
    pub fn rows_in_columns(&self, columns: &[usize]) -> Vec<usize> {
        let ncols = self.matrix.ncols();
        (0..self.matrix.nrows())
            .filter(|&r| columns.iter().any(|&c| c < ncols && self.matrix[[r, c]] != 0.0))
            .collect()
    }

    /// Labelled copy for handing to a statistics engine.
    pub fn to_frame(&self) -> DesignResult<DesignFrame> {
        DesignFrame::new(self.columns.clone(), self.matrix.clone())
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
    // - First-appearance column order (the declared tie-break rule).
    // - One-hot rows and the distinct-name column set.
    // - Row selection by column indices used by the fixed-effects path.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Two distinct inputs yield a 2×2 identity.
    //
    // Given
    // -----
    // - Names `[A, B]`.
    //
    // Expect
    // ------
    // - Columns `[A, B]`, matrix `I₂`.
    fn two_distinct_names_give_identity() {
        let design = GroupingDesign::from_names(&["A", "B"]);

        assert_eq!(design.columns(), ["A".to_string(), "B".to_string()]);
        assert_eq!(*design.matrix(), array![[1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Column order follows first appearance, not lexical order.
    //
    // Given
    // -----
    // - Names `[face, house, face, body, house]`.
    //
    // Expect
    // ------
    // - Columns `[face, house, body]`; each row sums to 1; the column set
    //   equals the distinct names.
    fn columns_follow_first_appearance_and_rows_are_one_hot() {
        let names = ["face", "house", "face", "body", "house"];

        let design = GroupingDesign::from_names(&names);

        assert_eq!(design.columns(), ["face", "house", "body"].map(String::from));
        for row in design.matrix().rows() {
            assert_eq!(row.sum(), 1.0);
        }
        assert_eq!(design.matrix().row(3).to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    // Purpose
    // -------
    // Row selection returns every input belonging to any chosen column.
    //
    // Given
    // -----
    // - Names `[A, B, A, C]`; columns `{0 (A), 2 (C)}`.
    //
    // Expect
    // ------
    // - Rows `[0, 2, 3]`.
    fn rows_in_columns_selects_members() {
        let design = GroupingDesign::from_names(&["A", "B", "A", "C"]);

        assert_eq!(design.rows_in_columns(&[0, 2]), vec![0, 2, 3]);
        assert!(design.rows_in_columns(&[]).is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Empty input yields an empty design.
    //
    // Given
    // -----
    // - No names.
    //
    // Expect
    // ------
    // - `0 × 0` matrix and no columns.
    fn empty_names_give_empty_design() {
        let design = GroupingDesign::from_names::<&str>(&[]);

        assert_eq!(design.matrix().dim(), (0, 0));
        assert!(design.columns().is_empty());
    }
}

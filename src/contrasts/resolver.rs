//! contrasts::resolver — align declared contrasts with a fitted design.
//!
//! Purpose
//! -------
//! Turn a [`ContrastSpec`] into dense weight matrices whose columns follow
//! the regressor order of a concrete design, dropping declarations that
//! cannot be honored by that design.
//!
//! Key behaviors
//! -------------
//! - `Undefined` resolves to an empty [`ContrastResolution`].
//! - A declaration is *resolvable* iff every regressor with a non-zero
//!   weight in any of its rows is present in the design. Unresolvable
//!   declarations are dropped whole (no partial contrasts), recorded in
//!   [`ContrastResolution::skipped`] and logged at `warn` level; they never
//!   fail the run.
//! - Resolvable declarations become `[n_rows × n_regressors]` matrices with
//!   zeros wherever a row does not mention a regressor.
//! - Output order equals declaration order; skipped declarations leave no
//!   gaps.
//!
//! Invariants & assumptions
//! ------------------------
//! - A declaration with an empty weights list is resolvable and yields a
//!   `0 × n_regressors` matrix.
//! - Regressors mentioned with weight 0 do not need to exist in the design.
//!
//! Downstream usage
//! ----------------
//! - First-level runs resolve against the fitted model's regressors;
//!   second-level runs resolve against the grouping design's columns.
use std::collections::HashSet;

use ndarray::Array2;
use tracing::{debug, warn};

use crate::contrasts::types::{
    ContrastDeclaration, ContrastResolution, ContrastSpec, ResolvedContrast, SkippedContrast,
};

/// Resolve every declaration of `spec` against `regressors`.
///
/// Parameters
/// ----------
/// - `spec`: declared contrasts or the undefined sentinel.
/// - `regressors`: design column names, in design order.
///
/// Returns
/// -------
/// `ContrastResolution` with resolved contrasts (declaration order) and the
/// declarations that were skipped together with their absent regressors.
///
/// Examples
/// --------
/// ```rust
/// # use rust_glm_levels::contrasts::{prepare_contrasts, ContrastSpec};
/// let spec = ContrastSpec::from_json(
///     r#"[{"name": "A-B", "weights": [{"A": 1, "B": -1}], "type": "t"}]"#,
/// ).unwrap();
/// let regressors: Vec<String> = ["A", "B", "constant"].map(String::from).to_vec();
///
/// let out = prepare_contrasts(&spec, &regressors);
/// assert_eq!(out.resolved[0].weights.row(0).to_vec(), vec![1.0, -1.0, 0.0]);
/// ```
pub fn prepare_contrasts(spec: &ContrastSpec, regressors: &[String]) -> ContrastResolution {
    let present: HashSet<&str> = regressors.iter().map(String::as_str).collect();
    let mut out = ContrastResolution::default();

    for decl in spec.declarations() {
        let missing = decl.missing_regressors(&present);
        if !missing.is_empty() {
            warn!(contrast = %decl.name, ?missing, "skipping contrast with absent regressors");
            out.skipped.push(SkippedContrast { name: decl.name.clone(), missing });
            continue;
        }
        out.resolved.push(resolve_one(decl, regressors));
    }

    debug!(
        resolved = out.resolved.len(),
        skipped = out.skipped.len(),
        n_regressors = regressors.len(),
        "resolved contrast declarations"
    );
    out
}

// Zero-filled `[rows × regressors]` block; assumes the declaration is resolvable.
fn resolve_one(decl: &ContrastDeclaration, regressors: &[String]) -> ResolvedContrast {
    let weights = Array2::from_shape_fn((decl.weights.len(), regressors.len()), |(i, j)| {
        decl.weights[i].weight(&regressors[j])
    });
    ResolvedContrast { name: decl.name.clone(), weights, stat: decl.stat }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contrasts::types::{StatType, WeightRow};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Zero-filled column alignment (round-trip of declared weights).
    // - Silent skipping of declarations with absent regressors, including
    //   the skip diagnostics.
    // - Undefined specs, empty weight lists, zero weights on absent
    //   regressors, and multi-row blocks.
    // -------------------------------------------------------------------------

    fn regs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn decl(name: &str, rows: Vec<Vec<(&str, f64)>>, stat: StatType) -> ContrastDeclaration {
        let rows = rows.into_iter().map(|r| WeightRow::new(r).unwrap()).collect();
        ContrastDeclaration::new(name, rows, stat).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // A-B difference contrast against a design that has both regressors.
    //
    // Given
    // -----
    // - Declaration `A-B: [{A: 1, B: -1}]`, type t.
    // - Regressors `[A, B, constant]`.
    //
    // Expect
    // ------
    // - One resolved contrast with matrix `[[1, -1, 0]]`.
    fn difference_contrast_is_zero_filled_in_design_order() {
        let spec =
            ContrastSpec::Declared(vec![decl("A-B", vec![vec![("A", 1.0), ("B", -1.0)]], StatType::T)]);

        let out = prepare_contrasts(&spec, &regs(&["A", "B", "constant"]));

        assert_eq!(out.resolved.len(), 1);
        assert_eq!(out.resolved[0].name, "A-B");
        assert_eq!(out.resolved[0].weights, array![[1.0, -1.0, 0.0]]);
        assert!(out.skipped.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // The same declaration against a design lacking `B` is dropped.
    //
    // Given
    // -----
    // - Declaration `A-B: [{A: 1, B: -1}]`; regressors `[A, constant]`.
    //
    // Expect
    // ------
    // - No resolved contrasts; one skip naming `B` as missing.
    fn declaration_with_absent_regressor_is_skipped() {
        let spec =
            ContrastSpec::Declared(vec![decl("A-B", vec![vec![("A", 1.0), ("B", -1.0)]], StatType::T)]);

        let out = prepare_contrasts(&spec, &regs(&["A", "constant"]));

        assert!(out.resolved.is_empty());
        assert_eq!(out.skipped, vec![SkippedContrast { name: "A-B".into(), missing: vec!["B".into()] }]);
    }

    #[test]
    // Purpose
    // -------
    // Cardinality drops by exactly one per unresolvable declaration and the
    // survivors keep declaration order.
    //
    // Given
    // -----
    // - Declarations `[A, X, B, Y]` where `X` and `Y` need absent regressors.
    //
    // Expect
    // ------
    // - Resolved names `[A, B]`; skipped names `[X, Y]`.
    fn skipped_declarations_leave_no_gaps() {
        let spec = ContrastSpec::Declared(vec![
            decl("A", vec![vec![("A", 1.0)]], StatType::T),
            decl("X", vec![vec![("X", 1.0)]], StatType::T),
            decl("B", vec![vec![("B", 1.0)]], StatType::T),
            decl("Y", vec![vec![("A", 1.0)], vec![("Y", 1.0)]], StatType::F),
        ]);

        let out = prepare_contrasts(&spec, &regs(&["A", "B"]));

        let names: Vec<&str> = out.resolved.iter().map(|c| c.name.as_str()).collect();
        let skipped: Vec<&str> = out.skipped.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(skipped, vec!["X", "Y"]);
    }

    #[test]
    // Purpose
    // -------
    // A zero weight on an absent regressor does not make a contrast missing.
    //
    // Given
    // -----
    // - Declaration `{A: 1, drift: 0}`; regressors `[A]`.
    //
    // Expect
    // ------
    // - Resolved matrix `[[1]]`.
    fn zero_weight_on_absent_regressor_is_tolerated() {
        let spec =
            ContrastSpec::Declared(vec![decl("A", vec![vec![("A", 1.0), ("drift", 0.0)]], StatType::T)]);

        let out = prepare_contrasts(&spec, &regs(&["A"]));

        assert_eq!(out.resolved[0].weights, array![[1.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Undefined specs and empty weight lists.
    //
    // Given
    // -----
    // - `ContrastSpec::Undefined`, and a declaration with no weight rows.
    //
    // Expect
    // ------
    // - Undefined → nothing resolved, nothing skipped.
    // - Empty weights → kept, with a `0 × 2` matrix.
    fn undefined_and_empty_weights() {
        let undefined = prepare_contrasts(&ContrastSpec::Undefined, &regs(&["A", "B"]));
        let spec = ContrastSpec::Declared(vec![decl("none", vec![], StatType::F)]);
        let empty = prepare_contrasts(&spec, &regs(&["A", "B"]));

        assert_eq!(undefined, ContrastResolution::default());
        assert_eq!(empty.resolved.len(), 1);
        assert_eq!(empty.resolved[0].weights.dim(), (0, 2));
    }

    #[test]
    // Purpose
    // -------
    // Round-trip: reading the resolved matrix back by column name
    // reproduces every declared weight and zero elsewhere, for each row of
    // a multi-row block.
    //
    // Given
    // -----
    // - F declaration `[{c: 2, a: 1}, {b: -0.5}]`; regressors `[a, b, c, d]`.
    //
    // Expect
    // ------
    // - Matrix `[[1, 0, 2, 0], [0, -0.5, 0, 0]]`.
    fn multi_row_block_round_trips() {
        let rows = vec![vec![("c", 2.0), ("a", 1.0)], vec![("b", -0.5)]];
        let declared = decl("F", rows, StatType::F);
        let spec = ContrastSpec::Declared(vec![declared.clone()]);
        let regressors = regs(&["a", "b", "c", "d"]);

        let out = prepare_contrasts(&spec, &regressors);

        let m = &out.resolved[0].weights;
        assert_eq!(*m, array![[1.0, 0.0, 2.0, 0.0], [0.0, -0.5, 0.0, 0.0]]);
        for (i, row) in declared.weights.iter().enumerate() {
            for (j, name) in regressors.iter().enumerate() {
                assert_eq!(m[[i, j]], row.weight(name));
            }
        }
    }
}

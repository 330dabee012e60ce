//! contrasts — contrast declarations, resolution, and contrast matrices.
//!
//! Purpose
//! -------
//! Turn declarative, name-based contrast specifications into dense weight
//! matrices aligned with the columns of a concrete design (a fitted
//! first-level design matrix or a second-level grouping design).
//!
//! Key behaviors
//! -------------
//! - [`types`] defines the vocabulary: [`StatType`], validated
//!   [`WeightRow`]s, [`ContrastDeclaration`], the [`ContrastSpec`]
//!   undefined/declared input, and the resolved output types.
//! - [`resolver`] implements [`prepare_contrasts`]: zero-filled alignment
//!   with a silent (but logged and reported) skip of declarations whose
//!   weight-bearing regressors are absent.
//! - [`builder`] implements the table-oriented variant,
//!   [`build_contrast_matrix`], which also synthesizes identity contrasts.
//!
//! Invariants & assumptions
//! ------------------------
//! - Resolution never fails: malformed input is rejected when declarations
//!   and tables are *constructed*, reported through [`ContrastError`].
//! - Column order of every resolved matrix is the regressor order passed in.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use rust_glm_levels::contrasts::{prepare_contrasts, ContrastSpec};
//!
//! let spec = ContrastSpec::from_json(
//!     r#"[{"name": "A-B", "weights": [{"A": 1, "B": -1}], "type": "t"}]"#,
//! ).unwrap();
//! let regressors: Vec<String> = vec!["A".into(), "constant".into()];
//! let resolution = prepare_contrasts(&spec, &regressors);
//! assert!(resolution.resolved.is_empty());
//! assert_eq!(resolution.skipped[0].missing, vec!["B".to_string()]);
//! ```
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its own invariants; the
//!   aggregator tests exercise resolution against grouping designs.

pub mod builder;
pub mod errors;
pub mod resolver;
pub mod types;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::builder::{ContrastMatrix, ContrastTable, IdentitySet, build_contrast_matrix};
pub use self::errors::{ContrastError, ContrastResult};
pub use self::resolver::prepare_contrasts;
pub use self::types::{
    ContrastDeclaration, ContrastResolution, ContrastSpec, ResolvedContrast, SkippedContrast,
    StatType, WeightRow,
};

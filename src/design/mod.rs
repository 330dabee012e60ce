//! design — design frames, grouping designs, and first-level design inputs.
//!
//! Purpose
//! -------
//! Own every design-side concept the aggregation engine relies on:
//! labelled design matrices ([`DesignFrame`]), dummy-coded second-level
//! designs ([`GroupingDesign`]), and the preparation of first-level design
//! inputs (confounds, events, drift model) for an external builder.
//!
//! Key behaviors
//! -------------
//! - [`GroupingDesign::from_names`] dummy-codes contrast names with
//!   first-appearance column order.
//! - [`prepare_confounds`] enforces the drop-missing policy and raises
//!   [`DesignError::EmptyColumns`] otherwise.
//! - [`prepare_design_request`] / [`make_first_level_design`] assemble the
//!   builder request and call the injected [`DesignMatrixBuilder`].
//!
//! Downstream usage
//! ----------------
//! - First-level runs take a [`DesignFrame`] produced by the builder.
//! - Second-level runs build a [`GroupingDesign`] from filtered inputs and
//!   pass [`GroupingDesign::to_frame`] to the statistics engine.

pub mod confounds;
pub mod errors;
pub mod frame;
pub mod grouping;
pub mod request;

pub use self::confounds::{ConfoundTable, DriftModel, prepare_confounds, select_drift_model};
pub use self::errors::{DesignError, DesignResult};
pub use self::frame::DesignFrame;
pub use self::grouping::GroupingDesign;
pub use self::request::{
    DesignMatrixBuilder, DesignOptions, DesignRequest, EventRecord, clean_events,
    make_first_level_design, prepare_design_request,
};

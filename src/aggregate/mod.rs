//! aggregate — first- and higher-level contrast aggregation.
//!
//! Purpose
//! -------
//! Orchestrate one level of a multi-level GLM analysis: match upstream
//! outputs by entities, build the level's design, resolve its contrasts,
//! evaluate them through an injected statistics engine or by fixed
//! effects, and hand the written maps to the result assembler.
//!
//! Key behaviors
//! -------------
//! - [`SecondLevel::run`] implements the higher-level flow, including the
//!   `FEMA` pass-through and the minimum-input rule for fitted contrasts.
//! - [`FirstLevel::run`] implements the per-run contrast loop.
//! - [`compute_fixed_effects`] / [`InverseVariance`] implement the
//!   inverse-variance combination behind `FEMA`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Each invocation is stateless: all state lives in its inputs, the
//!   injected store, and the returned [`LevelResults`].
//!
//! [`LevelResults`]: crate::results::LevelResults

mod emit;
pub mod errors;
pub mod first_level;
pub mod fixed_effects;
pub mod options;
pub mod second_level;

pub use self::errors::{AggregateError, AggregateResult};
pub use self::first_level::FirstLevel;
pub use self::fixed_effects::{
    FixedEffectsCombiner, FixedEffectsResult, InverseVariance, compute_fixed_effects,
};
pub use self::options::LevelOptions;
pub use self::second_level::{MIN_FIT_INPUTS, SecondLevel, SecondLevelInputs};

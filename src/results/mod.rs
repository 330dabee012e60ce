//! results — assembled per-level outputs.
//!
//! Purpose
//! -------
//! Turn the per-contrast stream of written maps into the lists downstream
//! pipeline stages consume: one metadata record per contrast and, per
//! output kind, the paths in contrast order.

pub mod assembler;
pub mod errors;

pub use self::assembler::{ContrastOutputs, LevelOutputs, LevelResults, ResultAssembler};
pub use self::errors::{ResultsError, ResultsResult};

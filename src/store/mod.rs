//! store — reading and writing statistic maps by path.
//!
//! Purpose
//! -------
//! Provide the [`MapStore`] seam used by the aggregators to load upstream
//! maps and persist their outputs, plus two implementations:
//! [`InMemoryStore`] (mutex-protected, for tests and embedding) and
//! [`JsonMapStore`] (one JSON file per map).
//!
//! Conventions
//! -----------
//! - Output names come from [`output_path`]; stores only move bytes.

pub mod errors;
pub mod json;
pub mod memory;
pub mod traits;

pub use self::errors::{StoreError, StoreResult};
pub use self::json::JsonMapStore;
pub use self::memory::InMemoryStore;
pub use self::traits::{MapStore, output_path};

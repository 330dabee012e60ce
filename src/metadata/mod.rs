//! metadata — entity dictionaries and exact-match filtering.
//!
//! Purpose
//! -------
//! Decide which upstream per-contrast outputs belong to the current
//! analysis unit by comparing their entity dictionaries (subject, task,
//! contrast, ...) against a query.
//!
//! Key behaviors
//! -------------
//! - [`Entities`] / [`EntityValue`] model typed entity dictionaries.
//! - [`matches`] is the exact-match predicate; [`filter_by_entities`] applies
//!   it to a `(metadata, payload)` stream and keeps grouping names.
//!
//! Downstream usage
//! ----------------
//! - The second-level aggregator flattens upstream lists with
//!   [`flatten_nested`], filters them with [`filter_by_entities`], and
//!   builds its grouping design from [`Filtered::names`].

pub mod entities;
pub mod errors;
pub mod matcher;

pub use self::entities::{CONTRAST_KEY, Entities, EntityValue, STAT_KEY};
pub use self::errors::{MetadataError, MetadataResult};
pub use self::matcher::{Filtered, filter_by_entities, flatten_nested, matches};

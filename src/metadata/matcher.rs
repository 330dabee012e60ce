//! metadata::matcher — exact entity matching over upstream result streams.
//!
//! Purpose
//! -------
//! Select, from a flat stream of `(metadata, payload)` pairs produced by a
//! previous pipeline stage, the entries that belong to the current analysis
//! unit, and pair each kept payload with its grouping name (usually the
//! `contrast` entity).
//!
//! Key behaviors
//! -------------
//! - [`matches`] is a pure predicate: every query key must be present in the
//!   candidate with an equal value. Extra candidate keys are ignored.
//! - [`filter_by_entities`] keeps matching entries in their original
//!   relative order and records their stream positions, so that parallel
//!   streams (e.g. variance maps) can be filtered in lockstep with
//!   [`Filtered::select`].
//! - [`flatten_nested`] turns the per-run nested lists emitted upstream into
//!   the flat stream consumed here.
//!
//! Invariants & assumptions
//! ------------------------
//! - No fuzzy matching and no type coercion: `"1"` never matches `1`, and
//!   a null value matches only null.
//! - An empty query matches every candidate.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the predicate properties (extra keys, removed keys,
//!   type mismatch), stable ordering of the filter, and lockstep selection.
use tracing::debug;

use crate::metadata::{
    entities::Entities,
    errors::{MetadataError, MetadataResult},
};

/// Return `true` iff every `(key, value)` of `query` is present in `candidate`.
pub fn matches(query: &Entities, candidate: &Entities) -> bool {
    query.iter().all(|(key, value)| candidate.get(key) == Some(value))
}

/// Flatten a nested per-run list into a single ordered stream.
pub fn flatten_nested<T: Clone>(nested: &[Vec<T>]) -> Vec<T> {
    nested.iter().flatten().cloned().collect()
}

/// Filtered — the subset of an upstream stream that matched a query.
///
/// Fields
/// ------
/// - `names`: grouping name of each kept entry (same order as `payloads`).
/// - `payloads`: kept payloads, in original relative order.
/// - `indices`: position of each kept entry in the unfiltered stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered<P> {
    pub names: Vec<String>,
    pub payloads: Vec<P>,
    pub indices: Vec<usize>,
}

impl<P> Filtered<P> {
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Pick the entries of a parallel stream at the kept positions.
    ///
    /// Errors
    /// ------
    /// - `MetadataError::LengthMismatch` if `parallel` is shorter than the
    ///   stream this filter was computed on.
    pub fn select<T: Clone>(&self, parallel: &[T], what: &'static str) -> MetadataResult<Vec<T>> {
        self.indices
            .iter()
            .map(|&i| {
                parallel.get(i).cloned().ok_or(MetadataError::LengthMismatch {
                    what,
                    expected: i + 1,
                    actual: parallel.len(),
                })
            })
            .collect()
    }
}

/// Filter `(metadata, payload)` pairs by exact entity match.
///
/// Parameters
/// ----------
/// - `query`: entities every kept entry must carry.
/// - `metadata`: one record per upstream entry.
/// - `payloads`: one payload per upstream entry (same length as `metadata`).
/// - `field`: entity whose string value names the entry's group.
///
/// Errors
/// ------
/// - `MetadataError::LengthMismatch` when the two streams differ in length.
/// - `MetadataError::MissingField` / `NonStringField` when a *matching*
///   record cannot provide its group name. Non-matching records are never
///   inspected beyond the predicate.
pub fn filter_by_entities<P: Clone>(
    query: &Entities, metadata: &[Entities], payloads: &[P], field: &str,
) -> MetadataResult<Filtered<P>> {
    if metadata.len() != payloads.len() {
        return Err(MetadataError::LengthMismatch {
            what: "metadata/payload",
            expected: metadata.len(),
            actual: payloads.len(),
        });
    }

    let mut out = Filtered { names: Vec::new(), payloads: Vec::new(), indices: Vec::new() };
    for (index, (record, payload)) in metadata.iter().zip(payloads).enumerate() {
        if !matches(query, record) {
            continue;
        }
        let name = match record.get(field) {
            None => return Err(MetadataError::MissingField { index, field: field.to_owned() }),
            Some(value) => value
                .as_str()
                .ok_or_else(|| MetadataError::NonStringField { index, field: field.to_owned() })?,
        };
        out.names.push(name.to_owned());
        out.payloads.push(payload.clone());
        out.indices.push(index);
    }

    debug!(kept = out.len(), total = metadata.len(), "filtered upstream entries by entities");
    Ok(out)
}

//! metadata::entities — typed entity dictionaries attached to analysis outputs.
//!
//! Purpose
//! -------
//! Represent the categorical "entities" (subject, session, task, run,
//! contrast, ...) that tag every upstream result and every output record.
//! Values keep their JSON type so that equality is exact: the string `"1"`
//! and the integer `1` are different entity values, as are `1` and `1.0`.
//!
//! Key behaviors
//! -------------
//! - [`EntityValue`] is an untagged scalar that (de)serializes as a plain
//!   JSON null, boolean, integer, float, or string. `Null` equals only
//!   `Null`.
//! - [`Entities`] is an insertion-ordered map from key to [`EntityValue`];
//!   equality is map equality (order-insensitive).
//! - [`Entities::merged`] overlays one dictionary on another, which is how
//!   output metadata records are formed from query entities.
//!
//! Invariants & assumptions
//! ------------------------
//! - No coercion is ever performed between value types; callers are
//!   responsible for consistent typing across pipeline stages.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Key under which the contrast name is stored in metadata records.
pub const CONTRAST_KEY: &str = "contrast";

/// Key under which the statistic type is stored in metadata records.
pub const STAT_KEY: &str = "stat";

/// A single entity value.
///
/// Variant order matters for untagged deserialization: JSON integers are
/// tried as `Int` before `Float`, so `1` becomes `Int(1)` and `1.0`
/// becomes `Float(1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl EntityValue {
    /// Borrow the value as a string slice when it is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EntityValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityValue::Null => f.write_str("null"),
            EntityValue::Bool(b) => write!(f, "{b}"),
            EntityValue::Int(i) => write!(f, "{i}"),
            EntityValue::Float(x) => write!(f, "{x}"),
            EntityValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for EntityValue {
    fn from(value: &str) -> Self {
        EntityValue::Str(value.to_owned())
    }
}

impl From<String> for EntityValue {
    fn from(value: String) -> Self {
        EntityValue::Str(value)
    }
}

impl From<i64> for EntityValue {
    fn from(value: i64) -> Self {
        EntityValue::Int(value)
    }
}

impl From<i32> for EntityValue {
    fn from(value: i32) -> Self {
        EntityValue::Int(i64::from(value))
    }
}

impl From<f64> for EntityValue {
    fn from(value: f64) -> Self {
        EntityValue::Float(value)
    }
}

impl From<bool> for EntityValue {
    fn from(value: bool) -> Self {
        EntityValue::Bool(value)
    }
}

/// Entities — insertion-ordered entity dictionary.
///
/// Purpose
/// -------
/// Serve both as the *query* used to select upstream inputs and as the
/// metadata record attached to every output map.
///
/// Notes
/// -----
/// - Serializes transparently as a JSON object.
/// - Insertion order is preserved for readable output, but two dictionaries
///   with the same pairs in a different order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entities(IndexMap<String, EntityValue>);

impl Entities {
    pub fn new() -> Self {
        Entities(IndexMap::new())
    }

    /// Builder-style insert, convenient for literals in tests and callers.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<EntityValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a value, returning the previous one.
    pub fn insert(
        &mut self, key: impl Into<String>, value: impl Into<EntityValue>,
    ) -> Option<EntityValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&EntityValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove a key, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<EntityValue> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityValue)> {
        self.0.iter()
    }

    /// Return a copy of `self` with every pair of `overlay` written on top.
    ///
    /// Keys already present keep their position; new keys are appended in
    /// `overlay` order.
    pub fn merged(&self, overlay: &Entities) -> Entities {
        let mut out = self.clone();
        for (k, v) in overlay.iter() {
            out.0.insert(k.clone(), v.clone());
        }
        out
    }
}

impl<K: Into<String>, V: Into<EntityValue>> FromIterator<(K, V)> for Entities {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Entities(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

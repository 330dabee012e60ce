//! store::memory — in-process map store.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    engine::StatMap,
    store::{
        errors::{StoreError, StoreResult},
        traits::MapStore,
    },
};

/// InMemoryStore — maps keyed by path, behind a mutex.
#[derive(Debug)]
pub struct InMemoryStore {
    maps: Mutex<HashMap<PathBuf, StatMap>>,
    extension: String,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore { maps: Mutex::new(HashMap::new()), extension: "nii.gz".to_string() }
    }

    pub fn with_extension(extension: impl Into<String>) -> Self {
        InMemoryStore { maps: Mutex::new(HashMap::new()), extension: extension.into() }
    }

    /// Insert a map directly (upstream inputs in tests and bindings).
    pub fn insert(&self, path: impl Into<PathBuf>, map: StatMap) -> StoreResult<()> {
        self.maps.lock().map_err(|_| StoreError::Poisoned)?.insert(path.into(), map);
        Ok(())
    }

    /// Stored paths, sorted.
    pub fn paths(&self) -> StoreResult<Vec<PathBuf>> {
        let guard = self.maps.lock().map_err(|_| StoreError::Poisoned)?;
        let mut paths: Vec<PathBuf> = guard.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore::new()
    }
}

impl MapStore for InMemoryStore {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn read(&self, path: &Path) -> StoreResult<StatMap> {
        let guard = self.maps.lock().map_err(|_| StoreError::Poisoned)?;
        guard.get(path).cloned().ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, map: &StatMap) -> StoreResult<()> {
        self.insert(path, map.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Written maps read back; unknown paths are reported; rows stack.
    //
    // Given
    // -----
    // - Maps `a = [1, 2]`, `b = [3, 4]`, and a read of `c`.
    //
    // Expect
    // ------
    // - `read(a)` returns `[1, 2]`; `read(c)` is `NotFound`;
    //   `read_stacked([b, a])` is `[[3, 4], [1, 2]]`.
    fn write_read_and_stack() {
        let store = InMemoryStore::new();
        store.write(Path::new("a"), &array![1.0, 2.0]).unwrap();
        store.insert("b", array![3.0, 4.0]).unwrap();

        let stacked = store.read_stacked(&[PathBuf::from("b"), PathBuf::from("a")]).unwrap();

        assert_eq!(store.read(Path::new("a")).unwrap(), array![1.0, 2.0]);
        assert_eq!(store.read(Path::new("c")), Err(StoreError::NotFound(PathBuf::from("c"))));
        assert_eq!(stacked, array![[3.0, 4.0], [1.0, 2.0]]);
    }

    #[test]
    // Purpose
    // -------
    // Stacking maps of different lengths is rejected.
    //
    // Given
    // -----
    // - `a = [1, 2]`, `b = [1]`.
    //
    // Expect
    // ------
    // - `LengthMismatch` naming `b`.
    fn read_stacked_rejects_ragged_maps() {
        let store = InMemoryStore::new();
        store.insert("a", array![1.0, 2.0]).unwrap();
        store.insert("b", array![1.0]).unwrap();

        let err = store.read_stacked(&[PathBuf::from("a"), PathBuf::from("b")]).unwrap_err();

        assert_eq!(
            err,
            StoreError::LengthMismatch { path: PathBuf::from("b"), expected: 2, actual: 1 }
        );
    }
}

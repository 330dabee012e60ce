//! store::json — maps persisted as JSON files.
//!
//! Each map is one file holding the `ndarray` serde encoding of a
//! one-dimensional array. Parent directories are created on write.
//! JSON has no NaN or infinity, so maps holding them are rejected before
//! any file is created.
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use tracing::debug;

use crate::{
    engine::StatMap,
    store::{
        errors::{StoreError, StoreResult},
        traits::MapStore,
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMapStore;

fn io_err(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io { path: path.to_path_buf(), message: err.to_string() }
}

impl MapStore for JsonMapStore {
    fn extension(&self) -> &str {
        "json"
    }

    fn read(&self, path: &Path) -> StoreResult<StatMap> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => io_err(path, e),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::Encoding {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn write(&self, path: &Path, map: &StatMap) -> StoreResult<()> {
        if let Some((index, &value)) = map.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(StoreError::NonFinite { path: path.to_path_buf(), index, value });
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let file = File::create(path).map_err(|e| io_err(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, map).map_err(|e| StoreError::Encoding {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|e| io_err(path, e))?;
        debug!(path = %path.display(), len = map.len(), "wrote map");
        Ok(())
    }
}

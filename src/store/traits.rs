//! store::traits — the map persistence seam and output naming.
//!
//! Purpose
//! -------
//! Abstract where statistic maps live (image files, a database, memory) so
//! aggregators can load upstream maps and write their own outputs by path.
//!
//! Conventions
//! -----------
//! - Output maps are named `{output_dir}/{contrast}_{kind}.{extension}`
//!   (see [`output_path`]). Path separators inside the contrast name are
//!   replaced with `_` so every output stays inside `output_dir`.
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::{
    engine::{OutputKind, StatMap},
    store::errors::{StoreError, StoreResult},
};

pub trait MapStore {
    /// File extension (without the dot) used for written maps.
    fn extension(&self) -> &str;

    fn read(&self, path: &Path) -> StoreResult<StatMap>;

    fn write(&self, path: &Path, map: &StatMap) -> StoreResult<()>;

    /// Read `paths` and stack them as rows.
    ///
    /// Errors
    /// ------
    /// - `StoreError::LengthMismatch` if maps differ in length.
    fn read_stacked(&self, paths: &[PathBuf]) -> StoreResult<Array2<f64>> {
        let maps = paths.iter().map(|p| self.read(p)).collect::<StoreResult<Vec<_>>>()?;
        let width = maps.first().map(|m| m.len()).unwrap_or(0);
        let mut stacked = Array2::zeros((maps.len(), width));
        for (row, (map, path)) in maps.iter().zip(paths).enumerate() {
            if map.len() != width {
                return Err(StoreError::LengthMismatch {
                    path: path.clone(),
                    expected: width,
                    actual: map.len(),
                });
            }
            stacked.row_mut(row).assign(map);
        }
        Ok(stacked)
    }
}

impl<T: MapStore + ?Sized> MapStore for &T {
    fn extension(&self) -> &str {
        (**self).extension()
    }

    fn read(&self, path: &Path) -> StoreResult<StatMap> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, map: &StatMap) -> StoreResult<()> {
        (**self).write(path, map)
    }
}

/// `{output_dir}/{contrast}_{kind}.{extension}`.
pub fn output_path(output_dir: &Path, contrast: &str, kind: OutputKind, extension: &str) -> PathBuf {
    let stem: String =
        contrast.chars().map(|c| if c == '/' || c == '\\' { '_' } else { c }).collect();
    output_dir.join(format!("{stem}_{}.{extension}", kind.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Output paths follow the `{name}_{kind}.{ext}` convention.
    //
    // Given
    // -----
    // - Directory `out`, contrast `A-B`, kind `z_score`, and a contrast
    //   named `a/b`.
    //
    // Expect
    // ------
    // - `out/A-B_z_score.nii.gz` and `out/a_b_stat.json`.
    fn output_path_follows_naming_convention() {
        let dir = Path::new("out");

        assert_eq!(
            output_path(dir, "A-B", OutputKind::ZScore, "nii.gz"),
            PathBuf::from("out/A-B_z_score.nii.gz")
        );
        assert_eq!(
            output_path(dir, "a/b", OutputKind::Stat, "json"),
            PathBuf::from("out/a_b_stat.json")
        );
    }
}

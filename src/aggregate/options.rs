//! aggregate::options — per-invocation level options.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    aggregate::errors::{AggregateError, AggregateResult},
    engine::FitOptions,
};

/// LevelOptions — where outputs go and how the engine is configured.
///
/// Fields
/// ------
/// - `output_dir`: directory receiving `{contrast}_{kind}.{ext}` maps.
/// - `smoothing_fwhm`: optional smoothing kernel width handed to the
///   engine; finite and > 0 when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelOptions {
    #[serde(default)]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub smoothing_fwhm: Option<f64>,
}

impl LevelOptions {
    pub fn new(output_dir: impl Into<PathBuf>, smoothing_fwhm: Option<f64>) -> AggregateResult<Self> {
        let opts = LevelOptions { output_dir: output_dir.into(), smoothing_fwhm };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> AggregateResult<()> {
        match self.smoothing_fwhm {
            Some(fwhm) if !fwhm.is_finite() || fwhm <= 0.0 => {
                Err(AggregateError::InvalidSmoothing(fwhm))
            }
            _ => Ok(()),
        }
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions { smoothing_fwhm: self.smoothing_fwhm }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Smoothing must be positive when given; JSON fields are optional.
    //
    // Given
    // -----
    // - FWHM `0.0`, FWHM `6.0`, and the JSON `{"output_dir": "out"}`.
    //
    // Expect
    // ------
    // - `InvalidSmoothing(0.0)`; `fit_options` carries 6.0; the JSON form
    //   has no smoothing.
    fn options_validate_smoothing_and_deserialize() {
        let bad = LevelOptions::new("out", Some(0.0));
        let good = LevelOptions::new("out", Some(6.0)).unwrap();
        let json: LevelOptions = serde_json::from_str(r#"{"output_dir": "out"}"#).unwrap();

        assert_eq!(bad.unwrap_err(), AggregateError::InvalidSmoothing(0.0));
        assert_eq!(good.fit_options().smoothing_fwhm, Some(6.0));
        assert_eq!(json.smoothing_fwhm, None);
        assert_eq!(json.output_dir, PathBuf::from("out"));
    }
}

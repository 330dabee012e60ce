//! design::request — assemble first-level design-matrix requests.
//!
//! Purpose
//! -------
//! Gather everything an external design-matrix builder needs to produce a
//! first-level design (frame times, cleaned events, prepared confounds,
//! drift model) and hand it over through the [`DesignMatrixBuilder`] seam.
//!
//! Key behaviors
//! -------------
//! - [`DesignOptions`] holds validated acquisition settings (TR, number of
//!   volumes) and the drop-missing opt-in; it deserializes from JSON.
//! - Frame times are `[0, TR, 2·TR, …]`, one per volume.
//! - Events with a non-finite modulation are dropped; events with a
//!   non-finite onset or an invalid duration are rejected.
//! - Confounds go through [`prepare_confounds`] and decide the drift model.
//!
//! Invariants & assumptions
//! ------------------------
//! - HRF convolution, drift basis generation and the assembly of the final
//!   matrix belong to the injected builder, not to this crate.
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::design::{
    confounds::{ConfoundTable, DriftModel, prepare_confounds, select_drift_model},
    errors::{DesignError, DesignResult},
    frame::DesignFrame,
};

/// DesignOptions — acquisition settings for a first-level design.
///
/// Fields
/// ------
/// - `repetition_time`: seconds between volumes; finite and > 0.
/// - `n_volumes`: number of volumes; ≥ 1.
/// - `drop_missing`: drop all-missing confound columns instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignOptions {
    pub repetition_time: f64,
    pub n_volumes: usize,
    #[serde(default)]
    pub drop_missing: bool,
}

impl DesignOptions {
    /// Errors
    /// ------
    /// - `DesignError::InvalidRepetitionTime` / `InvalidVolumeCount`.
    pub fn new(repetition_time: f64, n_volumes: usize, drop_missing: bool) -> DesignResult<Self> {
        let opts = DesignOptions { repetition_time, n_volumes, drop_missing };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check invariants (useful after deserialization).
    pub fn validate(&self) -> DesignResult<()> {
        if !self.repetition_time.is_finite() || self.repetition_time <= 0.0 {
            return Err(DesignError::InvalidRepetitionTime(self.repetition_time));
        }
        if self.n_volumes == 0 {
            return Err(DesignError::InvalidVolumeCount(self.n_volumes));
        }
        Ok(())
    }

    pub fn frame_times(&self) -> Array1<f64> {
        Array1::from_shape_fn(self.n_volumes, |i| i as f64 * self.repetition_time)
    }
}

/// EventRecord — one sparse (event-related) regressor entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub onset: f64,
    pub duration: f64,
    /// Condition name; accepts `condition` in JSON as well.
    #[serde(alias = "condition")]
    pub trial_type: String,
    /// Amplitude; accepts `amplitude` in JSON as well. NaN marks a missing value.
    #[serde(alias = "amplitude")]
    pub modulation: f64,
}

/// Drop events with missing modulation and reject malformed timing.
///
/// Errors
/// ------
/// - `DesignError::InvalidEvent` for a non-finite onset or a non-finite or
///   negative duration (index refers to the input sequence).
pub fn clean_events(events: Vec<EventRecord>) -> DesignResult<Vec<EventRecord>> {
    let total = events.len();
    let mut kept = Vec::with_capacity(total);
    for (index, event) in events.into_iter().enumerate() {
        if !event.onset.is_finite() {
            return Err(DesignError::InvalidEvent { index, field: "onset", value: event.onset });
        }
        if !event.duration.is_finite() || event.duration < 0.0 {
            return Err(DesignError::InvalidEvent {
                index,
                field: "duration",
                value: event.duration,
            });
        }
        if event.modulation.is_finite() {
            kept.push(event);
        }
    }
    debug!(kept = kept.len(), total, "cleaned sparse events");
    Ok(kept)
}

/// DesignRequest — inputs for an external design-matrix builder.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignRequest {
    pub frame_times: Array1<f64>,
    pub events: Option<Vec<EventRecord>>,
    pub confounds: Option<ConfoundTable>,
    pub drift_model: Option<DriftModel>,
}

/// Seam for the external design-matrix construction routine.
pub trait DesignMatrixBuilder {
    fn build(&self, request: &DesignRequest) -> DesignResult<DesignFrame>;
}

/// Assemble a [`DesignRequest`] from raw session inputs.
///
/// Errors
/// ------
/// - Any error of [`DesignOptions::validate`], [`clean_events`] or
///   [`prepare_confounds`].
/// - `DesignError::ShapeMismatch` when confounds do not have one row per
///   volume.
pub fn prepare_design_request(
    options: &DesignOptions, events: Option<Vec<EventRecord>>, confounds: Option<ConfoundTable>,
) -> DesignResult<DesignRequest> {
    options.validate()?;

    let events = events.map(clean_events).transpose()?;
    let confounds = match confounds {
        Some(table) => {
            if table.values().nrows() != options.n_volumes {
                return Err(DesignError::ShapeMismatch {
                    what: "confound row count",
                    expected: options.n_volumes,
                    actual: table.values().nrows(),
                });
            }
            prepare_confounds(table, options.drop_missing)?
        }
        None => None,
    };
    let drift_model = select_drift_model(confounds.as_ref());

    Ok(DesignRequest { frame_times: options.frame_times(), events, confounds, drift_model })
}

/// Build the request and run it through `builder`.
pub fn make_first_level_design<B: DesignMatrixBuilder>(
    builder: &B, options: &DesignOptions, events: Option<Vec<EventRecord>>,
    confounds: Option<ConfoundTable>,
) -> DesignResult<DesignFrame> {
    let request = prepare_design_request(options, events, confounds)?;
    let frame = builder.build(&request)?;
    if frame.n_rows() != options.n_volumes {
        return Err(DesignError::ShapeMismatch {
            what: "design row count",
            expected: options.n_volumes,
            actual: frame.n_rows(),
        });
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Option validation and frame-time generation.
    // - Event cleaning (missing modulation dropped, bad timing rejected,
    //   JSON aliases).
    // - Request assembly, including drift selection and row-count checks.
    // - The builder seam via a stub builder.
    // -------------------------------------------------------------------------

    fn event(onset: f64, modulation: f64) -> EventRecord {
        EventRecord { onset, duration: 1.0, trial_type: "go".into(), modulation }
    }

    struct ConstantBuilder;

    impl DesignMatrixBuilder for ConstantBuilder {
        fn build(&self, request: &DesignRequest) -> DesignResult<DesignFrame> {
            let n = request.frame_times.len();
            DesignFrame::new(vec!["constant".into()], Array2::ones((n, 1)))
        }
    }

    #[test]
    // Purpose
    // -------
    // Options reject non-positive TR and zero volumes; frame times scale
    // with TR.
    //
    // Given
    // -----
    // - TR = 0, TR = NaN, n = 0, then TR = 2.5 with n = 3.
    //
    // Expect
    // ------
    // - Errors for the invalid ones; frame times `[0, 2.5, 5]`.
    fn options_validate_and_generate_frame_times() {
        assert!(matches!(
            DesignOptions::new(0.0, 3, false),
            Err(DesignError::InvalidRepetitionTime(_))
        ));
        assert!(DesignOptions::new(f64::NAN, 3, false).is_err());
        assert_eq!(DesignOptions::new(2.0, 0, false), Err(DesignError::InvalidVolumeCount(0)));

        let opts = DesignOptions::new(2.5, 3, false).unwrap();
        let times = opts.frame_times();

        assert_relative_eq!(times[2], 5.0);
        assert_eq!(times.len(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Events with missing modulation are dropped; bad onsets are fatal.
    //
    // Given
    // -----
    // - Events with modulation `[1, NaN, 0.5]`; then one with onset NaN.
    //
    // Expect
    // ------
    // - Two events remain; the NaN onset yields `InvalidEvent`.
    fn clean_events_drops_missing_modulation() {
        let kept = clean_events(vec![event(0.0, 1.0), event(2.0, f64::NAN), event(4.0, 0.5)])
            .unwrap();
        let bad = clean_events(vec![event(f64::NAN, 1.0)]).unwrap_err();

        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].onset, 4.0);
        assert!(matches!(bad, DesignError::InvalidEvent { index: 0, field: "onset", .. }));
    }

    #[test]
    // Purpose
    // -------
    // JSON events may use `condition`/`amplitude` column names.
    //
    // Given
    // -----
    // - `{"onset": 1, "duration": 0.5, "condition": "stop", "amplitude": 2}`.
    //
    // Expect
    // ------
    // - `trial_type == "stop"`, `modulation == 2`.
    fn events_accept_condition_and_amplitude_aliases() {
        let e: EventRecord = serde_json::from_str(
            r#"{"onset": 1, "duration": 0.5, "condition": "stop", "amplitude": 2}"#,
        )
        .unwrap();

        assert_eq!(e.trial_type, "stop");
        assert_eq!(e.modulation, 2.0);
    }

    #[test]
    // Purpose
    // -------
    // Request assembly selects the drift model and validates row counts.
    //
    // Given
    // -----
    // - 2 volumes; confounds `[cosine00]` with 2 rows, then with 3 rows.
    //
    // Expect
    // ------
    // - First request has `drift_model == None`; second fails with
    //   `ShapeMismatch`.
    fn request_assembly_checks_rows_and_drift() {
        let opts = DesignOptions::new(2.0, 2, false).unwrap();
        let ok = ConfoundTable::new(vec!["cosine00".into()], array![[0.1], [0.2]]).unwrap();
        let bad = ConfoundTable::new(vec!["cosine00".into()], array![[0.1], [0.2], [0.3]]).unwrap();

        let request = prepare_design_request(&opts, None, Some(ok)).unwrap();
        let err = prepare_design_request(&opts, None, Some(bad)).unwrap_err();

        assert_eq!(request.drift_model, None);
        assert!(request.events.is_none());
        assert!(matches!(err, DesignError::ShapeMismatch { .. }));
    }

    #[test]
    // Purpose
    // -------
    // The builder seam receives the request and its frame is returned.
    //
    // Given
    // -----
    // - `ConstantBuilder`, 4 volumes, no events, no confounds.
    //
    // Expect
    // ------
    // - A 4×1 frame named `constant`.
    fn make_first_level_design_uses_builder() {
        let opts = DesignOptions::new(1.0, 4, false).unwrap();

        let frame = make_first_level_design(&ConstantBuilder, &opts, None, None).unwrap();

        assert_eq!(frame.columns(), ["constant".to_string()]);
        assert_eq!(frame.n_rows(), 4);
    }
}

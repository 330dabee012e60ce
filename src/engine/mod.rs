//! engine — statistics-engine seam and a reference OLS engine.
//!
//! Purpose
//! -------
//! Define the narrow interface through which level aggregators fit GLMs and
//! evaluate contrasts ([`StatsEngine`], [`FittedModel`]), the vocabulary of
//! the maps they exchange ([`OutputKind`], [`ContrastMaps`]), and ship
//! [`OlsEngine`], a geometry-free mass-univariate OLS implementation.
//!
//! Key behaviors
//! -------------
//! - Engines are injected generically; the aggregators never construct one.
//! - [`EngineStat`] is the engine-facing subset of
//!   [`StatType`](crate::contrasts::StatType): `FEMA` is handled by the
//!   aggregator and never reaches an engine.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use ndarray::{array, Array2};
//! use rust_glm_levels::design::DesignFrame;
//! use rust_glm_levels::engine::{EngineStat, FitOptions, FittedModel, OlsEngine, OutputKind, StatsEngine};
//!
//! let design = DesignFrame::new(vec!["constant".into()], Array2::ones((4, 1))).unwrap();
//! let data = array![[1.0], [2.0], [3.0], [4.0]];
//! let model = OlsEngine.fit(data.view(), &design, &FitOptions::default()).unwrap();
//! let maps = model.compute_contrast(array![[1.0]].view(), EngineStat::T).unwrap();
//! assert!((maps.get(OutputKind::EffectSize).unwrap()[0] - 2.5).abs() < 1e-10);
//! ```

pub mod errors;
pub mod ols;
pub mod traits;
pub mod types;

pub use self::errors::{EngineError, EngineResult};
pub use self::ols::{OlsEngine, OlsModel};
pub use self::traits::{FittedModel, StatsEngine};
pub use self::types::{ContrastMaps, EngineStat, FitOptions, OutputKind, StatMap};

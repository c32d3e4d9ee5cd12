//! Configuration and preset management for freqresp analyses.
//!
//! Describes a frequency response analysis (segmentation, window, scaling,
//! detrend, degenerate floor) as a TOML file and turns it into the engine
//! types of `freqresp-analysis`.
//!
//! # Features
//!
//! - **Analysis files**: Load and save [`AnalysisConfig`] as TOML
//! - **Validation**: Names and ranges are checked when building the estimator
//! - **Factory Presets**: Built-in configurations for common measurements
//!
//! # Example
//!
//! ```rust,no_run
//! use freqresp_config::{AnalysisConfig, resolve_preset};
//!
//! let config = resolve_preset("psd")?;
//! let estimator = config.to_estimator()?;
//!
//! # let reference = vec![0.0; 4096];
//! # let response = vec![0.0; 4096];
//! let fr = estimator.estimate(&reference, &response, config.sample_rate.unwrap_or(48000.0))?;
//!
//! AnalysisConfig::new("Tweaked").with_segment_length(4096).save("tweaked.toml")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod analysis_config;
mod error;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use analysis_config::AnalysisConfig;
pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_presets, get_factory_preset, is_factory_preset, resolve_preset,
};

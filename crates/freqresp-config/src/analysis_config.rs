//! Analysis configuration file format and operations.

use freqresp_analysis::{
    AnalysisError, DEFAULT_DEGENERATE_FLOOR, DEFAULT_SEGMENT_LENGTH, Detrend,
    FrequencyResponseEstimator, ScalingMode, SegmentationConfig, Window,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// On-disk description of a frequency response analysis.
///
/// Enum-valued fields are stored by name so files stay readable and
/// hand-editable. Names are checked when the configuration is turned into
/// an engine type, not when it is parsed.
///
/// # TOML Format
///
/// ```toml
/// name = "Loudspeaker sweep"
/// description = "Near-field measurement, 48 kHz"
/// sample_rate = 48000.0
/// segment_length = 4096
/// overlap = 3072
/// window = "hann"
/// scaling = "density"
/// detrend = "constant"
/// degenerate_floor = 1e-12
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Name of the configuration.
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Sample rate hint in Hz. Callers usually know the rate of their data,
    /// so this is only a default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,

    /// Samples per segment.
    #[serde(default = "default_segment_length")]
    pub segment_length: usize,

    /// Samples shared by consecutive segments; half a segment when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<usize>,

    /// Window name, e.g. "flat-top" or "hann".
    #[serde(default = "default_window")]
    pub window: String,

    /// Scaling name, "spectrum" or "density".
    #[serde(default = "default_scaling")]
    pub scaling: String,

    /// Detrend name, "none", "constant" or "linear".
    #[serde(default = "default_detrend")]
    pub detrend: String,

    /// Reference bins below this fraction of the peak are masked.
    #[serde(default = "default_degenerate_floor")]
    pub degenerate_floor: f64,
}

fn default_segment_length() -> usize {
    DEFAULT_SEGMENT_LENGTH
}

fn default_window() -> String {
    Window::default().name().to_string()
}

fn default_scaling() -> String {
    ScalingMode::default().name().to_string()
}

fn default_detrend() -> String {
    Detrend::default().name().to_string()
}

fn default_degenerate_floor() -> f64 {
    DEFAULT_DEGENERATE_FLOOR
}

impl AnalysisConfig {
    /// Create a configuration with default analysis settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            sample_rate: None,
            segment_length: default_segment_length(),
            overlap: None,
            window: default_window(),
            scaling: default_scaling(),
            detrend: default_detrend(),
            degenerate_floor: default_degenerate_floor(),
        }
    }

    /// Capture an engine configuration under `name`.
    pub fn from_segmentation_config(name: impl Into<String>, config: &SegmentationConfig) -> Self {
        Self {
            segment_length: config.segment_length,
            overlap: config.overlap,
            window: config.window.name().to_string(),
            scaling: config.scaling.name().to_string(),
            detrend: config.detrend.name().to_string(),
            ..Self::new(name)
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Set the segment length.
    pub fn with_segment_length(mut self, segment_length: usize) -> Self {
        self.segment_length = segment_length;
        self
    }

    /// Set an explicit overlap.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Set the window by name.
    pub fn with_window(mut self, window: impl Into<String>) -> Self {
        self.window = window.into();
        self
    }

    /// Set the scaling by name.
    pub fn with_scaling(mut self, scaling: impl Into<String>) -> Self {
        self.scaling = scaling.into();
        self
    }

    /// Set the detrend mode by name.
    pub fn with_detrend(mut self, detrend: impl Into<String>) -> Self {
        self.detrend = detrend.into();
        self
    }

    /// Set the relative degenerate floor.
    pub fn with_degenerate_floor(mut self, floor: f64) -> Self {
        self.degenerate_floor = floor;
        self
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config: AnalysisConfig = toml::from_str(&content)?;
        tracing::debug!("loaded analysis config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Load a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        tracing::debug!("saved analysis config '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve names and check ranges, producing the engine segmentation.
    pub fn to_segmentation_config(&self) -> Result<SegmentationConfig, ConfigError> {
        let mut config = SegmentationConfig::new(self.segment_length)
            .with_window(self.window.parse::<Window>()?)
            .with_scaling(self.scaling.parse::<ScalingMode>()?)
            .with_detrend(self.detrend.parse::<Detrend>()?);
        config.overlap = self.overlap;
        config.validate()?;
        Ok(config)
    }

    /// Build the estimator this configuration describes.
    pub fn to_estimator(&self) -> Result<FrequencyResponseEstimator, ConfigError> {
        let config = self.to_segmentation_config()?;
        if !(self.degenerate_floor.is_finite() && self.degenerate_floor >= 0.0) {
            return Err(AnalysisError::invalid(
                "degenerate_floor",
                self.degenerate_floor,
                "must be finite and non-negative",
            )
            .into());
        }
        Ok(FrequencyResponseEstimator::new(config).with_degenerate_floor(self.degenerate_floor))
    }

    /// Check every field without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rate) = self.sample_rate
            && !(rate.is_finite() && rate > 0.0)
        {
            return Err(
                AnalysisError::invalid("sample_rate", rate, "must be positive and finite").into(),
            );
        }
        self.to_estimator().map(|_| ())
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

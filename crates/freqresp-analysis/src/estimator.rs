//! Top-level frequency response estimation.

use crate::error::{AnalysisError, Result};
use crate::segment::SegmentationConfig;
use crate::transfer_fn::FrequencyResponse;
use crate::welch::SpectralAverager;

/// Default relative floor below which a reference bin counts as degenerate.
pub const DEFAULT_DEGENERATE_FLOOR: f64 = 1e-12;

/// A borrowed run of samples and the rate they were taken at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSequence<'a> {
    samples: &'a [f64],
    sample_rate: f64,
}

impl<'a> SampleSequence<'a> {
    /// Wrap `samples` taken at `sample_rate` Hz.
    pub fn new(samples: &'a [f64], sample_rate: f64) -> Result<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(AnalysisError::invalid(
                "sample_rate",
                sample_rate,
                "must be positive and finite",
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// The samples.
    pub fn samples(&self) -> &'a [f64] {
        self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }
}

/// H1 frequency response estimator.
///
/// Runs one [`SpectralAverager`] three times, for Pxx, Pxy, and Pyy, so all
/// three spectra share identical windowing, detrending, and scaling.
///
/// ```rust
/// use freqresp_analysis::{FrequencyResponseEstimator, SegmentationConfig, Window};
///
/// let x: Vec<f64> = (0..4096).map(|i| ((i * 7919) % 113) as f64 - 56.0).collect();
/// let y: Vec<f64> = x.iter().map(|v| 0.5 * v).collect();
///
/// let estimator = FrequencyResponseEstimator::new(
///     SegmentationConfig::new(256).with_window(Window::Hann),
/// );
/// let fr = estimator.estimate(&x, &y, 1000.0).unwrap();
/// assert!((fr.magnitude_at(100.0) - 0.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyResponseEstimator {
    config: SegmentationConfig,
    degenerate_floor: f64,
}

impl Default for FrequencyResponseEstimator {
    fn default() -> Self {
        Self::new(SegmentationConfig::default())
    }
}

impl FrequencyResponseEstimator {
    /// Estimator with the given segmentation and the default floor.
    pub fn new(config: SegmentationConfig) -> Self {
        Self {
            config,
            degenerate_floor: DEFAULT_DEGENERATE_FLOOR,
        }
    }

    /// Set the relative degenerate floor (fraction of peak Pxx).
    pub fn with_degenerate_floor(mut self, floor: f64) -> Self {
        self.degenerate_floor = floor;
        self
    }

    /// Segmentation in use.
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Relative degenerate floor in use.
    pub fn degenerate_floor(&self) -> f64 {
        self.degenerate_floor
    }

    /// Estimate H(f) and coherence from `reference` to `response`.
    ///
    /// Configuration errors are reported before the inputs are examined,
    /// then length mismatch, then insufficient data.
    pub fn estimate(
        &self,
        reference: &[f64],
        response: &[f64],
        sample_rate: f64,
    ) -> Result<FrequencyResponse> {
        if !(self.degenerate_floor.is_finite() && self.degenerate_floor >= 0.0) {
            return Err(AnalysisError::invalid(
                "degenerate_floor",
                self.degenerate_floor,
                "must be finite and non-negative",
            ));
        }
        let averager = SpectralAverager::new(&self.config, sample_rate)?;
        if reference.len() != response.len() {
            return Err(AnalysisError::LengthMismatch {
                reference: reference.len(),
                response: response.len(),
            });
        }
        self.config.validate_for(reference.len())?;

        tracing::debug!(
            "estimate: {} samples at {} Hz, window={}, scaling={}, detrend={}",
            reference.len(),
            sample_rate,
            self.config.window,
            self.config.scaling,
            self.config.detrend
        );

        #[cfg(feature = "parallel")]
        let (pxx, (pxy, pyy)) = rayon::join(
            || averager.auto_spectrum(reference),
            || {
                rayon::join(
                    || averager.cross_spectrum(reference, response),
                    || averager.auto_spectrum(response),
                )
            },
        );

        #[cfg(not(feature = "parallel"))]
        let (pxx, pxy, pyy) = (
            averager.auto_spectrum(reference),
            averager.cross_spectrum(reference, response),
            averager.auto_spectrum(response),
        );

        FrequencyResponse::from_spectra(&pxx?, &pxy?, &pyy?, self.degenerate_floor)
    }

    /// Estimate from two sample sequences, which must share a sample rate.
    pub fn estimate_sequences(
        &self,
        reference: &SampleSequence<'_>,
        response: &SampleSequence<'_>,
    ) -> Result<FrequencyResponse> {
        if reference.sample_rate() != response.sample_rate() {
            return Err(AnalysisError::invalid(
                "sample_rate",
                format!("{} vs {}", reference.sample_rate(), response.sample_rate()),
                "reference and response sample rates differ",
            ));
        }
        self.estimate(reference.samples(), response.samples(), reference.sample_rate())
    }
}

/// Estimate the frequency response from `reference` (stimulus) to
/// `response` with the default degenerate floor.
pub fn estimate_frequency_response(
    reference: &[f64],
    response: &[f64],
    sample_rate: f64,
    config: &SegmentationConfig,
) -> Result<FrequencyResponse> {
    FrequencyResponseEstimator::new(*config).estimate(reference, response, sample_rate)
}

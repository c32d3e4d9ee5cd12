//! Welch's method: averaged periodograms over overlapping segments.
//!
//! Each segment pair is detrended, windowed, and transformed by a
//! [`PeriodogramEstimator`]; the per-segment periodograms are summed into a
//! [`SpectralAccumulator`] and divided by the segment count only when the
//! estimate is read out. Averaging `nseg` periodograms cuts the estimator
//! variance roughly by `nseg` at a frequency resolution of
//! `fs / segment_length`.
//!
//! With the `parallel` feature, per-segment periodograms are computed on the
//! rayon pool but still summed in segment order, so the result does not
//! depend on the thread count.

use crate::error::{AnalysisError, Result};
use crate::periodogram::PeriodogramEstimator;
use crate::segment::SegmentationConfig;
use rustfft::num_complex::Complex64;

/// A one-sided spectrum: ascending bin frequencies from DC to Nyquist and a
/// value per bin.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralEstimate<T> {
    frequencies: Vec<f64>,
    values: Vec<T>,
    segments: usize,
}

impl<T> SpectralEstimate<T> {
    /// Wrap externally computed values. `frequencies` and `values` must be
    /// the same length.
    pub fn new(frequencies: Vec<f64>, values: Vec<T>, segments: usize) -> Result<Self> {
        if frequencies.len() != values.len() {
            return Err(AnalysisError::SpectrumMismatch {
                expected: frequencies.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            frequencies,
            values,
            segments,
        })
    }

    /// Bin frequencies in Hz.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Spectral value per bin.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of segments averaged.
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// `(frequency, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> {
        self.frequencies.iter().copied().zip(self.values.iter())
    }

    /// Split into `(frequencies, values)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<T>) {
        (self.frequencies, self.values)
    }
}

/// Running sum of periodograms and how many went in.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralAccumulator {
    sum: Vec<Complex64>,
    count: usize,
}

impl SpectralAccumulator {
    /// Empty accumulator for `bins` frequency bins.
    pub fn new(bins: usize) -> Self {
        Self {
            sum: vec![Complex64::new(0.0, 0.0); bins],
            count: 0,
        }
    }

    /// Add one periodogram.
    pub fn add(&mut self, periodogram: &[Complex64]) {
        debug_assert_eq!(periodogram.len(), self.sum.len());
        for (acc, &p) in self.sum.iter_mut().zip(periodogram) {
            *acc += p;
        }
        self.count += 1;
    }

    /// Number of periodograms added.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Arithmetic mean per bin. All zeros if nothing was added.
    pub fn mean(&self) -> Vec<Complex64> {
        if self.count == 0 {
            return self.sum.clone();
        }
        let inv = 1.0 / self.count as f64;
        self.sum.iter().map(|&s| s * inv).collect()
    }
}

/// Welch averager bound to a segmentation and a sample rate.
#[derive(Debug, Clone)]
pub struct SpectralAverager {
    config: SegmentationConfig,
    estimator: PeriodogramEstimator,
}

impl SpectralAverager {
    /// Validate `config` and plan the transform. Fails fast on any bad
    /// parameter, before data is seen.
    pub fn new(config: &SegmentationConfig, sample_rate: f64) -> Result<Self> {
        config.validate()?;
        let estimator = PeriodogramEstimator::new(
            config.segment_length,
            config.window,
            config.detrend,
            config.scaling,
            sample_rate,
        )?;
        Ok(Self {
            config: *config,
            estimator,
        })
    }

    /// Segmentation in use.
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Per-segment estimator in use.
    pub fn estimator(&self) -> &PeriodogramEstimator {
        &self.estimator
    }

    /// Averaged cross-spectrum `Pab`, phase of `b` relative to `a`.
    pub fn cross_spectrum(&self, a: &[f64], b: &[f64]) -> Result<SpectralEstimate<Complex64>> {
        let acc = self.accumulate(a, b)?;
        Ok(SpectralEstimate {
            frequencies: self.estimator.frequencies(),
            values: acc.mean(),
            segments: acc.count(),
        })
    }

    /// Averaged auto-spectrum `Paa`.
    pub fn auto_spectrum(&self, a: &[f64]) -> Result<SpectralEstimate<f64>> {
        let acc = self.accumulate(a, a)?;
        Ok(SpectralEstimate {
            frequencies: self.estimator.frequencies(),
            values: acc.mean().into_iter().map(|p| p.re).collect(),
            segments: acc.count(),
        })
    }

    fn accumulate(&self, a: &[f64], b: &[f64]) -> Result<SpectralAccumulator> {
        if a.len() != b.len() {
            return Err(AnalysisError::LengthMismatch {
                reference: a.len(),
                response: b.len(),
            });
        }
        let segments_a = self.config.segments(a)?;
        let segments_b = self.config.segments(b)?;
        tracing::debug!(
            "welch: {} samples, segment_length={}, step={}, {} segments",
            a.len(),
            self.config.segment_length,
            segments_a.step(),
            segments_a.count_total()
        );

        let mut acc = SpectralAccumulator::new(self.estimator.bins());

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let periodograms: Vec<Vec<Complex64>> = (0..segments_a.count_total())
                .into_par_iter()
                .filter_map(|i| Some((segments_a.get(i)?, segments_b.get(i)?)))
                .map(|(sa, sb)| self.estimator.periodogram(sa.samples, sb.samples))
                .collect();
            for p in &periodograms {
                acc.add(p);
            }
        }

        #[cfg(not(feature = "parallel"))]
        for (sa, sb) in segments_a.zip(segments_b) {
            acc.add(&self.estimator.periodogram(sa.samples, sb.samples));
        }

        Ok(acc)
    }
}

/// Welch power spectrum of `x` (real, one-sided).
pub fn welch_psd(
    x: &[f64],
    sample_rate: f64,
    config: &SegmentationConfig,
) -> Result<SpectralEstimate<f64>> {
    SpectralAverager::new(config, sample_rate)?.auto_spectrum(x)
}

/// Welch cross-spectrum of `x` and `y` (complex, one-sided).
pub fn csd(
    x: &[f64],
    y: &[f64],
    sample_rate: f64,
    config: &SegmentationConfig,
) -> Result<SpectralEstimate<Complex64>> {
    SpectralAverager::new(config, sample_rate)?.cross_spectrum(x, y)
}

//! Scaled one-sided auto- and cross-periodograms of single segments.
//!
//! A segment goes through detrend, window, and FFT to produce its transform
//! `A(f)`; two transforms combine into
//!
//! ```text
//! S_ab(f) = w(f) * scale * conj(A(f)) * B(f)
//! ```
//!
//! where `w(f)` is 2 for every bin except DC and, for even segment lengths,
//! Nyquist (those bins have no mirrored negative-frequency partner), and
//! `scale` is set by [`ScalingMode`]. With `a` as the reference and `b` as
//! the response, the phase of `S_ab` is the phase of `B/A`.

use crate::detrend::Detrend;
use crate::error::{AnalysisError, Result};
use crate::fft::Fft;
use crate::window::{Window, WindowTable};
use rustfft::num_complex::Complex64;
use std::fmt;
use std::str::FromStr;

/// Units of the produced spectra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalingMode {
    /// Power spectral density (units²/Hz), `scale = 1 / (fs * sum(w²))`.
    Density,
    /// Mean-square amplitude (units²), `scale = 1 / sum(w)²`.
    #[default]
    Spectrum,
}

impl ScalingMode {
    /// Canonical lowercase name, accepted back by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            ScalingMode::Density => "density",
            ScalingMode::Spectrum => "spectrum",
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScalingMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "density" | "psd" => Ok(ScalingMode::Density),
            "spectrum" | "power" => Ok(ScalingMode::Spectrum),
            _ => Err(AnalysisError::invalid("scaling", s, "unknown scaling mode")),
        }
    }
}

/// Whether bin `k` of an `n`-point transform is doubled when folding to a
/// one-sided spectrum.
#[inline]
pub fn is_folded_bin(k: usize, n: usize) -> bool {
    k != 0 && !(n % 2 == 0 && k == n / 2)
}

/// Per-segment transform and periodogram pipeline for a fixed segment length.
#[derive(Debug, Clone)]
pub struct PeriodogramEstimator {
    fft: Fft,
    table: WindowTable,
    detrend: Detrend,
    scaling: ScalingMode,
    sample_rate: f64,
    scale: f64,
}

impl PeriodogramEstimator {
    /// Build the pipeline, rejecting sample rates and windows that would
    /// make the scale factor non-finite.
    pub fn new(
        segment_length: usize,
        window: Window,
        detrend: Detrend,
        scaling: ScalingMode,
        sample_rate: f64,
    ) -> Result<Self> {
        if segment_length == 0 {
            return Err(AnalysisError::invalid(
                "segment_length",
                segment_length,
                "must be at least 1",
            ));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(AnalysisError::invalid(
                "sample_rate",
                sample_rate,
                "must be positive and finite",
            ));
        }

        let table = WindowTable::new(window, segment_length);
        let scale = match scaling {
            ScalingMode::Density => 1.0 / (sample_rate * table.sum_sq()),
            ScalingMode::Spectrum => 1.0 / (table.sum() * table.sum()),
        };
        if !scale.is_finite() {
            return Err(AnalysisError::invalid(
                "window",
                format!("{window} ({segment_length} samples)"),
                "window has no energy at this segment length",
            ));
        }

        Ok(Self {
            fft: Fft::new(segment_length),
            table,
            detrend,
            scaling,
            sample_rate,
            scale,
        })
    }

    /// Samples per segment.
    pub fn segment_length(&self) -> usize {
        self.fft.size()
    }

    /// One-sided bin count, `segment_length / 2 + 1`.
    pub fn bins(&self) -> usize {
        self.fft.bins()
    }

    /// Scaling convention in use.
    pub fn scaling(&self) -> ScalingMode {
        self.scaling
    }

    /// Window table in use.
    pub fn window(&self) -> &WindowTable {
        &self.table
    }

    /// Scale factor applied before one-sided doubling.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Bin frequencies `k * fs / segment_length` for `k = 0..=segment_length/2`.
    pub fn frequencies(&self) -> Vec<f64> {
        let resolution = self.sample_rate / self.segment_length() as f64;
        (0..self.bins()).map(|k| k as f64 * resolution).collect()
    }

    /// Detrend, window, and transform one segment.
    pub fn transform(&self, segment: &[f64]) -> Vec<Complex64> {
        let mut buffer = segment.to_vec();
        self.detrend.apply(&mut buffer);
        self.table.apply(&mut buffer);
        self.fft.forward(&buffer)
    }

    /// Scaled one-sided cross-periodogram of two transforms.
    pub fn cross(&self, a: &[Complex64], b: &[Complex64]) -> Vec<Complex64> {
        let n = self.segment_length();
        a.iter()
            .zip(b)
            .enumerate()
            .map(|(k, (&ak, &bk))| ak.conj() * bk * self.bin_scale(k, n))
            .collect()
    }

    /// Scaled one-sided auto-periodogram of a transform.
    pub fn auto(&self, a: &[Complex64]) -> Vec<f64> {
        let n = self.segment_length();
        a.iter()
            .enumerate()
            .map(|(k, ak)| ak.norm_sqr() * self.bin_scale(k, n))
            .collect()
    }

    /// Cross-periodogram of two raw segments. Pass the same slice twice for
    /// an auto-periodogram (returned with zero imaginary part).
    pub fn periodogram(&self, a: &[f64], b: &[f64]) -> Vec<Complex64> {
        let ta = self.transform(a);
        if std::ptr::eq(a, b) {
            return self
                .auto(&ta)
                .into_iter()
                .map(|p| Complex64::new(p, 0.0))
                .collect();
        }
        let tb = self.transform(b);
        self.cross(&ta, &tb)
    }

    #[inline]
    fn bin_scale(&self, k: usize, n: usize) -> f64 {
        if is_folded_bin(k, n) {
            2.0 * self.scale
        } else {
            self.scale
        }
    }
}

//! Transfer function and coherence from averaged spectra

use crate::error::{AnalysisError, Result};
use crate::welch::SpectralEstimate;
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// Frequency response estimate with per-bin coherence.
///
/// `response[k]` is the H1 estimate `Pxy / Pxx` and `coherence[k]` is
/// `|Pxy|² / (Pxx Pyy)`. Bins where the reference auto-spectrum is at or
/// below the degenerate floor carry NaN in both and `valid[k] == false`;
/// every other bin has coherence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResponse {
    /// Frequency bins (Hz)
    pub frequencies: Vec<f64>,
    /// Complex gain per bin
    pub response: Vec<Complex64>,
    /// Coherence (0-1, measure of linearity)
    pub coherence: Vec<f64>,
    /// False where the reference had no usable energy
    pub valid: Vec<bool>,
    /// Segments averaged into each spectrum
    pub segment_count: usize,
}

impl FrequencyResponse {
    /// Combine Pxx, Pxy, and Pyy computed over the same bins.
    ///
    /// A bin is degenerate when `Pxx <= floor * max(Pxx)`; `floor = 0`
    /// masks only bins that are exactly zero. Bins where Pxy or Pyy is not
    /// finite (NaN or infinity in the response) are masked the same way.
    ///
    /// The three spectra must share bin count, frequency grid, and segment
    /// count.
    pub fn from_spectra(
        pxx: &SpectralEstimate<f64>,
        pxy: &SpectralEstimate<Complex64>,
        pyy: &SpectralEstimate<f64>,
        floor: f64,
    ) -> Result<Self> {
        if !(floor.is_finite() && floor >= 0.0) {
            return Err(AnalysisError::invalid(
                "degenerate_floor",
                floor,
                "must be finite and non-negative",
            ));
        }
        check_same_bins(pxx, pxy.frequencies(), pxy.segment_count())?;
        check_same_bins(pxx, pyy.frequencies(), pyy.segment_count())?;

        let peak = pxx.values().iter().copied().fold(0.0f64, f64::max);
        let threshold = floor * peak;

        let bins = pxx.len();
        let mut response = Vec::with_capacity(bins);
        let mut coherence = Vec::with_capacity(bins);
        let mut valid = Vec::with_capacity(bins);
        let mut non_finite = 0usize;

        for ((&xx, &xy), &yy) in pxx.values().iter().zip(pxy.values()).zip(pyy.values()) {
            // Negated so NaN also lands in the degenerate branch.
            let degenerate = !(xx > threshold);
            let corrupt = !degenerate && !(xy.is_finite() && yy.is_finite());
            if degenerate || corrupt {
                non_finite += usize::from(corrupt);
                response.push(Complex64::new(f64::NAN, f64::NAN));
                coherence.push(f64::NAN);
                valid.push(false);
                continue;
            }
            response.push(xy / xx);
            // Ratios taken before the product so tiny or huge spectra neither
            // underflow nor overflow.
            let coh = if yy > 0.0 {
                let r = xy.norm();
                ((r / xx) * (r / yy)).clamp(0.0, 1.0)
            } else {
                0.0
            };
            coherence.push(coh);
            valid.push(true);
        }

        let masked = valid.iter().filter(|v| !**v).count();
        if masked > 0 {
            tracing::warn!(
                "transfer_fn: {masked} of {bins} bins masked ({} degenerate reference power below floor {floor:e}, {non_finite} non-finite response), reported as NaN",
                masked - non_finite
            );
        }

        Ok(Self {
            frequencies: pxx.frequencies().to_vec(),
            response,
            coherence,
            valid,
            segment_count: pxx.segment_count(),
        })
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Indices of masked bins (degenerate reference or non-finite response).
    pub fn degenerate_bins(&self) -> Vec<usize> {
        self.valid
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| (!v).then_some(i))
            .collect()
    }

    /// Indices of valid bins whose coherence exceeds `threshold`.
    pub fn coherent_band(&self, threshold: f64) -> Vec<usize> {
        self.coherence
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| (c > threshold).then_some(i))
            .collect()
    }

    /// Linear gain `|H|` per bin.
    pub fn magnitude(&self) -> Vec<f64> {
        self.response.iter().map(|h| h.norm()).collect()
    }

    /// Gain in dB, `20 log10 |H|`. Zero gain reads -240 dB; NaN stays NaN.
    pub fn magnitude_db(&self) -> Vec<f64> {
        self.response
            .iter()
            .map(|h| {
                let mag = h.norm();
                if mag.is_nan() {
                    mag
                } else {
                    20.0 * mag.max(1e-12).log10()
                }
            })
            .collect()
    }

    /// Wrapped phase in radians, `(-pi, pi]`.
    pub fn phase_rad(&self) -> Vec<f64> {
        self.response.iter().map(|h| h.arg()).collect()
    }

    /// Wrapped phase in degrees.
    pub fn phase_deg(&self) -> Vec<f64> {
        self.response.iter().map(|h| h.arg().to_degrees()).collect()
    }

    /// Phase with 2-pi jumps removed.
    pub fn unwrapped_phase(&self) -> Vec<f64> {
        unwrap_phase(&self.phase_rad())
    }

    /// Interpolated linear gain at `freq_hz`.
    pub fn magnitude_at(&self, freq_hz: f64) -> f64 {
        interpolate(&self.frequencies, &self.magnitude(), freq_hz)
    }

    /// Interpolated unwrapped phase (radians) at `freq_hz`.
    pub fn phase_at(&self, freq_hz: f64) -> f64 {
        interpolate(&self.frequencies, &self.unwrapped_phase(), freq_hz)
    }

    /// First frequency where the gain falls 3 dB below `reference_db`.
    pub fn cutoff_frequency(&self, reference_db: f64) -> Option<f64> {
        let target = reference_db - 3.0;
        let mag = self.magnitude_db();

        for i in 1..mag.len() {
            if mag[i] < target && mag[i - 1] >= target {
                let t = (target - mag[i - 1]) / (mag[i] - mag[i - 1]);
                return Some(
                    self.frequencies[i - 1] + t * (self.frequencies[i] - self.frequencies[i - 1]),
                );
            }
        }
        None
    }

    /// Group delay in seconds, `-d(phase)/d(omega)`.
    ///
    /// Central differences inside, one-sided at the ends.
    pub fn group_delay(&self) -> Vec<f64> {
        let n = self.frequencies.len();
        if n < 2 {
            return vec![0.0; n];
        }
        let phase = self.unwrapped_phase();
        let slope = |lo: usize, hi: usize| {
            let d_omega = 2.0 * PI * (self.frequencies[hi] - self.frequencies[lo]);
            if d_omega > 0.0 {
                -(phase[hi] - phase[lo]) / d_omega
            } else {
                0.0
            }
        };

        let mut delay = Vec::with_capacity(n);
        delay.push(slope(0, 1));
        for i in 1..n - 1 {
            delay.push(slope(i - 1, i + 1));
        }
        delay.push(slope(n - 2, n - 1));
        delay
    }
}

fn check_same_bins(
    pxx: &SpectralEstimate<f64>,
    frequencies: &[f64],
    segments: usize,
) -> Result<()> {
    if frequencies.len() != pxx.len() {
        return Err(AnalysisError::SpectrumMismatch {
            expected: pxx.len(),
            actual: frequencies.len(),
        });
    }
    for (bin, (&expected, &actual)) in pxx.frequencies().iter().zip(frequencies).enumerate() {
        if (expected - actual).abs() > 1e-9 * expected.abs().max(actual.abs()) {
            return Err(AnalysisError::FrequencyGridMismatch {
                bin,
                expected,
                actual,
            });
        }
    }
    if segments != pxx.segment_count() {
        return Err(AnalysisError::SegmentCountMismatch {
            expected: pxx.segment_count(),
            actual: segments,
        });
    }
    Ok(())
}

/// Unwrap phase to remove discontinuities
///
/// Phase values are adjusted to be continuous by adding/subtracting
/// multiples of 2*pi when jumps exceed pi. Non-finite entries pass through
/// and do not disturb the unwrapping of the bins after them.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let two_pi = 2.0 * PI;
    let mut correction = 0.0;
    let mut previous: Option<f64> = None;

    phase
        .iter()
        .map(|&p| {
            if !p.is_finite() {
                return p;
            }
            if let Some(prev) = previous {
                let diff = p - prev;
                if diff > PI {
                    correction -= two_pi;
                } else if diff < -PI {
                    correction += two_pi;
                }
            }
            previous = Some(p);
            p + correction
        })
        .collect()
}

/// Linear interpolation helper
fn interpolate(x: &[f64], y: &[f64], target_x: f64) -> f64 {
    let (Some(&first), Some(&last)) = (y.first(), y.last()) else {
        return f64::NAN;
    };

    if target_x <= x[0] {
        return first;
    }

    for i in 1..x.len() {
        if target_x <= x[i] {
            let t = (target_x - x[i - 1]) / (x[i] - x[i - 1]);
            return y[i - 1] + t * (y[i] - y[i - 1]);
        }
    }

    last
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectra(
        pxx: Vec<f64>,
        pxy: Vec<Complex64>,
        pyy: Vec<f64>,
    ) -> (SpectralEstimate<f64>, SpectralEstimate<Complex64>, SpectralEstimate<f64>) {
        let freqs = |n: usize| (0..n).map(|k| k as f64).collect::<Vec<_>>();
        (
            SpectralEstimate::new(freqs(pxx.len()), pxx, 1).unwrap(),
            SpectralEstimate::new(freqs(pxy.len()), pxy, 1).unwrap(),
            SpectralEstimate::new(freqs(pyy.len()), pyy, 1).unwrap(),
        )
    }

    #[test]
    fn test_h1_and_coherence() {
        let (pxx, pxy, pyy) = spectra(
            vec![2.0, 4.0, 1.0],
            vec![Complex64::new(2.0, 2.0), Complex64::new(0.0, -4.0), Complex64::new(0.5, 0.0)],
            vec![4.0, 8.0, 1.0],
        );
        let fr = FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 0.0).unwrap();
        assert_eq!(fr.response[0], Complex64::new(1.0, 1.0));
        assert_eq!(fr.response[1], Complex64::new(0.0, -1.0));
        assert!((fr.coherence[0] - 1.0).abs() < 1e-12);
        assert!((fr.coherence[1] - 0.5).abs() < 1e-12);
        assert!((fr.coherence[2] - 0.25).abs() < 1e-12);
        assert!(fr.valid.iter().all(|&v| v));
    }

    #[test]
    fn test_degenerate_bins_masked() {
        let (pxx, pxy, pyy) = spectra(
            vec![0.0, 1.0, 1e-20],
            vec![Complex64::new(1.0, 0.0); 3],
            vec![1.0; 3],
        );
        let fr = FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 1e-12).unwrap();
        assert_eq!(fr.valid, vec![false, true, false]);
        assert!(fr.response[0].re.is_nan());
        assert!(fr.coherence[2].is_nan());
        assert_eq!(fr.degenerate_bins(), vec![0, 2]);

        // Exact-zero floor keeps the tiny-but-positive bin.
        let fr = FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 0.0).unwrap();
        assert_eq!(fr.valid, vec![false, true, true]);
    }

    #[test]
    fn test_silent_response_has_zero_coherence() {
        let (pxx, pxy, pyy) = spectra(
            vec![1.0, 1.0, 1.0],
            vec![Complex64::new(0.0, 0.0); 3],
            vec![0.0; 3],
        );
        let fr = FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 1e-12).unwrap();
        assert_eq!(fr.coherence, vec![0.0; 3]);
        assert_eq!(fr.magnitude(), vec![0.0; 3]);
    }

    #[test]
    fn test_invalid_floor() {
        let (pxx, pxy, pyy) = spectra(vec![1.0; 3], vec![Complex64::new(1.0, 0.0); 3], vec![1.0; 3]);
        for floor in [-1.0, f64::NAN] {
            assert!(matches!(
                FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, floor),
                Err(AnalysisError::InvalidConfiguration { param: "degenerate_floor", .. })
            ));
        }
    }

    #[test]
    fn test_mismatched_bins() {
        let (pxx, pxy, _) = spectra(vec![1.0; 3], vec![Complex64::new(1.0, 0.0); 3], vec![1.0; 3]);
        let (_, _, pyy) = spectra(vec![1.0; 5], vec![Complex64::new(1.0, 0.0); 5], vec![1.0; 5]);
        assert_eq!(
            FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 0.0).unwrap_err(),
            AnalysisError::SpectrumMismatch {
                expected: 3,
                actual: 5
            }
        );
    }

    #[test]
    fn test_same_bin_count_different_grid_rejected() {
        use crate::segment::SegmentationConfig;
        use crate::welch::SpectralAverager;

        // 200 and 201 samples both give 101 bins, over different spans.
        let x: Vec<f64> = (0..2000).map(|i| ((i * 37) % 101) as f64 - 50.0).collect();
        let fine = SpectralAverager::new(&SegmentationConfig::new(200), 1000.0).unwrap();
        let coarse = SpectralAverager::new(&SegmentationConfig::new(201), 50.0).unwrap();

        let pxx = fine.auto_spectrum(&x).unwrap();
        let pxy = coarse.cross_spectrum(&x, &x).unwrap();
        let pyy = coarse.auto_spectrum(&x).unwrap();
        assert_eq!(pxx.len(), pxy.len());

        assert!(matches!(
            FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 1e-12),
            Err(AnalysisError::FrequencyGridMismatch { bin: 1, .. })
        ));
    }

    #[test]
    fn test_segment_count_mismatch_rejected() {
        let freqs = vec![0.0, 1.0, 2.0];
        let pxx = SpectralEstimate::new(freqs.clone(), vec![1.0; 3], 4).unwrap();
        let pxy = SpectralEstimate::new(freqs.clone(), vec![Complex64::new(1.0, 0.0); 3], 4).unwrap();
        let pyy = SpectralEstimate::new(freqs, vec![1.0; 3], 3).unwrap();
        assert_eq!(
            FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 0.0).unwrap_err(),
            AnalysisError::SegmentCountMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_non_finite_response_is_masked() {
        let (pxx, pxy, pyy) = spectra(
            vec![1.0, 1.0, 1.0],
            vec![
                Complex64::new(1.0, 0.0),
                Complex64::new(f64::NAN, f64::NAN),
                Complex64::new(1.0, 0.0),
            ],
            vec![1.0, f64::NAN, f64::INFINITY],
        );
        let fr = FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 1e-12).unwrap();
        assert_eq!(fr.valid, vec![true, false, false]);
        assert!(fr.coherence[1].is_nan() && fr.coherence[2].is_nan());
        assert!(fr.response[2].re.is_nan());
        assert_eq!(fr.coherence[0], 1.0);
    }

    #[test]
    fn test_coherence_survives_extreme_power() {
        for scale in [1e-300, 1e300] {
            let (pxx, pxy, pyy) = spectra(
                vec![2.0 * scale, scale],
                vec![Complex64::new(scale, scale), Complex64::new(0.0, 0.5 * scale)],
                vec![scale, scale],
            );
            let fr = FrequencyResponse::from_spectra(&pxx, &pxy, &pyy, 1e-12).unwrap();
            assert!(fr.valid.iter().all(|&v| v));
            assert!((fr.coherence[0] - 1.0).abs() < 1e-12, "scale {scale:e}: {}", fr.coherence[0]);
            assert!((fr.coherence[1] - 0.25).abs() < 1e-12, "scale {scale:e}: {}", fr.coherence[1]);
        }
    }

    fn response_from(frequencies: Vec<f64>, response: Vec<Complex64>) -> FrequencyResponse {
        let n = frequencies.len();
        FrequencyResponse {
            frequencies,
            response,
            coherence: vec![1.0; n],
            valid: vec![true; n],
            segment_count: 1,
        }
    }

    #[test]
    fn test_pure_delay_group_delay() {
        // H(f) = exp(-j 2 pi f tau) has group delay tau everywhere.
        let tau = 0.002;
        let freqs: Vec<f64> = (0..200).map(|k| k as f64 * 5.0).collect();
        let response = freqs
            .iter()
            .map(|&f| Complex64::from_polar(1.0, -2.0 * PI * f * tau))
            .collect();
        let fr = response_from(freqs, response);
        for d in fr.group_delay() {
            assert!((d - tau).abs() < 1e-9, "delay {d}");
        }
    }

    #[test]
    fn test_cutoff_and_interpolation() {
        // First-order low-pass with fc = 100 Hz.
        let fc = 100.0;
        let freqs: Vec<f64> = (0..=500).map(f64::from).collect();
        let response = freqs
            .iter()
            .map(|&f| Complex64::new(1.0, 0.0) / Complex64::new(1.0, f / fc))
            .collect();
        let fr = response_from(freqs, response);

        let cutoff = fr.cutoff_frequency(0.0).unwrap();
        assert!((cutoff - fc).abs() < 1.0, "cutoff {cutoff}");
        assert!((fr.magnitude_at(100.5) - fr.magnitude_at(100.0)).abs() < 0.01);
        assert!((fr.phase_at(fc) + PI / 4.0).abs() < 1e-9);
        assert!((fr.phase_deg()[100] + 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_magnitude_db_keeps_nan() {
        let fr = response_from(
            vec![0.0, 1.0],
            vec![Complex64::new(f64::NAN, f64::NAN), Complex64::new(10.0, 0.0)],
        );
        let db = fr.magnitude_db();
        assert!(db[0].is_nan());
        assert!((db[1] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_unwrap_phase() {
        let wrapped = vec![0.0, PI * 0.5, PI * 0.9, -PI * 0.9, -PI * 0.5, 0.0];
        let unwrapped = unwrap_phase(&wrapped);

        for i in 1..unwrapped.len() {
            assert!(
                unwrapped[i] >= unwrapped[i - 1] - 0.1,
                "Phase should be continuous: {} vs {}",
                unwrapped[i - 1],
                unwrapped[i]
            );
        }
    }

    #[test]
    fn test_unwrap_phase_skips_nan() {
        let wrapped = vec![PI * 0.9, f64::NAN, -PI * 0.9];
        let unwrapped = unwrap_phase(&wrapped);
        assert!(unwrapped[1].is_nan());
        assert!((unwrapped[2] - PI * 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_coherent_band() {
        let mut fr = response_from(vec![0.0, 1.0, 2.0], vec![Complex64::new(1.0, 0.0); 3]);
        fr.coherence = vec![0.99, f64::NAN, 0.5];
        assert_eq!(fr.coherent_band(0.9), vec![0]);
    }

    #[test]
    fn test_interpolate() {
        let x = vec![0.0, 1.0, 2.0];
        let y = vec![0.0, 10.0, 20.0];

        assert_eq!(interpolate(&x, &y, 0.5), 5.0);
        assert_eq!(interpolate(&x, &y, 1.5), 15.0);
        assert_eq!(interpolate(&x, &y, 3.0), 20.0);
        assert!(interpolate(&[], &[], 1.0).is_nan());
    }
}

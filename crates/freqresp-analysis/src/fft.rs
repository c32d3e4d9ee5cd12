//! Real-input FFT wrapper returning the one-sided spectrum

use rustfft::num_complex::Complex64;
use rustfft::{Fft as FftKernel, FftPlanner};
use std::sync::Arc;

/// Forward FFT processor planned once for a fixed size.
///
/// rustfft picks a mixed-radix plan for any length, so segment lengths that
/// are not powers of two still transform in `O(n log n)`.
#[derive(Clone)]
pub struct Fft {
    fft: Arc<dyn FftKernel<f64>>,
    size: usize,
}

impl std::fmt::Debug for Fft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fft").field("size", &self.size).finish()
    }
}

impl Fft {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        Self { fft, size }
    }

    /// Get FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of one-sided bins, DC through Nyquist.
    pub fn bins(&self) -> usize {
        self.size / 2 + 1
    }

    /// Perform forward FFT on real input
    ///
    /// Returns complex spectrum (size/2 + 1 bins for positive frequencies).
    /// Input shorter than the FFT size is zero-padded; longer input is
    /// truncated.
    pub fn forward(&self, input: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input
            .iter()
            .take(self.size)
            .map(|&x| Complex64::new(x, 0.0))
            .collect();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.bins());
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_bin_count_even_and_odd() {
        assert_eq!(Fft::new(256).bins(), 129);
        assert_eq!(Fft::new(255).bins(), 128);
        assert_eq!(Fft::new(1000).forward(&[0.0; 1000]).len(), 501);
    }

    #[test]
    fn test_dc_detection() {
        let fft = Fft::new(256);
        let spectrum = fft.forward(&[1.0; 256]);

        assert!((spectrum[0].re - 256.0).abs() < 1e-9);
        let other: f64 = spectrum[1..].iter().map(|c| c.norm()).sum();
        assert!(other < 1e-9, "leakage {other}");
    }

    #[test]
    fn test_bin_centered_tone() {
        let n = 1000;
        let k = 37;
        let input: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * k as f64 * i as f64 / n as f64).cos())
            .collect();
        let spectrum = Fft::new(n).forward(&input);

        // A unit cosine on bin k puts n/2 into that bin.
        assert!((spectrum[k].norm() - n as f64 / 2.0).abs() < 1e-6);
        assert!(spectrum[k + 1].norm() < 1e-6);
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let fft = Fft::new(8);
        let spectrum = fft.forward(&[1.0, 1.0]);
        assert_eq!(spectrum.len(), 5);
        assert!((spectrum[0].re - 2.0).abs() < 1e-12);
    }
}

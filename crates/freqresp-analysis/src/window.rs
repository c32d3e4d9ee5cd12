//! Tapering windows and their scaling sums

use crate::error::{AnalysisError, Result};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window function types
///
/// All windows are generated in their periodic (DFT-even) form, which is
/// the convention for spectral estimation: the coefficient at `n = size`
/// would equal the one at `n = 0` and is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
    /// Hamming window
    Hamming,
    /// Blackman window
    Blackman,
    /// Blackman-Harris window (better sidelobe suppression)
    BlackmanHarris,
    /// 5-term flat-top window, for amplitude-accurate tone readings
    #[default]
    FlatTop,
}

const HANN: [f64; 2] = [0.5, 0.5];
const HAMMING: [f64; 2] = [0.54, 0.46];
const BLACKMAN: [f64; 3] = [0.42, 0.5, 0.08];
const BLACKMAN_HARRIS: [f64; 4] = [0.35875, 0.48829, 0.14128, 0.01168];
const FLAT_TOP: [f64; 5] = [
    0.21557895,
    0.41663158,
    0.277263158,
    0.083578947,
    0.006947368,
];

impl Window {
    /// Every supported window, in declaration order.
    pub const ALL: [Window; 6] = [
        Window::Rectangular,
        Window::Hann,
        Window::Hamming,
        Window::Blackman,
        Window::BlackmanHarris,
        Window::FlatTop,
    ];

    /// Canonical lowercase name, accepted back by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Window::Rectangular => "rectangular",
            Window::Hann => "hann",
            Window::Hamming => "hamming",
            Window::Blackman => "blackman",
            Window::BlackmanHarris => "blackman-harris",
            Window::FlatTop => "flat-top",
        }
    }

    fn cosine_terms(&self) -> &'static [f64] {
        match self {
            Window::Rectangular => &[1.0],
            Window::Hann => &HANN,
            Window::Hamming => &HAMMING,
            Window::Blackman => &BLACKMAN,
            Window::BlackmanHarris => &BLACKMAN_HARRIS,
            Window::FlatTop => &FLAT_TOP,
        }
    }

    /// Get window coefficients
    ///
    /// Every kind is a generalized cosine sum
    /// `w[n] = sum_k (-1)^k a_k cos(2 pi k n / size)`.
    /// A single-sample window is `[1.0]` for every kind.
    pub fn coefficients(&self, size: usize) -> Vec<f64> {
        if size == 1 {
            return vec![1.0];
        }
        let terms = self.cosine_terms();
        (0..size)
            .map(|n| {
                let x = 2.0 * PI * n as f64 / size as f64;
                terms
                    .iter()
                    .enumerate()
                    .map(|(k, &a)| {
                        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                        sign * a * (k as f64 * x).cos()
                    })
                    .sum()
            })
            .collect()
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Window {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "rectangular" | "rect" | "boxcar" => Ok(Window::Rectangular),
            "hann" | "hanning" => Ok(Window::Hann),
            "hamming" => Ok(Window::Hamming),
            "blackman" => Ok(Window::Blackman),
            "blackman-harris" | "blackmanharris" => Ok(Window::BlackmanHarris),
            "flat-top" | "flattop" => Ok(Window::FlatTop),
            _ => Err(AnalysisError::invalid("window", s, "unknown window kind")),
        }
    }
}

/// Window coefficients for one segment length, with the sums used for
/// scaling.
///
/// Built once per estimation call since the segment length is fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTable {
    window: Window,
    coefficients: Vec<f64>,
    sum: f64,
    sum_sq: f64,
}

impl WindowTable {
    /// Tabulate `window` for segments of `size` samples.
    pub fn new(window: Window, size: usize) -> Self {
        let coefficients = window.coefficients(size);
        let sum = coefficients.iter().sum();
        let sum_sq = coefficients.iter().map(|w| w * w).sum();
        Self {
            window,
            coefficients,
            sum,
            sum_sq,
        }
    }

    /// Window kind this table was built from.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Segment length.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// True for a zero-length table.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Raw coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// `sum(w)`, used for amplitude-correct (spectrum) scaling.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// `sum(w^2)`, used for power-correct (density) scaling.
    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }

    /// Multiply `segment` by the window in place.
    pub fn apply(&self, segment: &mut [f64]) {
        debug_assert_eq!(segment.len(), self.coefficients.len());
        for (sample, &w) in segment.iter_mut().zip(&self.coefficients) {
            *sample *= w;
        }
    }
}

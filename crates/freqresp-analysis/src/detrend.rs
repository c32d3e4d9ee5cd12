//! Per-segment trend removal

use crate::error::{AnalysisError, Result};
use std::fmt;
use std::str::FromStr;

/// Trend removed from each segment before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Detrend {
    /// Leave the segment untouched.
    None,
    /// Subtract the arithmetic mean.
    #[default]
    Constant,
    /// Subtract the least-squares line fitted against sample index.
    Linear,
}

impl Detrend {
    /// Canonical lowercase name, accepted back by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Detrend::None => "none",
            Detrend::Constant => "constant",
            Detrend::Linear => "linear",
        }
    }

    /// Remove the trend from `segment` in place.
    pub fn apply(&self, segment: &mut [f64]) {
        let n = segment.len();
        if n == 0 {
            return;
        }
        match self {
            Detrend::None => {}
            Detrend::Constant => {
                let mean = pairwise_sum(segment) / n as f64;
                for x in segment.iter_mut() {
                    *x -= mean;
                }
            }
            Detrend::Linear => {
                let mean = pairwise_sum(segment) / n as f64;
                if n == 1 {
                    segment[0] -= mean;
                    return;
                }
                // Regress on the centered index t = i - (n-1)/2 so the
                // intercept is the mean and the slope needs a single
                // accumulation. sum(t^2) has the closed form n(n^2-1)/12.
                let center = (n - 1) as f64 / 2.0;
                let nf = n as f64;
                let sxx = nf * (nf * nf - 1.0) / 12.0;
                let sxy = pairwise_weighted(segment, center, mean);
                let slope = sxy / sxx;
                for (i, x) in segment.iter_mut().enumerate() {
                    *x -= mean + slope * (i as f64 - center);
                }
            }
        }
    }

    /// Return a detrended copy of `segment`.
    pub fn detrended(&self, segment: &[f64]) -> Vec<f64> {
        let mut out = segment.to_vec();
        self.apply(&mut out);
        out
    }
}

impl fmt::Display for Detrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Detrend {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "false" | "off" => Ok(Detrend::None),
            "constant" | "mean" => Ok(Detrend::Constant),
            "linear" => Ok(Detrend::Linear),
            _ => Err(AnalysisError::invalid("detrend", s, "unknown detrend mode")),
        }
    }
}

const PAIRWISE_BLOCK: usize = 128;

/// Pairwise (cascade) summation; error grows as O(log n) instead of O(n).
pub(crate) fn pairwise_sum(values: &[f64]) -> f64 {
    if values.len() <= PAIRWISE_BLOCK {
        return values.iter().sum();
    }
    let (lo, hi) = values.split_at(values.len() / 2);
    pairwise_sum(lo) + pairwise_sum(hi)
}

/// `sum((i + offset - center) * (x[i] - mean))` with pairwise reduction.
fn pairwise_weighted(values: &[f64], center: f64, mean: f64) -> f64 {
    fn go(values: &[f64], offset: usize, center: f64, mean: f64) -> f64 {
        if values.len() <= PAIRWISE_BLOCK {
            return values
                .iter()
                .enumerate()
                .map(|(i, &x)| ((offset + i) as f64 - center) * (x - mean))
                .sum();
        }
        let mid = values.len() / 2;
        let (lo, hi) = values.split_at(mid);
        go(lo, offset, center, mean) + go(hi, offset + mid, center, mean)
    }
    go(values, 0, center, mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let data = vec![1.0, 5.0, -2.0];
        assert_eq!(Detrend::None.detrended(&data), data);
    }

    #[test]
    fn test_constant_removes_mean() {
        let out = Detrend::Constant.detrended(&[1.0, 2.0, 3.0, 6.0]);
        assert_eq!(out, vec![-2.0, -1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_linear_removes_ramp() {
        let ramp: Vec<f64> = (0..500).map(|i| 3.0 + 0.25 * i as f64).collect();
        let out = Detrend::Linear.detrended(&ramp);
        for x in out {
            assert!(x.abs() < 1e-10, "residual {x}");
        }
    }

    #[test]
    fn test_linear_residual_is_orthogonal() {
        // The least-squares residual is orthogonal to the constant and the index.
        let data: Vec<f64> = (0..8).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let out = Detrend::Linear.detrended(&data);
        let mean: f64 = out.iter().sum::<f64>() / out.len() as f64;
        assert!(mean.abs() < 1e-12);
        let slope_proxy: f64 = out
            .iter()
            .enumerate()
            .map(|(i, x)| (i as f64 - 3.5) * x)
            .sum();
        assert!(slope_proxy.abs() < 1e-12);
    }

    #[test]
    fn test_linear_single_sample() {
        assert_eq!(Detrend::Linear.detrended(&[4.0]), vec![0.0]);
    }

    #[test]
    fn test_linear_large_offset_stable() {
        // Large DC offset on a long segment.
        let n = 1 << 20;
        let data: Vec<f64> = (0..n).map(|i| 1.0e6 + 1.0e-3 * i as f64).collect();
        let out = Detrend::Linear.detrended(&data);
        let worst = out.iter().fold(0.0f64, |m, x| m.max(x.abs()));
        assert!(worst < 1e-6, "worst residual {worst}");
    }

    #[test]
    fn test_pairwise_sum_matches_exact() {
        let values = vec![0.1; 10_000];
        assert!((pairwise_sum(&values) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse() {
        assert_eq!("linear".parse::<Detrend>().unwrap(), Detrend::Linear);
        assert_eq!("None".parse::<Detrend>().unwrap(), Detrend::None);
        assert!("quadratic".parse::<Detrend>().is_err());
    }
}

//! freqresp Analysis - Welch-averaged transfer function and coherence estimation
//!
//! This crate estimates the frequency response `H(f)` and magnitude-squared
//! coherence between a stimulus `x(t)` and a response `y(t)` from two
//! recorded (or simulated) sample sequences:
//!
//! - [`segment`] - Overlapping segmentation and its configuration
//! - [`detrend`] - Constant / linear trend removal per segment
//! - [`window`] - Tapering windows (rectangular, Hann, flat-top, ...)
//! - [`fft`] - Real-input FFT returning the one-sided spectrum
//! - [`periodogram`] - Scaled auto- and cross-periodograms of one segment
//! - [`welch`] - Welch averaging into auto- and cross-spectra
//! - [`transfer_fn`] - H1 estimate and coherence from averaged spectra
//! - [`estimator`] - The end-to-end entry point
//!
//! ## Pipeline
//!
//! ```text
//! Segments -> Detrend -> Window -> FFT -> periodogram -> average
//!                                                       Pxx, Pxy, Pyy
//!                                                          |
//!                                     H = Pxy / Pxx, coh = |Pxy|² / (Pxx Pyy)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use freqresp_analysis::{estimate_frequency_response, SegmentationConfig};
//!
//! # let reference: Vec<f64> = vec![0.0; 10_000];
//! # let response: Vec<f64> = vec![0.0; 10_000];
//! let config = SegmentationConfig::new(1000);
//! let fr = estimate_frequency_response(&reference, &response, 1000.0, &config)?;
//!
//! for ((f, gain_db), coh) in fr.frequencies.iter().zip(fr.magnitude_db()).zip(&fr.coherence) {
//!     println!("{f:8.1} Hz  {gain_db:7.2} dB  coherence {coh:.3}");
//! }
//! # Ok::<(), freqresp_analysis::AnalysisError>(())
//! ```
//!
//! Bins where the reference carries no usable energy come back as NaN with
//! `valid[k] == false`; the rest of the estimate is unaffected.
//!
//! ## Features
//!
//! - `parallel` - compute per-segment periodograms and the three spectra on
//!   the rayon pool. Results are identical to the serial path.

pub mod detrend;
pub mod error;
pub mod estimator;
pub mod fft;
pub mod periodogram;
pub mod segment;
pub mod transfer_fn;
pub mod welch;
pub mod window;

// Re-export main types
pub use detrend::Detrend;
pub use error::{AnalysisError, Result};
pub use estimator::{
    DEFAULT_DEGENERATE_FLOOR, FrequencyResponseEstimator, SampleSequence,
    estimate_frequency_response,
};
pub use fft::Fft;
pub use periodogram::{PeriodogramEstimator, ScalingMode};
pub use rustfft::num_complex::Complex64;
pub use segment::{DEFAULT_SEGMENT_LENGTH, Segment, SegmentationConfig, Segments, segment_count};
pub use transfer_fn::{FrequencyResponse, unwrap_phase};
pub use welch::{SpectralAccumulator, SpectralAverager, SpectralEstimate, csd, welch_psd};
pub use window::{Window, WindowTable};

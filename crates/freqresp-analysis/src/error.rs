//! Error types for spectral estimation.

use thiserror::Error;

/// Errors that abort an estimation call.
///
/// Every variant carries the offending value so the caller can correct the
/// call without re-deriving what went wrong. No partial result is produced
/// when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// The input is shorter than one segment.
    #[error("insufficient data: {len} samples cannot fill a segment of {segment_length}")]
    InsufficientData {
        /// Number of samples supplied.
        len: usize,
        /// Requested segment length.
        segment_length: usize,
    },

    /// Reference and response differ in length.
    #[error("length mismatch: reference has {reference} samples, response has {response}")]
    LengthMismatch {
        /// Reference sequence length.
        reference: usize,
        /// Response sequence length.
        response: usize,
    },

    /// A configuration parameter is out of its valid domain.
    #[error("invalid configuration: {param} = {value}: {reason}")]
    InvalidConfiguration {
        /// Name of the parameter.
        param: &'static str,
        /// The rejected value, rendered for display.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// Spectra handed to the calculator were computed over different bins.
    #[error("spectrum mismatch: expected {expected} bins, got {actual}")]
    SpectrumMismatch {
        /// Bin count of the reference auto-spectrum.
        expected: usize,
        /// Bin count of the offending spectrum.
        actual: usize,
    },

    /// Spectra handed to the calculator share a bin count but not the
    /// frequency grid (different segment length or sample rate).
    #[error("frequency grid mismatch at bin {bin}: expected {expected} Hz, got {actual} Hz")]
    FrequencyGridMismatch {
        /// First bin where the grids differ.
        bin: usize,
        /// Frequency of that bin in the reference auto-spectrum.
        expected: f64,
        /// Frequency of that bin in the offending spectrum.
        actual: f64,
    },

    /// Spectra handed to the calculator averaged different segment counts.
    #[error("segment count mismatch: expected {expected} segments, got {actual}")]
    SegmentCountMismatch {
        /// Segments behind the reference auto-spectrum.
        expected: usize,
        /// Segments behind the offending spectrum.
        actual: usize,
    },
}

impl AnalysisError {
    /// Create an invalid configuration error.
    pub fn invalid(param: &'static str, value: impl ToString, reason: &'static str) -> Self {
        AnalysisError::InvalidConfiguration {
            param,
            value: value.to_string(),
            reason,
        }
    }
}

/// Result type for estimation operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

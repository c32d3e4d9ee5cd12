//! Overlapping segmentation of a sample sequence

use crate::detrend::Detrend;
use crate::error::{AnalysisError, Result};
use crate::periodogram::ScalingMode;
use crate::window::Window;

/// Default segment length, in samples.
pub const DEFAULT_SEGMENT_LENGTH: usize = 1024;

/// How a sequence is cut up and conditioned before transforming.
///
/// ```rust
/// use freqresp_analysis::{Detrend, ScalingMode, SegmentationConfig, Window};
///
/// let config = SegmentationConfig::new(1000)
///     .with_window(Window::Hann)
///     .with_scaling(ScalingMode::Density)
///     .with_detrend(Detrend::Linear);
/// assert_eq!(config.resolved_overlap(), 500);
/// assert_eq!(config.segment_count(10_000), 19);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationConfig {
    /// Samples per segment; also the FFT size.
    pub segment_length: usize,
    /// Samples shared by consecutive segments. `None` means half a segment.
    pub overlap: Option<usize>,
    /// Taper applied after detrending.
    pub window: Window,
    /// Trend removed from each segment.
    pub detrend: Detrend,
    /// Units of the produced spectra.
    pub scaling: ScalingMode,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SEGMENT_LENGTH)
    }
}

impl SegmentationConfig {
    /// Defaults (flat-top, spectrum scaling, constant detrend, half overlap)
    /// at the given segment length.
    pub fn new(segment_length: usize) -> Self {
        Self {
            segment_length,
            overlap: None,
            window: Window::FlatTop,
            detrend: Detrend::Constant,
            scaling: ScalingMode::Spectrum,
        }
    }

    /// Set an explicit overlap.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Set the window.
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Set the detrend mode.
    pub fn with_detrend(mut self, detrend: Detrend) -> Self {
        self.detrend = detrend;
        self
    }

    /// Set the scaling mode.
    pub fn with_scaling(mut self, scaling: ScalingMode) -> Self {
        self.scaling = scaling;
        self
    }

    /// Overlap in samples, with the half-segment default filled in.
    pub fn resolved_overlap(&self) -> usize {
        self.overlap.unwrap_or(self.segment_length / 2)
    }

    /// Segment start spacing.
    pub fn step(&self) -> usize {
        self.segment_length.saturating_sub(self.resolved_overlap())
    }

    /// Segments produced from `len` samples (0 if none fit).
    pub fn segment_count(&self, len: usize) -> usize {
        segment_count(len, self.segment_length, self.resolved_overlap())
    }

    /// Check the configuration on its own, before any data is seen.
    pub fn validate(&self) -> Result<()> {
        if self.segment_length == 0 {
            return Err(AnalysisError::invalid(
                "segment_length",
                self.segment_length,
                "must be at least 1",
            ));
        }
        let overlap = self.resolved_overlap();
        if overlap >= self.segment_length {
            return Err(AnalysisError::invalid(
                "overlap",
                overlap,
                "must be smaller than segment_length",
            ));
        }
        Ok(())
    }

    /// Check the configuration against an input length.
    pub fn validate_for(&self, len: usize) -> Result<()> {
        self.validate()?;
        if self.segment_count(len) == 0 {
            return Err(AnalysisError::InsufficientData {
                len,
                segment_length: self.segment_length,
            });
        }
        Ok(())
    }

    /// Segment iterator over `data` under this configuration.
    pub fn segments<'a>(&self, data: &'a [f64]) -> Result<Segments<'a>> {
        Segments::new(data, self.segment_length, self.resolved_overlap())
    }
}

/// One fixed-length slice of the input and where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<'a> {
    /// Index of the first sample in the source sequence.
    pub offset: usize,
    /// The borrowed samples.
    pub samples: &'a [f64],
}

/// Number of full segments in `len` samples:
/// `1 + (len - segment_length) / (segment_length - overlap)`, or 0 when the
/// input is shorter than one segment.
pub fn segment_count(len: usize, segment_length: usize, overlap: usize) -> usize {
    if segment_length == 0 || overlap >= segment_length || len < segment_length {
        return 0;
    }
    1 + (len - segment_length) / (segment_length - overlap)
}

/// Iterator over the segments of a sequence, in increasing offset order.
///
/// Segments start at `0, step, 2 * step, ...` with
/// `step = segment_length - overlap`; a trailing partial segment is dropped.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    data: &'a [f64],
    segment_length: usize,
    step: usize,
    index: usize,
    count: usize,
}

impl<'a> Segments<'a> {
    /// Plan the segmentation of `data`.
    pub fn new(data: &'a [f64], segment_length: usize, overlap: usize) -> Result<Self> {
        if segment_length == 0 {
            return Err(AnalysisError::invalid(
                "segment_length",
                segment_length,
                "must be at least 1",
            ));
        }
        if overlap >= segment_length {
            return Err(AnalysisError::invalid(
                "overlap",
                overlap,
                "must be smaller than segment_length",
            ));
        }
        let count = segment_count(data.len(), segment_length, overlap);
        if count == 0 {
            return Err(AnalysisError::InsufficientData {
                len: data.len(),
                segment_length,
            });
        }
        Ok(Self {
            data,
            segment_length,
            step: segment_length - overlap,
            index: 0,
            count,
        })
    }

    /// Distance between consecutive segment starts.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Total number of segments in the plan, independent of iteration.
    pub fn count_total(&self) -> usize {
        self.count
    }

    /// Segment at position `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<Segment<'a>> {
        if index >= self.count {
            return None;
        }
        let offset = index * self.step;
        Some(Segment {
            offset,
            samples: &self.data[offset..offset + self.segment_length],
        })
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let segment = self.get(self.index)?;
        self.index += 1;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Segments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_half_overlap() {
        let data: Vec<f64> = (0..10).map(f64::from).collect();
        let offsets: Vec<usize> = Segments::new(&data, 4, 2)
            .unwrap()
            .map(|s| s.offset)
            .collect();
        assert_eq!(offsets, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_trailing_partial_dropped() {
        let data = vec![0.0; 11];
        let segments = Segments::new(&data, 4, 0).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments.step(), 4);
    }

    #[test]
    fn test_exact_length_is_one_segment() {
        let data = vec![1.0; 16];
        let segments: Vec<_> = Segments::new(&data, 16, 8).unwrap().collect();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].samples.len(), 16);
    }

    #[test]
    fn test_short_input_rejected() {
        let data = vec![1.0; 15];
        let err = Segments::new(&data, 16, 8).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                len: 15,
                segment_length: 16
            }
        );
    }

    #[test]
    fn test_overlap_must_be_smaller() {
        let data = vec![1.0; 16];
        assert!(matches!(
            Segments::new(&data, 8, 8),
            Err(AnalysisError::InvalidConfiguration { param: "overlap", .. })
        ));
        assert!(matches!(
            Segments::new(&data, 0, 0),
            Err(AnalysisError::InvalidConfiguration { param: "segment_length", .. })
        ));
    }

    #[test]
    fn test_maximal_overlap() {
        let data = vec![0.0; 20];
        let segments = Segments::new(&data, 8, 7).unwrap();
        assert_eq!(segments.len(), 13);
        assert_eq!(segments.last().map(|s| s.offset), Some(12));
    }

    #[test]
    fn test_config_defaults() {
        let config = SegmentationConfig::default();
        assert_eq!(config.segment_length, 1024);
        assert_eq!(config.resolved_overlap(), 512);
        assert_eq!(config.window, Window::FlatTop);
        assert_eq!(config.detrend, Detrend::Constant);
        assert_eq!(config.scaling, ScalingMode::Spectrum);
    }

    #[test]
    fn test_config_validate() {
        assert!(SegmentationConfig::new(16).validate().is_ok());
        assert!(SegmentationConfig::new(16).with_overlap(16).validate().is_err());
        assert!(SegmentationConfig::new(0).validate().is_err());
        assert!(matches!(
            SegmentationConfig::new(16).validate_for(8),
            Err(AnalysisError::InsufficientData { len: 8, segment_length: 16 })
        ));
        assert!(SegmentationConfig::new(16).validate_for(16).is_ok());
    }

    #[test]
    fn test_segment_count_formula() {
        assert_eq!(segment_count(10_000, 1000, 500), 19);
        assert_eq!(segment_count(1000, 1000, 500), 1);
        assert_eq!(segment_count(999, 1000, 500), 0);
        assert_eq!(segment_count(100, 10, 10), 0);
    }
}

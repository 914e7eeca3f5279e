//! Core data types for template matching.

use serde::Serialize;

use crate::audio::audible_bounds;
use crate::error::{Error, Result};

/// Half-open sample range `[start_index, end_index)` in track coordinates.
pub trait Span {
    /// First sample index covered.
    fn start_index(&self) -> usize;

    /// One past the last sample index covered.
    fn end_index(&self) -> usize;

    /// Number of samples covered.
    fn len(&self) -> usize {
        self.end_index().saturating_sub(self.start_index())
    }

    /// Whether the span covers no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Span + ?Sized> Span for &T {
    fn start_index(&self) -> usize {
        (**self).start_index()
    }

    fn end_index(&self) -> usize {
        (**self).end_index()
    }
}

/// A reference clip to search for.
///
/// `lead_in` and `tail` count the near-silent samples trimmed off the
/// original clip; matches are widened by them so the whole original clip
/// is removed.
#[derive(Debug, Clone)]
pub struct Template {
    id: String,
    samples: Vec<f32>,
    sample_rate: u32,
    lead_in: usize,
    tail: usize,
}

impl Template {
    /// Create a template from mono samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyTemplate`] for zero-length input and
    /// [`Error::SilentTemplate`] when every sample is zero.
    pub fn new(id: impl Into<String>, samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        let id = id.into();
        if samples.is_empty() {
            return Err(Error::EmptyTemplate { template: id });
        }
        if samples.iter().all(|&s| s == 0.0) {
            return Err(Error::SilentTemplate { template: id });
        }
        Ok(Self {
            id,
            samples,
            sample_rate,
            lead_in: 0,
            tail: 0,
        })
    }

    /// Strip leading and trailing near-silence in place.
    ///
    /// Returns `false`, leaving the template unchanged, when no audible run
    /// is found.
    pub fn trim_silence(&mut self, threshold: f32) -> bool {
        let Some((start, end)) = audible_bounds(&self.samples, threshold) else {
            return false;
        };
        if start == 0 && end == self.samples.len() {
            return true;
        }

        self.lead_in += start;
        self.tail += self.samples.len() - end;
        self.samples.truncate(end);
        self.samples.drain(..start);
        true
    }

    /// Template identifier (usually the file name).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Samples used for correlation.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples used for correlation.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; empty templates are rejected on construction.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples trimmed from the start of the original clip.
    pub fn lead_in(&self) -> usize {
        self.lead_in
    }

    /// Samples trimmed from the end of the original clip.
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Length of the original clip, including trimmed edges.
    pub fn extent(&self) -> usize {
        self.lead_in + self.samples.len() + self.tail
    }
}

/// The recording being searched.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioTrack {
    /// Wrap mono samples at the given rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Track samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the track has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Convert a sample index to seconds at this track's rate.
    #[allow(clippy::cast_precision_loss)]
    pub fn index_to_secs(&self, index: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        index as f64 / f64::from(self.sample_rate)
    }
}

/// One template's above-threshold correlation peak.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatch {
    /// Template that produced this match.
    pub template_id: String,
    /// First sample of the match.
    pub start_index: usize,
    /// One past the last sample of the match.
    pub end_index: usize,
    /// Normalized correlation score in `[-1.0, 1.0]`.
    pub score: f32,
}

impl Span for CandidateMatch {
    fn start_index(&self) -> usize {
        self.start_index
    }

    fn end_index(&self) -> usize {
        self.end_index
    }
}

/// A merged, template-agnostic range to excise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RemoveInterval {
    /// First sample to remove.
    pub start_index: usize,
    /// One past the last sample to remove.
    pub end_index: usize,
}

impl RemoveInterval {
    /// Create an interval.
    pub const fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }
}

impl Span for RemoveInterval {
    fn start_index(&self) -> usize {
        self.start_index
    }

    fn end_index(&self) -> usize {
        self.end_index
    }
}

/// Whether a segment stays in the cleaned track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Part of the cleaned track.
    Kept,
    /// Cut out of the track.
    Discarded,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kept => write!(f, "kept"),
            Self::Discarded => write!(f, "discarded"),
        }
    }
}

/// A contiguous labeled piece of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    /// First sample of the segment.
    pub start_index: usize,
    /// One past the last sample of the segment.
    pub end_index: usize,
    /// Kept or discarded.
    pub kind: SegmentKind,
}

impl Span for Segment {
    fn start_index(&self) -> usize {
        self.start_index
    }

    fn end_index(&self) -> usize {
        self.end_index
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_template_rejects_empty() {
        let result = Template::new("ad", Vec::new(), 8000);
        assert!(matches!(result, Err(Error::EmptyTemplate { .. })));
    }

    #[test]
    fn test_template_rejects_silence() {
        let result = Template::new("ad", vec![0.0; 100], 8000);
        assert!(matches!(result, Err(Error::SilentTemplate { .. })));
    }

    #[test]
    fn test_trim_silence_records_edges() {
        let mut samples = vec![0.0; 100];
        samples.extend(std::iter::repeat_n(0.5, 200));
        samples.extend(vec![0.0; 30]);

        let mut template = Template::new("ad", samples, 8000).unwrap();
        assert!(template.trim_silence(0.1));

        assert_eq!(template.lead_in(), 100);
        assert_eq!(template.len(), 200);
        assert_eq!(template.tail(), 30);
        assert_eq!(template.extent(), 330);
    }

    #[test]
    fn test_trim_silence_keeps_quiet_template() {
        let mut template = Template::new("ad", vec![0.01; 500], 8000).unwrap();
        assert!(!template.trim_silence(0.1));
        assert_eq!(template.len(), 500);
        assert_eq!(template.lead_in(), 0);
    }

    #[test]
    fn test_span_len() {
        let interval = RemoveInterval::new(10, 25);
        assert_eq!(interval.len(), 15);
        assert!(!interval.is_empty());
        assert!(RemoveInterval::new(5, 5).is_empty());
    }

    #[test]
    fn test_track_index_to_secs() {
        let track = AudioTrack::new(vec![0.0; 16_000], 8000);
        assert!((track.duration_secs() - 2.0).abs() < f64::EPSILON);
        assert!((track.index_to_secs(4000) - 0.5).abs() < f64::EPSILON);
    }
}

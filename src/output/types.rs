//! Output type definitions.

use serde::Serialize;

use crate::matcher::{Segment, SegmentKind};

/// One segment of a processed track, in seconds and samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRecord {
    /// 1-based position among segments of the same kind.
    pub index: usize,
    /// Kept or discarded.
    pub kind: SegmentKind,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// First sample of the segment.
    pub start_index: usize,
    /// One past the last sample of the segment.
    pub end_index: usize,
}

impl SegmentRecord {
    /// Convert a segment at the given sample rate.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_segment(segment: &Segment, index: usize, sample_rate: u32) -> Self {
        let rate = f64::from(sample_rate.max(1));
        Self {
            index,
            kind: segment.kind,
            start_time: segment.start_index as f64 / rate,
            end_time: segment.end_index as f64 / rate,
            start_index: segment.start_index,
            end_index: segment.end_index,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Convert every segment, numbering kept and discarded segments separately.
pub fn segment_records(segments: &[Segment], sample_rate: u32) -> Vec<SegmentRecord> {
    let mut kept = 0;
    let mut discarded = 0;
    segments
        .iter()
        .map(|segment| {
            let counter = match segment.kind {
                SegmentKind::Kept => &mut kept,
                SegmentKind::Discarded => &mut discarded,
            };
            *counter += 1;
            SegmentRecord::from_segment(segment, *counter, sample_rate)
        })
        .collect()
}

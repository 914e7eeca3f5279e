//! Slicing a track's audio according to its segments.

use super::{AudioTrack, Segment, SegmentKind};
use crate::error::{Error, Result};

/// One discarded run of audio, borrowed from the track.
#[derive(Debug, Clone, Copy)]
pub struct DiscardedClip<'a> {
    /// Segment this clip was cut from.
    pub segment: Segment,
    /// The discarded samples.
    pub samples: &'a [f32],
}

/// Cleaned track plus the pieces cut out of it.
#[derive(Debug, Clone)]
pub struct AssembledAudio<'a> {
    /// Kept segments concatenated in track order.
    pub kept: Vec<f32>,
    /// Discarded segments in track order.
    pub discarded: Vec<DiscardedClip<'a>>,
}

impl AssembledAudio<'_> {
    /// All discarded audio concatenated in track order.
    pub fn combined_discards(&self) -> Vec<f32> {
        let total = self.discarded.iter().map(|clip| clip.samples.len()).sum();
        let mut combined = Vec::with_capacity(total);
        for clip in &self.discarded {
            combined.extend_from_slice(clip.samples);
        }
        combined
    }
}

/// Split the track's samples into kept and discarded audio.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if a segment lies outside the track.
pub fn assemble<'a>(track: &'a AudioTrack, segments: &[Segment]) -> Result<AssembledAudio<'a>> {
    let samples = track.samples();
    let kept_len: usize = segments
        .iter()
        .filter(|s| s.kind == SegmentKind::Kept)
        .map(|s| s.end_index.saturating_sub(s.start_index))
        .sum();

    let mut kept = Vec::with_capacity(kept_len);
    let mut discarded = Vec::new();

    for segment in segments {
        let slice = samples
            .get(segment.start_index..segment.end_index)
            .ok_or_else(|| Error::InvariantViolation {
                message: format!(
                    "segment {}..{} outside track of {} samples",
                    segment.start_index,
                    segment.end_index,
                    samples.len()
                ),
            })?;

        match segment.kind {
            SegmentKind::Kept => kept.extend_from_slice(slice),
            SegmentKind::Discarded => discarded.push(DiscardedClip {
                segment: *segment,
                samples: slice,
            }),
        }
    }

    Ok(AssembledAudio { kept, discarded })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use crate::matcher::{RemoveInterval, partition};

    #[test]
    fn test_assemble_splits_audio() {
        let track = AudioTrack::new((0..10).map(|i| i as f32).collect(), 10);
        let segments = partition(
            10,
            &[RemoveInterval::new(2, 4), RemoveInterval::new(7, 8)],
        )
        .unwrap();

        let assembled = assemble(&track, &segments).unwrap();

        assert_eq!(assembled.kept, vec![0.0, 1.0, 4.0, 5.0, 6.0, 8.0, 9.0]);
        assert_eq!(assembled.discarded.len(), 2);
        assert_eq!(assembled.discarded[0].samples, &[2.0, 3.0]);
        assert_eq!(assembled.combined_discards(), vec![2.0, 3.0, 7.0]);
    }

    #[test]
    fn test_assemble_rejects_out_of_range() {
        let track = AudioTrack::new(vec![0.0; 5], 10);
        let segments = [Segment {
            start_index: 0,
            end_index: 6,
            kind: SegmentKind::Kept,
        }];
        assert!(matches!(
            assemble(&track, &segments),
            Err(Error::InvariantViolation { .. })
        ));
    }
}

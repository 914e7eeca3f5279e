//! Splitting a track into kept and discarded segments.

use super::{RemoveInterval, Segment, SegmentKind};
use crate::error::{Error, Result};

/// Tile `[0, track_len)` with kept and discarded segments.
///
/// Every remove interval becomes one discarded segment; the gaps around
/// them become kept segments. Zero-length gaps produce no segment.
///
/// # Errors
///
/// Returns [`Error::InvariantViolation`] if the intervals are empty,
/// unsorted, overlapping, or extend past the end of the track.
pub fn partition(track_len: usize, remove_intervals: &[RemoveInterval]) -> Result<Vec<Segment>> {
    let mut segments = Vec::with_capacity(remove_intervals.len() * 2 + 1);
    let mut cursor = 0;

    for (i, interval) in remove_intervals.iter().enumerate() {
        if interval.start_index >= interval.end_index {
            return Err(Error::InvariantViolation {
                message: format!(
                    "interval {i} is empty ({}..{})",
                    interval.start_index, interval.end_index
                ),
            });
        }
        if interval.start_index < cursor {
            return Err(Error::InvariantViolation {
                message: format!(
                    "interval {i} ({}..{}) starts before the previous one ends at {cursor}",
                    interval.start_index, interval.end_index
                ),
            });
        }
        if interval.end_index > track_len {
            return Err(Error::InvariantViolation {
                message: format!(
                    "interval {i} ends at {} past track length {track_len}",
                    interval.end_index
                ),
            });
        }

        if interval.start_index > cursor {
            segments.push(Segment {
                start_index: cursor,
                end_index: interval.start_index,
                kind: SegmentKind::Kept,
            });
        }
        segments.push(Segment {
            start_index: interval.start_index,
            end_index: interval.end_index,
            kind: SegmentKind::Discarded,
        });
        cursor = interval.end_index;
    }

    if cursor < track_len {
        segments.push(Segment {
            start_index: cursor,
            end_index: track_len,
            kind: SegmentKind::Kept,
        });
    }

    Ok(segments)
}

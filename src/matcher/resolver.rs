//! Merging candidate matches into remove intervals.

use super::{RemoveInterval, Span};

/// Merges overlapping or nearby matches from any number of templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    /// Matches closer than this many samples are merged.
    pub merge_gap: usize,
    /// Samples added before every match.
    pub pre_padding: usize,
    /// Samples added after every match.
    pub post_padding: usize,
}

impl Resolver {
    /// Create a resolver with the given gap tolerance and no padding.
    pub fn new(merge_gap: usize) -> Self {
        Self {
            merge_gap,
            ..Self::default()
        }
    }

    /// Widen every match by the given padding before merging.
    #[must_use]
    pub fn with_padding(mut self, pre_padding: usize, post_padding: usize) -> Self {
        self.pre_padding = pre_padding;
        self.post_padding = post_padding;
        self
    }

    /// Merge spans into sorted, non-overlapping remove intervals.
    ///
    /// Padded spans are clamped to `[0, track_len)`; empty spans are dropped.
    /// Bounds of a merged interval are the union of its contributors.
    pub fn resolve<S, I>(&self, spans: I, track_len: usize) -> Vec<RemoveInterval>
    where
        S: Span,
        I: IntoIterator<Item = S>,
    {
        let mut padded: Vec<RemoveInterval> = spans
            .into_iter()
            .map(|span| {
                RemoveInterval::new(
                    span.start_index().saturating_sub(self.pre_padding),
                    span.end_index()
                        .saturating_add(self.post_padding)
                        .min(track_len),
                )
            })
            .filter(|interval| interval.start_index < interval.end_index)
            .collect();

        padded.sort_unstable_by_key(|interval| (interval.start_index, interval.end_index));
        merge_sorted(padded, self.merge_gap)
    }
}

/// Merge spans with the given gap tolerance and no padding.
///
/// Empty input is a valid outcome and yields no intervals.
pub fn resolve<S, I>(spans: I, merge_gap: usize, track_len: usize) -> Vec<RemoveInterval>
where
    S: Span,
    I: IntoIterator<Item = S>,
{
    Resolver::new(merge_gap).resolve(spans, track_len)
}

fn merge_sorted(sorted: Vec<RemoveInterval>, merge_gap: usize) -> Vec<RemoveInterval> {
    let mut merged: Vec<RemoveInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(open) if interval.start_index <= open.end_index.saturating_add(merge_gap) => {
                open.end_index = open.end_index.max(interval.end_index);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

//! Leading and trailing silence detection.

use crate::constants::trim::MIN_AUDIBLE_RUN;

/// Find the audible part of a clip.
///
/// The clip starts at the first run of more than [`MIN_AUDIBLE_RUN`]
/// consecutive samples whose magnitude exceeds `threshold`, and ends after
/// the last such run. Returns `(start, end)` as a half-open range, or `None`
/// when no run is long enough.
pub fn audible_bounds(samples: &[f32], threshold: f32) -> Option<(usize, usize)> {
    let start = first_run_start(samples.iter(), threshold)?;
    let from_end = first_run_start(samples.iter().rev(), threshold)?;
    let end = samples.len() - from_end;

    (start < end).then_some((start, end))
}

/// Offset of the first qualifying audible run in iteration order.
fn first_run_start<'a>(samples: impl Iterator<Item = &'a f32>, threshold: f32) -> Option<usize> {
    let mut run = 0;
    for (i, &sample) in samples.enumerate() {
        if sample.abs() > threshold {
            run += 1;
            if run > MIN_AUDIBLE_RUN {
                return Some(i + 1 - run);
            }
        } else {
            run = 0;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_of_padded_clip() {
        let mut samples = vec![0.0; 40];
        samples.extend(vec![0.8; 100]);
        samples.extend(vec![0.0; 60]);
        assert_eq!(audible_bounds(&samples, 0.1), Some((40, 140)));
    }

    #[test]
    fn test_short_clicks_are_ignored() {
        let mut samples = vec![0.0; 20];
        // A 10-sample click is not long enough to count as the start
        samples.extend(vec![0.9; 10]);
        samples.extend(vec![0.0; 20]);
        samples.extend(vec![-0.5; 80]);
        samples.extend(vec![0.0; 5]);
        assert_eq!(audible_bounds(&samples, 0.1), Some((50, 130)));
    }

    #[test]
    fn test_quiet_clip_has_no_bounds() {
        assert_eq!(audible_bounds(&[0.05; 1000], 0.1), None);
        assert_eq!(audible_bounds(&[], 0.1), None);
    }

    #[test]
    fn test_fully_audible_clip() {
        assert_eq!(audible_bounds(&[0.3; 64], 0.1), Some((0, 64)));
    }
}

//! Normalized cross-correlation and peak picking.
//!
//! Scores are `sum(t[i] * x[k + i]) / (|t| * |x[k..k + n]|)`, which is
//! independent of the absolute level of either signal. Raw dot products
//! are computed either directly or by overlap-save FFT blocks; both paths
//! share the same normalization.
//!
//! Scores are streamed into the peak picker as they are produced, so
//! matching one template holds about one FFT block plus one separation
//! window of scores, whatever the track length.

use std::collections::VecDeque;
use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AudioTrack, CandidateMatch, Template};
use crate::constants::correlation::{DIRECT_WORK_LIMIT, ENERGY_FLOOR_RATIO, MIN_FFT_LEN};
use crate::error::{Error, Result};

/// How raw correlation values are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Direct for small problems, FFT otherwise.
    #[default]
    Auto,
    /// Time-domain sliding dot product.
    Direct,
    /// Frequency-domain overlap-save.
    Fft,
}

impl std::fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Direct => write!(f, "direct"),
            Self::Fft => write!(f, "fft"),
        }
    }
}

/// Finds occurrences of one template inside a track.
#[derive(Debug, Clone, Copy)]
pub struct Correlator {
    /// Minimum score for a peak to become a candidate.
    pub min_score: f32,
    /// Peak separation in samples; `None` means one template length.
    pub min_separation: Option<usize>,
    /// Correlation backend.
    pub method: CorrelationMethod,
}

impl Correlator {
    /// Create a correlator with automatic method selection.
    pub fn new(min_score: f32, min_separation: Option<usize>) -> Self {
        Self {
            min_score,
            min_separation,
            method: CorrelationMethod::Auto,
        }
    }

    /// Use a specific correlation backend.
    #[must_use]
    pub fn with_method(mut self, method: CorrelationMethod) -> Self {
        self.method = method;
        self
    }

    /// Prepare a lazy scan of `track` for above-threshold peaks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RateMismatch`] when the template and track rates
    /// differ, or [`Error::Fft`] if the FFT backend cannot be set up.
    pub fn find_candidates<'a>(
        &self,
        template: &'a Template,
        track: &'a AudioTrack,
    ) -> Result<Candidates<'a>> {
        if template.sample_rate() != track.sample_rate() {
            return Err(Error::RateMismatch {
                template: template.id().to_string(),
                template_rate: template.sample_rate(),
                track_rate: track.sample_rate(),
            });
        }

        let stream = ScoreStream::new(template.samples(), track.samples(), self.method)?;

        // Never let one occurrence's shoulder produce a second candidate
        let separation = self
            .min_separation
            .map_or(template.len(), |sep| sep.max(template.len()))
            .max(1);

        debug!(
            "Correlating '{}' over {} offsets (separation {} samples)",
            template.id(),
            stream.positions,
            separation
        );

        Ok(Candidates {
            template,
            track_len: track.len(),
            stream,
            peaks: PeakWindow::new(self.min_score, separation),
            failed: false,
        })
    }
}

/// Convenience wrapper around [`Correlator::find_candidates`].
pub fn find_candidates<'a>(
    template: &'a Template,
    track: &'a AudioTrack,
    min_score: f32,
    min_separation: usize,
) -> Result<Candidates<'a>> {
    Correlator::new(min_score, Some(min_separation)).find_candidates(template, track)
}

/// Lazy sequence of candidate matches for one template.
///
/// A position is a peak when its score reaches the threshold, is strictly
/// greater than every score less than `separation` offsets before it, and
/// is not exceeded less than `separation` offsets after it. Two peaks
/// exactly `separation` apart are both reported. Plateaus yield their
/// leftmost position.
///
/// Iteration stops after the first error.
pub struct Candidates<'a> {
    template: &'a Template,
    track_len: usize,
    stream: ScoreStream<'a>,
    peaks: PeakWindow,
    failed: bool,
}

impl std::fmt::Debug for Candidates<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Candidates")
            .field("template_id", &self.template.id())
            .field("position", &self.peaks.position)
            .field("separation", &self.peaks.separation)
            .finish_non_exhaustive()
    }
}

impl Iterator for Candidates<'_> {
    type Item = Result<CandidateMatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let stream = &mut self.stream;
        match self.peaks.next_peak(|| stream.next_score()) {
            Ok(Some((k, score))) => {
                let (start_index, end_index) = clip_span(
                    k,
                    self.template.lead_in(),
                    self.template.extent(),
                    self.track_len,
                );
                Some(Ok(CandidateMatch {
                    template_id: self.template.id().to_string(),
                    start_index,
                    end_index,
                    score,
                }))
            }
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Track range of the original clip whose trimmed core matched at `k`.
fn clip_span(k: usize, lead_in: usize, extent: usize, track_len: usize) -> (usize, usize) {
    // The original clip may start before the track does
    let start = k.saturating_sub(lead_in);
    let end = (k + extent).saturating_sub(lead_in).min(track_len);
    (start, end)
}

/// Sliding peak detector over a score stream.
///
/// Holds the scores of the next `separation - 1` offsets and a monotonic
/// queue of the previous `separation - 1`.
#[derive(Debug)]
struct PeakWindow {
    min_score: f32,
    separation: usize,
    /// Offset of the next score to judge.
    position: usize,
    /// Scores from `position` onward, at most `separation` of them.
    ahead: VecDeque<f32>,
    /// `(offset, score)` of recent offsets, scores strictly decreasing.
    trailing: VecDeque<(usize, f32)>,
}

impl PeakWindow {
    fn new(min_score: f32, separation: usize) -> Self {
        Self {
            min_score,
            separation,
            position: 0,
            ahead: VecDeque::with_capacity(separation),
            trailing: VecDeque::new(),
        }
    }

    /// Pull scores until the next peak, returning its offset and score.
    fn next_peak(
        &mut self,
        mut next_score: impl FnMut() -> Result<Option<f32>>,
    ) -> Result<Option<(usize, f32)>> {
        loop {
            while self.ahead.len() < self.separation {
                match next_score()? {
                    Some(score) => self.ahead.push_back(score),
                    None => break,
                }
            }
            let Some(score) = self.ahead.pop_front() else {
                return Ok(None);
            };
            let k = self.position;
            self.position += 1;

            while let Some(&(front, _)) = self.trailing.front() {
                if front + self.separation <= k {
                    self.trailing.pop_front();
                } else {
                    break;
                }
            }

            let peak = score >= self.min_score
                && self.trailing.front().is_none_or(|&(_, s)| s < score)
                && self.ahead.iter().all(|&s| s <= score);

            while let Some(&(_, back)) = self.trailing.back() {
                if back <= score {
                    self.trailing.pop_back();
                } else {
                    break;
                }
            }
            self.trailing.push_back((k, score));

            if peak {
                return Ok(Some((k, score)));
            }
        }
    }
}

/// Normalized correlation score of `template` at every offset of `track`.
///
/// Returns `track.len() - template.len() + 1` scores, or none when the
/// track is shorter than the template. Matching does not need the whole
/// curve; this collects it for inspection.
pub fn correlation_scores(
    template: &[f32],
    track: &[f32],
    method: CorrelationMethod,
) -> Result<Vec<f32>> {
    let mut stream = ScoreStream::new(template, track, method)?;
    let mut scores = Vec::with_capacity(stream.positions);
    while let Some(score) = stream.next_score()? {
        scores.push(score);
    }
    Ok(scores)
}

/// Where raw dot products come from.
enum Backend {
    /// All-zero template, every score is 0.
    Silent,
    Direct,
    Fft(Box<FftBlocks>),
}

/// Produces normalized scores in offset order.
struct ScoreStream<'a> {
    template: &'a [f32],
    track: &'a [f32],
    positions: usize,
    offset: usize,
    backend: Backend,
    normalizer: Normalizer<'a>,
}

impl<'a> ScoreStream<'a> {
    fn new(template: &'a [f32], track: &'a [f32], method: CorrelationMethod) -> Result<Self> {
        let n = template.len();
        let positions = if n == 0 {
            0
        } else {
            (track.len() + 1).saturating_sub(n)
        };
        let template_energy: f64 = template.iter().map(|&s| f64::from(s) * f64::from(s)).sum();

        let backend = if positions == 0 {
            Backend::Direct
        } else if template_energy <= 0.0 {
            Backend::Silent
        } else {
            match method {
                CorrelationMethod::Auto if n.saturating_mul(positions) <= DIRECT_WORK_LIMIT => {
                    Backend::Direct
                }
                CorrelationMethod::Direct => Backend::Direct,
                CorrelationMethod::Auto | CorrelationMethod::Fft => {
                    Backend::Fft(Box::new(FftBlocks::new(template)?))
                }
            }
        };

        Ok(Self {
            template,
            track,
            positions,
            offset: 0,
            backend,
            normalizer: Normalizer::new(track, n.max(1), template_energy),
        })
    }

    fn next_score(&mut self) -> Result<Option<f32>> {
        let k = self.offset;
        if k >= self.positions {
            return Ok(None);
        }
        self.offset += 1;

        let raw = match &mut self.backend {
            Backend::Silent => return Ok(Some(0.0)),
            Backend::Direct => self
                .template
                .iter()
                .zip(&self.track[k..k + self.template.len()])
                .map(|(&t, &x)| f64::from(t) * f64::from(x))
                .sum::<f64>(),
            Backend::Fft(blocks) => blocks.raw_at(self.track, self.positions, k)?,
        };
        Ok(Some(self.normalizer.next_score(raw)))
    }
}

/// Turns raw dot products into normalized scores, one offset at a time.
///
/// Window energy is updated incrementally and recomputed exactly every
/// `window` offsets to bound floating-point drift.
struct Normalizer<'a> {
    track: &'a [f32],
    window: usize,
    template_energy: f64,
    energy_floor: f64,
    position: usize,
    energy: f64,
}

impl<'a> Normalizer<'a> {
    fn new(track: &'a [f32], window: usize, template_energy: f64) -> Self {
        Self {
            track,
            window,
            template_energy,
            energy_floor: template_energy * ENERGY_FLOOR_RATIO,
            position: 0,
            energy: 0.0,
        }
    }

    fn window_energy_exact(&self, k: usize) -> f64 {
        self.track[k..k + self.window]
            .iter()
            .map(|&s| f64::from(s) * f64::from(s))
            .sum()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn next_score(&mut self, raw: f64) -> f32 {
        let k = self.position;
        self.energy = if k % self.window == 0 {
            self.window_energy_exact(k)
        } else {
            let leaving = f64::from(self.track[k - 1]);
            let entering = f64::from(self.track[k + self.window - 1]);
            (self.energy - leaving * leaving + entering * entering).max(0.0)
        };
        self.position += 1;

        if self.energy <= self.energy_floor {
            return 0.0;
        }
        let score = raw / (self.template_energy * self.energy).sqrt();
        score.clamp(-1.0, 1.0) as f32
    }
}

fn fft_error(e: impl std::fmt::Display) -> Error {
    Error::Fft {
        reason: e.to_string(),
    }
}

/// Overlap-save correlation, one block of offsets at a time.
struct FftBlocks {
    forward: Arc<dyn RealToComplex<f64>>,
    inverse: Arc<dyn ComplexToReal<f64>>,
    template_spectrum: Vec<Complex<f64>>,
    input: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    output: Vec<f64>,
    fft_len: usize,
    /// Valid offsets per block.
    step: usize,
    scale: f64,
    /// Offset of `output[0]`.
    block_start: usize,
    /// Valid raw values in `output`.
    valid: usize,
}

impl FftBlocks {
    fn new(template: &[f32]) -> Result<Self> {
        let n = template.len();
        let fft_len = (2 * n).next_power_of_two().max(MIN_FFT_LEN);
        let step = fft_len - n + 1;

        let mut planner = RealFftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let mut input = forward.make_input_vec();
        let mut template_spectrum = forward.make_output_vec();
        for (slot, &s) in input.iter_mut().zip(template) {
            *slot = f64::from(s);
        }
        forward
            .process(&mut input, &mut template_spectrum)
            .map_err(fft_error)?;

        let spectrum = forward.make_output_vec();
        let output = inverse.make_output_vec();
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / fft_len as f64;

        debug!("FFT correlation: block {fft_len}, step {step}");

        Ok(Self {
            forward,
            inverse,
            template_spectrum,
            input,
            spectrum,
            output,
            fft_len,
            step,
            scale,
            block_start: 0,
            valid: 0,
        })
    }

    /// Raw dot product at `offset`; offsets must be requested in order.
    fn raw_at(&mut self, track: &[f32], positions: usize, offset: usize) -> Result<f64> {
        if offset >= self.block_start + self.valid {
            self.load_block(track, positions, offset)?;
        }
        Ok(self.output[offset - self.block_start] * self.scale)
    }

    fn load_block(&mut self, track: &[f32], positions: usize, start: usize) -> Result<()> {
        let end = (start + self.fft_len).min(track.len());
        self.input.fill(0.0);
        for (slot, &s) in self.input.iter_mut().zip(&track[start..end]) {
            *slot = f64::from(s);
        }
        self.forward
            .process(&mut self.input, &mut self.spectrum)
            .map_err(fft_error)?;

        for (x, t) in self.spectrum.iter_mut().zip(&self.template_spectrum) {
            *x *= t.conj();
        }
        // DC and Nyquist bins of a real signal's spectrum are real
        if let Some(first) = self.spectrum.first_mut() {
            *first = Complex::new(first.re, 0.0);
        }
        if let Some(last) = self.spectrum.last_mut() {
            *last = Complex::new(last.re, 0.0);
        }

        self.inverse
            .process(&mut self.spectrum, &mut self.output)
            .map_err(fft_error)?;

        self.block_start = start;
        self.valid = self.step.min(positions - start);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random noise in [-0.5, 0.5).
    fn noise(len: usize, seed: u64) -> Vec<f32> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                ((state >> 40) as f32 / (1u64 << 24) as f32) - 0.5
            })
            .collect()
    }

    fn embed(track_len: usize, clip: &[f32], offsets: &[usize], gain: f32) -> Vec<f32> {
        let mut track = vec![0.0; track_len];
        for &offset in offsets {
            for (i, &s) in clip.iter().enumerate() {
                track[offset + i] += s * gain;
            }
        }
        track
    }

    fn peaks_of(scores: &[f32], min_score: f32, separation: usize) -> Vec<usize> {
        let mut window = PeakWindow::new(min_score, separation);
        let mut source = scores.iter().copied();
        let mut found = Vec::new();
        while let Some((k, _)) = window.next_peak(|| Ok(source.next())).unwrap() {
            found.push(k);
        }
        found
    }

    #[test]
    fn test_fft_matches_direct() {
        let template = noise(200, 1);
        let mut track = noise(3000, 2);
        for (i, &s) in template.iter().enumerate() {
            track[1200 + i] += s;
        }

        let direct = correlation_scores(&template, &track, CorrelationMethod::Direct).unwrap();
        let fft = correlation_scores(&template, &track, CorrelationMethod::Fft).unwrap();

        assert_eq!(direct.len(), 2801);
        assert_eq!(direct.len(), fft.len());
        for (a, b) in direct.iter().zip(&fft) {
            assert!((a - b).abs() < 1e-4, "direct {a} vs fft {b}");
        }
    }

    #[test]
    fn test_fft_matches_direct_across_blocks() {
        // Long enough to need several overlap-save blocks
        let template = noise(300, 7);
        let track = embed(40_000, &template, &[100, 17_000, 39_500], 0.6);

        let direct = correlation_scores(&template, &track, CorrelationMethod::Direct).unwrap();
        let fft = correlation_scores(&template, &track, CorrelationMethod::Fft).unwrap();

        for (a, b) in direct.iter().zip(&fft) {
            assert!((a - b).abs() < 1e-4);
        }
        assert!((fft[17_000] - 1.0).abs() < 1e-4);
        assert!((fft[39_500] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_score_ignores_volume() {
        let template = noise(256, 3);
        let track = embed(2048, &template, &[500], 0.05);

        let scores = correlation_scores(&template, &track, CorrelationMethod::Direct).unwrap();
        assert!((scores[500] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_inverted_clip_scores_negative() {
        let template = noise(128, 4);
        let track = embed(1024, &template, &[300], -1.0);

        let scores = correlation_scores(&template, &track, CorrelationMethod::Direct).unwrap();
        assert!((scores[300] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_track_shorter_than_template() {
        let scores =
            correlation_scores(&[0.1; 100], &[0.1; 50], CorrelationMethod::Auto).unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn test_silent_track_scores_zero() {
        let scores =
            correlation_scores(&noise(64, 5), &[0.0; 500], CorrelationMethod::Fft).unwrap();
        assert_eq!(scores.len(), 437);
        assert!(scores.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_finds_every_occurrence() {
        let clip = noise(400, 9);
        let track = AudioTrack::new(embed(10_000, &clip, &[1000, 4000, 8000], 1.0), 8000);
        let template = Template::new("ad", clip, 8000).unwrap();

        let found = find_candidates(&template, &track, 0.9, 400)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        let starts: Vec<usize> = found.iter().map(|c| c.start_index).collect();
        assert_eq!(starts, vec![1000, 4000, 8000]);
        assert!(found.iter().all(|c| c.end_index == c.start_index + 400));
        assert!(found.iter().all(|c| c.template_id == "ad"));
    }

    #[test]
    fn test_streamed_fft_finds_hits_on_block_edges() {
        // Blocks hold 16384 - 3000 + 1 = 13385 offsets each
        let clip = noise(3000, 12);
        let offsets = [10_000, 13_385, 26_769, 40_155];
        let track = AudioTrack::new(embed(50_000, &clip, &offsets, 1.0), 8000);
        let template = Template::new("ad", clip, 8000).unwrap();

        let found = Correlator::new(0.95, None)
            .with_method(CorrelationMethod::Fft)
            .find_candidates(&template, &track)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        let starts: Vec<usize> = found.iter().map(|c| c.start_index).collect();
        assert_eq!(starts, offsets);
    }

    #[test]
    fn test_rate_mismatch() {
        let template = Template::new("ad", noise(100, 1), 44_100).unwrap();
        let track = AudioTrack::new(noise(1000, 2), 48_000);

        let result = find_candidates(&template, &track, 0.8, 100);
        assert!(matches!(
            result,
            Err(Error::RateMismatch {
                template_rate: 44_100,
                track_rate: 48_000,
                ..
            })
        ));
    }

    #[test]
    fn test_peak_separation_suppresses_shoulder() {
        // A smooth template has a broad correlation peak
        let clip: Vec<f32> = (0..200).map(|i| (i as f32 * 0.01).sin() + 0.2).collect();
        let track = AudioTrack::new(embed(2000, &clip, &[900], 1.0), 8000);
        let template = Template::new("smooth", clip, 8000).unwrap();

        let found = Correlator::new(0.5, None)
            .find_candidates(&template, &track)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_index, 900);
    }

    #[test]
    fn test_plateau_yields_leftmost_peak() {
        let peaks = peaks_of(&[0.1, 0.9, 0.9, 0.9, 0.2, 0.1], 0.5, 2);
        assert_eq!(peaks, vec![1]);
    }

    #[test]
    fn test_peaks_exactly_one_separation_apart() {
        assert_eq!(peaks_of(&[0.9, 0.1, 0.1, 0.9, 0.1], 0.5, 3), vec![0, 3]);
        // Closer than the separation, only the higher one survives
        assert_eq!(peaks_of(&[0.9, 0.1, 0.95, 0.1], 0.5, 3), vec![2]);
    }

    #[test]
    fn test_window_stays_bounded() {
        let scores: Vec<f32> = (0..5000).map(|i| if i % 700 == 0 { 1.0 } else { 0.1 }).collect();
        let mut window = PeakWindow::new(0.5, 100);
        let mut source = scores.iter().copied();
        let mut found = 0;
        while window.next_peak(|| Ok(source.next())).unwrap().is_some() {
            found += 1;
            assert!(window.ahead.len() < 100);
            assert!(window.trailing.len() < 100);
        }
        assert_eq!(found, 8);
    }

    #[test]
    fn test_score_error_propagates() {
        let mut window = PeakWindow::new(0.5, 4);
        let result = window.next_peak(|| {
            Err(Error::Fft {
                reason: "boom".to_string(),
            })
        });
        assert!(matches!(result, Err(Error::Fft { .. })));
    }

    #[test]
    fn test_lead_in_widens_match() {
        let mut clip = vec![0.0; 100];
        clip.extend(noise(300, 11).iter().map(|&s| s + 0.5 * s.signum()));
        clip.extend(vec![0.0; 60]);
        let track = AudioTrack::new(embed(5000, &clip, &[2000], 1.0), 8000);
        let mut template = Template::new("ad", clip, 8000).unwrap();
        assert!(template.trim_silence(0.01));
        assert!(template.lead_in() > 0);

        let found = find_candidates(&template, &track, 0.95, 1)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_index, 2000);
        assert_eq!(found[0].end_index, 2460);
    }

    #[test]
    fn test_clip_cut_off_at_track_start() {
        assert_eq!(clip_span(0, 10, 30, 22), (0, 20));
        assert_eq!(clip_span(50, 10, 30, 1000), (40, 70));
        assert_eq!(clip_span(990, 0, 30, 1000), (990, 1000));
    }
}

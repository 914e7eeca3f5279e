//! Running every template against a track and planning the cut.

use std::num::NonZeroUsize;

use serde::Serialize;
use tracing::{debug, warn};

use super::{
    AudioTrack, CandidateMatch, CorrelationMethod, Correlator, RemoveInterval, Resolver, Segment,
    Template, partition,
};
use crate::constants::DEFAULT_MIN_SCORE;
use crate::error::{Error, Result};

/// Matching settings in sample units.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Minimum normalized score for a candidate.
    pub min_score: f32,
    /// Minimum distance between peaks of one template; `None` means one
    /// template length.
    pub min_separation: Option<usize>,
    /// Matches closer than this are merged.
    pub merge_gap: usize,
    /// Samples removed before every match.
    pub pre_padding: usize,
    /// Samples removed after every match.
    pub post_padding: usize,
    /// Correlation backend.
    pub method: CorrelationMethod,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            min_separation: None,
            merge_gap: 0,
            pre_padding: 0,
            post_padding: 0,
            method: CorrelationMethod::Auto,
        }
    }
}

impl MatchConfig {
    fn correlator(&self) -> Correlator {
        Correlator::new(self.min_score, self.min_separation).with_method(self.method)
    }

    fn resolver(&self) -> Resolver {
        Resolver::new(self.merge_gap).with_padding(self.pre_padding, self.post_padding)
    }
}

/// What happened to one template during matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TemplateStatus {
    /// Correlation ran and produced this many candidates.
    Matched {
        /// Number of candidates found.
        candidates: usize,
    },
    /// The template was not matched against this track.
    Skipped {
        /// Why it was skipped.
        reason: String,
    },
}

/// Per-template outcome.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateReport {
    /// Template identifier.
    pub template_id: String,
    /// Outcome.
    #[serde(flatten)]
    pub status: TemplateStatus,
}

/// Everything decided about one track.
#[derive(Debug, Clone)]
pub struct RemovalPlan {
    /// Number of samples in the track.
    pub track_len: usize,
    /// Outcome for each template, in input order.
    pub templates: Vec<TemplateReport>,
    /// Every candidate from every matched template, in template order.
    pub candidates: Vec<CandidateMatch>,
    /// Merged intervals to remove.
    pub remove_intervals: Vec<RemoveInterval>,
    /// Kept/discarded partition of the whole track.
    pub segments: Vec<Segment>,
}

impl RemovalPlan {
    /// Whether nothing is removed.
    pub fn is_pass_through(&self) -> bool {
        self.remove_intervals.is_empty()
    }

    /// Number of samples removed.
    pub fn removed_samples(&self) -> usize {
        self.remove_intervals
            .iter()
            .map(|i| i.end_index - i.start_index)
            .sum()
    }
}

/// Correlate every template against the track and plan the removal.
///
/// Templates are correlated in parallel. A template that fails (for
/// example with a sample rate mismatch) is reported as skipped and the
/// remaining templates still contribute.
///
/// # Errors
///
/// Returns an error only for failures that are not specific to one
/// template: a correlation worker panicking, or an interval invariant
/// violation while partitioning.
pub fn plan_removal(
    templates: &[Template],
    track: &AudioTrack,
    config: &MatchConfig,
) -> Result<RemovalPlan> {
    let outcomes = correlate_all(templates, track, config)?;

    let mut reports = Vec::with_capacity(templates.len());
    let mut candidates = Vec::new();
    for (template, outcome) in templates.iter().zip(outcomes) {
        let status = match outcome {
            Ok(found) => {
                debug!("Template '{}': {} candidate(s)", template.id(), found.len());
                let status = TemplateStatus::Matched {
                    candidates: found.len(),
                };
                candidates.extend(found);
                status
            }
            Err(e) => {
                warn!("Skipping template '{}': {e}", template.id());
                TemplateStatus::Skipped {
                    reason: e.to_string(),
                }
            }
        };
        reports.push(TemplateReport {
            template_id: template.id().to_string(),
            status,
        });
    }

    let remove_intervals = config.resolver().resolve(&candidates, track.len());
    let segments = partition(track.len(), &remove_intervals)?;

    Ok(RemovalPlan {
        track_len: track.len(),
        templates: reports,
        candidates,
        remove_intervals,
        segments,
    })
}

/// Run the correlator for every template, one thread per core at most.
fn correlate_all(
    templates: &[Template],
    track: &AudioTrack,
    config: &MatchConfig,
) -> Result<Vec<Result<Vec<CandidateMatch>>>> {
    let correlator = config.correlator();
    let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let mut outcomes = Vec::with_capacity(templates.len());

    for batch in templates.chunks(workers) {
        let joined = std::thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|template| {
                    scope.spawn(move || {
                        correlator
                            .find_candidates(template, track)
                            .and_then(|candidates| candidates.collect::<Result<Vec<_>>>())
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(std::thread::ScopedJoinHandle::join)
                .collect::<Vec<_>>()
        });

        for result in joined {
            let outcome = result.map_err(|_| Error::Internal {
                message: "correlation worker panicked".to_string(),
            })?;
            outcomes.push(outcome);
        }
    }

    Ok(outcomes)
}

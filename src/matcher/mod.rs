//! Template matching and removal.
//!
//! The pipeline for one track is: correlate each template
//! ([`Correlator`]), merge the candidates from every template
//! ([`Resolver`]), tile the track into kept and discarded pieces
//! ([`partition`]) and slice the audio ([`assemble`]).
//! [`plan_removal`] runs the first three steps.

mod assembler;
mod correlator;
mod engine;
mod partitioner;
mod resolver;
mod types;

pub use assembler::{AssembledAudio, DiscardedClip, assemble};
pub use correlator::{
    Candidates, CorrelationMethod, Correlator, correlation_scores, find_candidates,
};
pub use engine::{MatchConfig, RemovalPlan, TemplateReport, TemplateStatus, plan_removal};
pub use partitioner::partition;
pub use resolver::{Resolver, resolve};
pub use types::{AudioTrack, CandidateMatch, RemoveInterval, Segment, SegmentKind, Span, Template};

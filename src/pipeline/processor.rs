//! Single file processing pipeline.

use crate::audio::decode_audio_file;
use crate::config::OutputFormat;
use crate::constants::score::DECIMAL_PLACES;
use crate::error::Result;
use crate::matcher::{
    AssembledAudio, AudioTrack, RemovalPlan, Template, TemplateStatus, assemble, plan_removal,
};
use crate::output::{
    AudacityWriter, CsvWriter, JsonCandidate, JsonReportWriter, JsonSettings, OutputWriter,
    SegmentRecord, progress, segment_records,
};
use crate::pipeline::{OutputLayout, ProcessOptions};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Result of processing a single file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Number of candidate matches across all templates.
    pub candidates: usize,
    /// Number of merged intervals removed.
    pub removed_intervals: usize,
    /// Seconds of audio removed.
    pub removed_secs: f64,
    /// Templates skipped for this track.
    pub skipped_templates: usize,
    /// Processing duration in seconds.
    pub duration_secs: f64,
    /// Audio duration in seconds.
    pub audio_duration_secs: f64,
}

/// Process a single audio file: match, cut, and write the results.
///
/// # Arguments
///
/// * `input_path` - Path to input audio file
/// * `layout` - Where the outputs for this file go
/// * `templates` - Reference clips to remove
/// * `options` - Matching and output options
pub fn process_file(
    input_path: &Path,
    layout: &OutputLayout,
    templates: &[Template],
    options: &ProcessOptions,
) -> Result<ProcessResult> {
    let start_time = Instant::now();

    info!("Processing: {}", input_path.display());

    let decoded = decode_audio_file(input_path)?;
    debug!(
        "Decoded {:.1}s at {} Hz from {} channel(s)",
        decoded.duration_secs, decoded.sample_rate, decoded.source_channels
    );
    let track = decoded.into_track();

    let file_name = input_path
        .file_name()
        .map_or_else(|| layout.stem.clone(), |n| n.to_string_lossy().into_owned());
    let spinner =
        progress::create_track_spinner(templates.len(), &file_name, options.progress_enabled);

    let config = options.match_config(track.sample_rate());
    let plan = plan_removal(templates, &track, &config);
    progress::clear_progress(spinner);
    let plan = plan?;

    let removed_secs = track.index_to_secs(plan.removed_samples());
    info!(
        "Found {} candidate(s); removing {} interval(s), {:.2}s of {:.2}s",
        plan.candidates.len(),
        plan.remove_intervals.len(),
        removed_secs,
        track.duration_secs()
    );

    if options.dry_run {
        for interval in &plan.remove_intervals {
            info!(
                "  {:.3}-{:.3}",
                track.index_to_secs(interval.start_index),
                track.index_to_secs(interval.end_index)
            );
        }
    } else {
        let assembled = assemble(&track, &plan.segments)?;
        write_audio(layout, &track, &assembled, options.combine_discards)?;

        let records = segment_records(&plan.segments, track.sample_rate());
        for format in &options.formats {
            write_report(*format, layout, &file_name, &track, &plan, &records, options)?;
        }
    }

    let duration_secs = start_time.elapsed().as_secs_f64();
    let realtime_factor = if duration_secs > 0.0 {
        track.duration_secs() / duration_secs
    } else {
        0.0
    };
    info!("Processed in {duration_secs:.2}s ({realtime_factor:.1}x realtime)");

    Ok(ProcessResult {
        candidates: plan.candidates.len(),
        removed_intervals: plan.remove_intervals.len(),
        removed_secs,
        skipped_templates: plan
            .templates
            .iter()
            .filter(|t| matches!(t.status, TemplateStatus::Skipped { .. }))
            .count(),
        duration_secs,
        audio_duration_secs: track.duration_secs(),
    })
}

/// Write the cleaned track and the discarded audio.
fn write_audio(
    layout: &OutputLayout,
    track: &AudioTrack,
    assembled: &AssembledAudio<'_>,
    combine_discards: bool,
) -> Result<()> {
    let writer = layout.wav_writer();
    let rate = track.sample_rate();

    let cleaned = writer.write_cleaned(&layout.stem, &assembled.kept, rate)?;
    debug!("Wrote cleaned track: {}", cleaned.display());

    for (i, clip) in assembled.discarded.iter().enumerate() {
        let path = writer.write_fragment(
            &layout.stem,
            i + 1,
            track.index_to_secs(clip.segment.start_index),
            track.index_to_secs(clip.segment.end_index),
            clip.samples,
            rate,
        )?;
        debug!("Wrote fragment: {}", path.display());
    }

    if combine_discards && !assembled.discarded.is_empty() {
        let path = writer.write_combined(&layout.stem, &assembled.combined_discards(), rate)?;
        debug!("Wrote combined discards: {}", path.display());
    }

    Ok(())
}

/// Write a segment report in one format.
fn write_report(
    format: OutputFormat,
    layout: &OutputLayout,
    source_file: &str,
    track: &AudioTrack,
    plan: &RemovalPlan,
    records: &[SegmentRecord],
    options: &ProcessOptions,
) -> Result<()> {
    let output_path = layout.report_path(format);
    debug!("Writing {} report: {}", format, output_path.display());

    let mut writer: Box<dyn OutputWriter> = match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(&output_path, DECIMAL_PLACES)?),
        OutputFormat::Audacity => Box::new(AudacityWriter::new(&output_path)?),
        OutputFormat::Json => {
            let matching = &options.matching;
            let settings = JsonSettings {
                min_score: matching.min_score,
                min_separation_secs: matching.min_separation_secs,
                merge_gap_ms: matching.merge_gap_ms,
                pre_padding_secs: matching.pre_padding_secs,
                post_padding_secs: matching.post_padding_secs,
                trim_templates: matching.trim_templates,
                method: matching.method,
            };
            let candidates = plan
                .candidates
                .iter()
                .map(|c| JsonCandidate {
                    template_id: c.template_id.clone(),
                    start_time: track.index_to_secs(c.start_index),
                    end_time: track.index_to_secs(c.end_index),
                    score: c.score,
                })
                .collect();
            Box::new(
                JsonReportWriter::new(
                    &output_path,
                    source_file,
                    track.sample_rate(),
                    track.duration_secs(),
                    settings,
                )
                .with_matches(plan.templates.clone(), candidates),
            )
        }
    };

    writer.write_header()?;
    for record in records {
        writer.write_segment(record)?;
    }
    writer.finalize()?;

    Ok(())
}

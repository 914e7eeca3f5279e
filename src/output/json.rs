//! JSON report writer.

use crate::error::{Error, Result};
use crate::matcher::{CorrelationMethod, SegmentKind, TemplateReport};
use crate::output::{OutputWriter, SegmentRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JSON report file structure.
#[derive(Debug, Serialize)]
pub struct JsonReportFile<'a> {
    /// Source audio file name.
    pub source_file: &'a str,
    /// Processing timestamp.
    pub analysis_date: DateTime<Utc>,
    /// Sample rate of the track in Hz.
    pub sample_rate: u32,
    /// Matching settings.
    pub settings: &'a JsonSettings,
    /// Outcome for each template.
    pub templates: &'a [TemplateReport],
    /// Every candidate match found.
    pub candidates: &'a [JsonCandidate],
    /// Kept and discarded segments in track order.
    pub segments: &'a [SegmentRecord],
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Matching settings recorded in the report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSettings {
    /// Minimum normalized score.
    pub min_score: f32,
    /// Minimum peak separation in seconds, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_separation_secs: Option<f64>,
    /// Merge gap in milliseconds.
    pub merge_gap_ms: u32,
    /// Padding before every match in seconds.
    pub pre_padding_secs: f64,
    /// Padding after every match in seconds.
    pub post_padding_secs: f64,
    /// Whether template edges were trimmed.
    pub trim_templates: bool,
    /// Correlation backend.
    pub method: CorrelationMethod,
}

/// Single candidate match in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonCandidate {
    /// Template that matched.
    pub template_id: String,
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Normalized correlation score.
    pub score: f32,
}

/// Summary statistics.
#[derive(Debug, Serialize)]
pub struct JsonSummary {
    /// Number of candidate matches.
    pub total_candidates: usize,
    /// Number of discarded segments.
    pub discarded_segments: usize,
    /// Seconds removed from the track.
    pub removed_seconds: f64,
    /// Input duration in seconds.
    pub audio_duration_seconds: f64,
}

/// Writer for JSON report files.
pub struct JsonReportWriter {
    segments: Vec<SegmentRecord>,
    output_path: PathBuf,
    source_file: String,
    sample_rate: u32,
    audio_duration: f64,
    settings: JsonSettings,
    templates: Vec<TemplateReport>,
    candidates: Vec<JsonCandidate>,
}

impl JsonReportWriter {
    /// Create a new JSON report writer.
    ///
    /// # Arguments
    ///
    /// * `output_path` - Path to write the JSON file
    /// * `source_file` - Name of the source audio file
    /// * `sample_rate` - Sample rate of the track
    /// * `audio_duration` - Duration of the track in seconds
    /// * `settings` - Matching settings used
    pub fn new(
        output_path: &Path,
        source_file: &str,
        sample_rate: u32,
        audio_duration: f64,
        settings: JsonSettings,
    ) -> Self {
        Self {
            segments: Vec::new(),
            output_path: output_path.to_path_buf(),
            source_file: source_file.to_string(),
            sample_rate,
            audio_duration,
            settings,
            templates: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// Attach per-template outcomes and the candidates they produced.
    #[must_use]
    pub fn with_matches(
        mut self,
        templates: Vec<TemplateReport>,
        candidates: Vec<JsonCandidate>,
    ) -> Self {
        self.templates = templates;
        self.candidates = candidates;
        self
    }

    fn compute_summary(&self) -> JsonSummary {
        let discarded = self
            .segments
            .iter()
            .filter(|s| s.kind == SegmentKind::Discarded);

        JsonSummary {
            total_candidates: self.candidates.len(),
            discarded_segments: discarded.clone().count(),
            removed_seconds: discarded.map(SegmentRecord::duration).sum(),
            audio_duration_seconds: self.audio_duration,
        }
    }
}

impl OutputWriter for JsonReportWriter {
    fn write_header(&mut self) -> Result<()> {
        // No header for JSON - written at finalize
        Ok(())
    }

    fn write_segment(&mut self, segment: &SegmentRecord) -> Result<()> {
        self.segments.push(segment.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let report = JsonReportFile {
            source_file: &self.source_file,
            analysis_date: Utc::now(),
            sample_rate: self.sample_rate,
            settings: &self.settings,
            templates: &self.templates,
            candidates: &self.candidates,
            segments: &self.segments,
            summary: self.compute_summary(),
        };

        let file = File::create(&self.output_path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &report).map_err(|e| Error::JsonWrite {
            path: self.output_path.clone(),
            source: e,
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::{Segment, TemplateStatus};
    use tempfile::tempdir;

    fn settings() -> JsonSettings {
        JsonSettings {
            min_score: 0.8,
            min_separation_secs: None,
            merge_gap_ms: 250,
            pre_padding_secs: 0.0,
            post_padding_secs: 0.0,
            trim_templates: true,
            method: CorrelationMethod::Auto,
        }
    }

    #[test]
    fn test_json_writer_basic() {
        let dir = tempdir().expect("create temp dir");
        let output_path = dir.path().join("show.adsnip.json");

        let mut writer = JsonReportWriter::new(&output_path, "show.mp3", 8000, 10.0, settings())
            .with_matches(
                vec![TemplateReport {
                    template_id: "jingle.wav".to_string(),
                    status: TemplateStatus::Matched { candidates: 1 },
                }],
                vec![JsonCandidate {
                    template_id: "jingle.wav".to_string(),
                    start_time: 3.0,
                    end_time: 5.0,
                    score: 0.99,
                }],
            );

        writer.write_header().expect("write header");
        for (index, segment) in [
            Segment {
                start_index: 0,
                end_index: 24_000,
                kind: SegmentKind::Kept,
            },
            Segment {
                start_index: 24_000,
                end_index: 40_000,
                kind: SegmentKind::Discarded,
            },
            Segment {
                start_index: 40_000,
                end_index: 80_000,
                kind: SegmentKind::Kept,
            },
        ]
        .iter()
        .enumerate()
        {
            writer
                .write_segment(&SegmentRecord::from_segment(segment, index + 1, 8000))
                .expect("write segment");
        }
        writer.finalize().expect("finalize");

        let content = std::fs::read_to_string(&output_path).expect("read file");
        let report: serde_json::Value = serde_json::from_str(&content).expect("parse JSON");

        assert_eq!(report["source_file"], "show.mp3");
        assert_eq!(report["settings"]["method"], "auto");
        assert!(report["settings"].get("min_separation_secs").is_none());
        assert_eq!(report["templates"][0]["status"], "matched");
        assert_eq!(report["segments"].as_array().map(Vec::len), Some(3));
        assert_eq!(report["segments"][1]["kind"], "discarded");
        assert_eq!(report["summary"]["discarded_segments"], 1);
        assert_eq!(report["summary"]["total_candidates"], 1);
        let removed = report["summary"]["removed_seconds"].as_f64().expect("f64");
        assert!((removed - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_writer_pass_through() {
        let dir = tempdir().expect("create temp dir");
        let output_path = dir.path().join("quiet.adsnip.json");

        let mut writer = JsonReportWriter::new(&output_path, "quiet.wav", 8000, 1.0, settings());
        writer.write_header().expect("write header");
        writer.finalize().expect("finalize");

        let content = std::fs::read_to_string(&output_path).expect("read file");
        let report: serde_json::Value = serde_json::from_str(&content).expect("parse JSON");
        assert_eq!(report["summary"]["discarded_segments"], 0);
        assert_eq!(report["summary"]["removed_seconds"], 0.0);
    }
}

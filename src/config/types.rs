//! Configuration type definitions.

use crate::constants::output::{DEFAULT_DISCARD_DIR, DEFAULT_TRIMMED_DIR};
use crate::constants::trim::DEFAULT_SILENCE_THRESHOLD;
use crate::constants::{DEFAULT_MERGE_GAP_MS, DEFAULT_MIN_SCORE, DEFAULT_PADDING_SECS};
use crate::matcher::CorrelationMethod;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default settings.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Matching settings.
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Default run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Template files used when none are given on the command line.
    pub templates: Vec<PathBuf>,

    /// Report formats.
    pub formats: Vec<OutputFormat>,

    /// Output root; defaults to each input's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            formats: vec![OutputFormat::Json],
            output_dir: None,
        }
    }
}

/// Template matching settings, in user-facing units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum normalized correlation score.
    pub min_score: f32,

    /// Minimum distance between matches of one template, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_separation_secs: Option<f64>,

    /// Matches closer than this are merged, in milliseconds.
    pub merge_gap_ms: u32,

    /// Audio removed before every match, in seconds.
    pub pre_padding_secs: f64,

    /// Audio removed after every match, in seconds.
    pub post_padding_secs: f64,

    /// Strip leading and trailing silence from templates.
    pub trim_templates: bool,

    /// Magnitude above which a template sample counts as audible.
    pub silence_threshold: f32,

    /// Correlation backend.
    pub method: CorrelationMethod,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            min_separation_secs: None,
            merge_gap_ms: DEFAULT_MERGE_GAP_MS,
            pre_padding_secs: DEFAULT_PADDING_SECS,
            post_padding_secs: DEFAULT_PADDING_SECS,
            trim_templates: true,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            method: CorrelationMethod::Auto,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Subdirectory of the output root for cleaned tracks and reports.
    pub trimmed_dir: String,

    /// Subdirectory of the output root for discarded fragments.
    pub discard_dir: String,

    /// Also write all discarded audio into one file per track.
    pub combine_discards: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            trimmed_dir: DEFAULT_TRIMMED_DIR.to_string(),
            discard_dir: DEFAULT_DISCARD_DIR.to_string(),
            combine_discards: false,
        }
    }
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Segment table as CSV.
    Csv,
    /// Audacity label track of discarded segments.
    Audacity,
    /// Full JSON report.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Audacity => write!(f, "audacity"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "audacity" | "labels" => Ok(Self::Audacity),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("csv".parse::<OutputFormat>().ok(), Some(OutputFormat::Csv));
        assert_eq!(
            "Audacity".parse::<OutputFormat>().ok(),
            Some(OutputFormat::Audacity)
        );
        assert_eq!(
            "labels".parse::<OutputFormat>().ok(),
            Some(OutputFormat::Audacity)
        );
        assert_eq!(
            "json".parse::<OutputFormat>().ok(),
            Some(OutputFormat::Json)
        );
        assert!("raven".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::Audacity.to_string(), "audacity");
    }

    #[test]
    fn test_matching_config_default_values() {
        let matching = MatchingConfig::default();
        assert_eq!(matching.min_score, 0.8);
        assert_eq!(matching.merge_gap_ms, 250);
        assert_eq!(matching.pre_padding_secs, 0.0);
        assert!(matching.trim_templates);
        assert!(matching.min_separation_secs.is_none());
        assert_eq!(matching.method, CorrelationMethod::Auto);
    }

    #[test]
    fn test_output_config_default_dirs() {
        let output = OutputConfig::default();
        assert_eq!(output.trimmed_dir, "trimmed");
        assert_eq!(output.discard_dir, "discard");
        assert!(!output.combine_discards);
    }
}

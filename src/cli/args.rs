//! CLI argument definitions.

use crate::cli::validators::{
    parse_padding, parse_score, parse_seconds, parse_silence_threshold,
};
use crate::config::OutputFormat;
use crate::matcher::CorrelationMethod;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Find recorded clips (ads, jingles, station IDs) in audio files and cut
/// them out.
#[derive(Debug, Parser)]
#[command(name = "adsnip")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input files or directories to clean.
    pub inputs: Vec<PathBuf>,

    /// Options for matching and output.
    #[command(flatten)]
    pub snip: SnipArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for matching and cutting.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct SnipArgs {
    /// Template clip to remove (repeatable).
    #[arg(short, long = "template", value_name = "FILE")]
    pub templates: Vec<PathBuf>,

    /// Report formats (comma-separated: csv,audacity,json).
    #[arg(short, long, value_delimiter = ',', env = "ADSNIP_FORMAT")]
    pub format: Option<Vec<OutputFormat>>,

    /// Output root directory (default: same as input).
    #[arg(short, long, env = "ADSNIP_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Minimum normalized correlation score (-1.0 to 1.0).
    #[arg(short = 's', long, value_parser = parse_score, env = "ADSNIP_MIN_SCORE")]
    pub min_score: Option<f32>,

    /// Minimum distance between matches of one template, in seconds
    /// (default: the template length).
    #[arg(long, value_parser = parse_seconds, env = "ADSNIP_MIN_SEPARATION")]
    pub min_separation: Option<f64>,

    /// Merge matches closer than this many milliseconds.
    #[arg(short = 'g', long, env = "ADSNIP_MERGE_GAP_MS")]
    pub merge_gap_ms: Option<u32>,

    /// Extra seconds removed before every match.
    #[arg(long = "pre", value_parser = parse_padding, env = "ADSNIP_PRE_PADDING")]
    pub pre_padding: Option<f64>,

    /// Extra seconds removed after every match.
    #[arg(long = "post", value_parser = parse_padding, env = "ADSNIP_POST_PADDING")]
    pub post_padding: Option<f64>,

    /// Correlation backend.
    #[arg(long, value_enum, env = "ADSNIP_METHOD")]
    pub method: Option<CorrelationMethod>,

    /// Use templates as-is instead of trimming their silent edges.
    #[arg(long)]
    pub no_trim: bool,

    /// Magnitude above which a template sample counts as audible.
    #[arg(long, value_parser = parse_silence_threshold, env = "ADSNIP_SILENCE_THRESHOLD")]
    pub silence_threshold: Option<f32>,

    /// Also write all discarded audio of a track into one file.
    #[arg(long)]
    pub combine_discards: bool,

    /// Log the ranges that would be removed without writing any files.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Reprocess files even if output exists.
    #[arg(long)]
    pub force: bool,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable progress bars.
    #[arg(long)]
    pub no_progress: bool,

    /// Also write log output to this file.
    #[arg(long, env = "ADSNIP_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "adsnip",
            "-t",
            "ad1.wav",
            "--template",
            "ad2.wav",
            "--min-score",
            "0.9",
            "--format",
            "csv,json",
            "--pre",
            "0.5",
            "--method",
            "fft",
            "--dry-run",
            "show.mp3",
        ])
        .unwrap();

        assert_eq!(cli.snip.templates.len(), 2);
        assert_eq!(cli.snip.min_score, Some(0.9));
        assert_eq!(
            cli.snip.format,
            Some(vec![OutputFormat::Csv, OutputFormat::Json])
        );
        assert_eq!(cli.snip.pre_padding, Some(0.5));
        assert_eq!(cli.snip.method, Some(CorrelationMethod::Fft));
        assert!(cli.snip.dry_run);
        assert_eq!(cli.inputs, vec![PathBuf::from("show.mp3")]);
    }

    #[test]
    fn test_rejects_out_of_range_score() {
        let result = Cli::try_parse_from(["adsnip", "-s", "2.0", "show.wav"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::try_parse_from(["adsnip", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Path
            })
        ));
    }
}

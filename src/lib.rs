//! adsnip - find recorded clips in audio and cut them out.
//!
//! Each template clip is located in a track by normalized cross-correlation;
//! overlapping hits from all templates are merged, and the track is split
//! into a cleaned file plus the discarded fragments.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod matcher;
pub mod output;
pub mod pipeline;

use clap::{CommandFactory, Parser};
use cli::{Cli, Command, SnipArgs};
use config::{
    Config, MatchingConfig, config_file_path, load_default_config, save_default_config,
    validate_config, validate_matching,
};
use pipeline::{
    ProcessCheck, ProcessOptions, check_output_collisions, collect_input_files, load_templates,
    process_file, should_process,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for adsnip CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.snip.verbose, cli.snip.quiet, cli.snip.log_file.as_deref())?;

    // Handle subcommands
    if let Some(command) = cli.command {
        return handle_command(command);
    }

    // Show help if no inputs provided
    if cli.inputs.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    // Load configuration
    let config = load_default_config()?;
    validate_config(&config)?;

    snip_files(&cli.inputs, &cli.snip, &config)
}

/// Merge command line overrides into the configured matching settings.
fn resolve_matching(args: &SnipArgs, config: &Config) -> Result<MatchingConfig> {
    let defaults = &config.matching;
    let matching = MatchingConfig {
        min_score: args.min_score.unwrap_or(defaults.min_score),
        min_separation_secs: args.min_separation.or(defaults.min_separation_secs),
        merge_gap_ms: args.merge_gap_ms.unwrap_or(defaults.merge_gap_ms),
        pre_padding_secs: args.pre_padding.unwrap_or(defaults.pre_padding_secs),
        post_padding_secs: args.post_padding.unwrap_or(defaults.post_padding_secs),
        trim_templates: defaults.trim_templates && !args.no_trim,
        silence_threshold: args.silence_threshold.unwrap_or(defaults.silence_threshold),
        method: args.method.unwrap_or(defaults.method),
    };
    validate_matching(&matching)?;
    Ok(matching)
}

/// Clean input files with the given options.
fn snip_files(inputs: &[PathBuf], args: &SnipArgs, config: &Config) -> Result<()> {
    use crate::output::progress;
    use std::time::Instant;

    let total_start = Instant::now();

    let matching = resolve_matching(args, config)?;

    let template_paths = if args.templates.is_empty() {
        config.defaults.templates.clone()
    } else {
        args.templates.clone()
    };
    let templates = load_templates(&template_paths, &matching)?;

    // Collect all input files, ignoring earlier outputs
    let skip_dirs = [
        config.output.trimmed_dir.as_str(),
        config.output.discard_dir.as_str(),
    ];
    let files = collect_input_files(inputs, &skip_dirs)?;
    if files.is_empty() {
        return Err(Error::NoValidAudioFiles);
    }

    info!(
        "Found {} audio file(s) to process with {} template(s)",
        files.len(),
        templates.len()
    );

    let progress_enabled = !args.quiet && !args.no_progress;
    let options = ProcessOptions {
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| config.defaults.output_dir.clone()),
        trimmed_dir: config.output.trimmed_dir.clone(),
        discard_dir: config.output.discard_dir.clone(),
        formats: args
            .format
            .clone()
            .unwrap_or_else(|| config.defaults.formats.clone()),
        matching,
        combine_discards: args.combine_discards || config.output.combine_discards,
        dry_run: args.dry_run,
        force: args.force,
        progress_enabled,
    };

    // Dry runs write nothing
    if !options.dry_run {
        check_output_collisions(&files, &options)?;
    }

    let file_progress = progress::create_file_progress(files.len(), progress_enabled);

    // Process files
    let mut processed = 0;
    let mut skipped = 0;
    let mut errors = 0;
    let mut total_intervals = 0;
    let mut total_removed_secs = 0.0;

    for file in &files {
        let layout = options.layout_for(file);

        // Dry runs never write, so existing output is irrelevant
        if should_process(&layout, options.force || options.dry_run) == ProcessCheck::SkipExists {
            info!("Skipping (output exists): {}", file.display());
            skipped += 1;
            progress::inc_progress(file_progress.as_ref());
            continue;
        }

        match process_file(file, &layout, &templates, &options) {
            Ok(result) => {
                processed += 1;
                total_intervals += result.removed_intervals;
                total_removed_secs += result.removed_secs;
                if result.skipped_templates > 0 {
                    warn!(
                        "{} template(s) skipped for {}",
                        result.skipped_templates,
                        file.display()
                    );
                }
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                errors += 1;
                if args.fail_fast {
                    progress::finish_progress(file_progress, "Failed");
                    return Err(e);
                }
            }
        }
        progress::inc_progress(file_progress.as_ref());
    }

    progress::finish_progress(file_progress, "Complete");

    // Summary
    let total_duration = total_start.elapsed().as_secs_f64();
    info!(
        "Complete: {} processed, {} skipped, {} errors, {} interval(s) removed ({:.1}s) in {:.2}s",
        processed, skipped, errors, total_intervals, total_removed_secs, total_duration
    );

    if errors > 0 {
        warn!("{} file(s) had errors", errors);
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    let file_layer = log_file
        .map(|path| {
            let file = File::create(path).map_err(|e| Error::LogFileOpen {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok::<_, Error>(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        })
        .transpose()?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}

fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
    }
}

fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  add your clips under [defaults] templates, or pass them with -t");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            println!("{config:#?}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

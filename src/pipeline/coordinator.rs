//! Pipeline coordination for file processing.

use crate::config::{MatchingConfig, OutputFormat};
use crate::constants::AUDIO_EXTENSIONS;
use crate::constants::report_extensions;
use crate::error::{Error, Result};
use crate::matcher::MatchConfig;
use crate::output::{WavWriter, sanitize_filename};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Options for processing a single file.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Output root (None = same as input).
    pub output_dir: Option<PathBuf>,
    /// Subdirectory of the output root for cleaned tracks and reports.
    pub trimmed_dir: String,
    /// Subdirectory of the output root for discarded audio.
    pub discard_dir: String,
    /// Report formats to generate.
    pub formats: Vec<OutputFormat>,
    /// Matching settings in seconds.
    pub matching: MatchingConfig,
    /// Also write one file with all discarded audio.
    pub combine_discards: bool,
    /// Log the planned cuts without writing anything.
    pub dry_run: bool,
    /// Force reprocessing even if output exists.
    pub force: bool,
    /// Whether to show progress bars.
    pub progress_enabled: bool,
}

impl ProcessOptions {
    /// Matching settings converted to samples at the given rate.
    pub fn match_config(&self, sample_rate: u32) -> MatchConfig {
        let matching = &self.matching;
        MatchConfig {
            min_score: matching.min_score,
            min_separation: matching
                .min_separation_secs
                .map(|secs| secs_to_samples(secs, sample_rate)),
            merge_gap: ms_to_samples(matching.merge_gap_ms, sample_rate),
            pre_padding: secs_to_samples(matching.pre_padding_secs, sample_rate),
            post_padding: secs_to_samples(matching.post_padding_secs, sample_rate),
            method: matching.method,
        }
    }

    /// Output locations for one input file.
    pub fn layout_for(&self, input: &Path) -> OutputLayout {
        let root = output_dir_for(input, self.output_dir.as_deref());
        OutputLayout {
            trimmed_dir: root.join(&self.trimmed_dir),
            discard_dir: root.join(&self.discard_dir),
            stem: file_stem(input),
        }
    }
}

/// Where the outputs for one input go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Directory for the cleaned track and reports.
    pub trimmed_dir: PathBuf,
    /// Directory for discarded audio.
    pub discard_dir: PathBuf,
    /// Input file stem used to name every output.
    pub stem: String,
}

impl OutputLayout {
    /// WAV writer targeting this layout.
    pub fn wav_writer(&self) -> WavWriter {
        WavWriter::new(self.trimmed_dir.clone(), self.discard_dir.clone())
    }

    /// Path of the cleaned track.
    pub fn cleaned_path(&self) -> PathBuf {
        self.wav_writer().cleaned_path(&self.stem)
    }

    /// Path of the report for a given format.
    pub fn report_path(&self, format: OutputFormat) -> PathBuf {
        let extension = match format {
            OutputFormat::Csv => report_extensions::CSV,
            OutputFormat::Audacity => report_extensions::AUDACITY,
            OutputFormat::Json => report_extensions::JSON,
        };
        self.trimmed_dir
            .join(format!("{}{extension}", sanitize_filename(&self.stem)))
    }
}

/// Result of checking whether a file should be processed.
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessCheck {
    /// File should be processed.
    Process,
    /// Skip - output already exists.
    SkipExists,
}

/// Determine the output root for a file.
pub fn output_dir_for(input: &Path, explicit_output_dir: Option<&Path>) -> PathBuf {
    explicit_output_dir.map_or_else(
        || {
            input
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        },
        Path::to_path_buf,
    )
}

fn file_stem(input: &Path) -> String {
    // Non-UTF-8 names keep a lossy version of their stem
    input
        .file_stem()
        .map_or_else(|| "output".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Check if a file should be processed.
pub fn should_process(layout: &OutputLayout, force: bool) -> ProcessCheck {
    if !force && layout.cleaned_path().exists() {
        return ProcessCheck::SkipExists;
    }
    ProcessCheck::Process
}

/// Fail if two inputs would write the same cleaned track.
///
/// Outputs are named by file stem, so `show.mp3` next to `show.wav`, or
/// `a/show.wav` and `b/show.wav` under one `-o`, would overwrite each other.
pub fn check_output_collisions(files: &[PathBuf], options: &ProcessOptions) -> Result<()> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::with_capacity(files.len());
    for file in files {
        let output = options.layout_for(file).cleaned_path();
        if let Some(first) = claimed.get(&output) {
            return Err(Error::OutputCollision {
                first: first.to_path_buf(),
                second: file.clone(),
                output,
            });
        }
        claimed.insert(output, file);
    }
    Ok(())
}

/// Collect input files from paths (files and directories).
///
/// Directories are searched recursively, skipping subdirectories named in
/// `skip_dirs` so earlier outputs are not picked up as inputs. Files found
/// in a directory are returned in path order.
pub fn collect_input_files(paths: &[PathBuf], skip_dirs: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_audio_file(path) {
                files.push(path.clone());
            } else {
                warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            let mut found = Vec::new();
            collect_audio_files_recursive(path, skip_dirs, &mut found)?;
            found.sort();
            files.extend(found);
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    Ok(files)
}

/// Recursively collect audio files from a directory.
fn collect_audio_files_recursive(
    dir: &Path,
    skip_dirs: &[&str],
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            let skipped = path
                .file_name()
                .is_some_and(|name| skip_dirs.iter().any(|skip| name == *skip));
            if !skipped {
                collect_audio_files_recursive(&path, skip_dirs, files)?;
            }
        } else if is_audio_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a file is a supported audio format.
pub fn is_audio_file(path: &Path) -> bool {
    use std::ffi::OsStr;

    path.extension().is_some_and(|ext| {
        // Compare extension directly as OsStr to handle non-UTF-8 filenames
        AUDIO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(OsStr::new(known)))
    })
}

/// Convert seconds to a whole number of samples.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn secs_to_samples(secs: f64, sample_rate: u32) -> usize {
    (secs.max(0.0) * f64::from(sample_rate)).round() as usize
}

/// Convert milliseconds to a whole number of samples.
#[allow(clippy::cast_possible_truncation)]
pub fn ms_to_samples(ms: u32, sample_rate: u32) -> usize {
    (u64::from(ms) * u64::from(sample_rate) / 1000) as usize
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(output_dir: Option<PathBuf>) -> ProcessOptions {
        ProcessOptions {
            output_dir,
            trimmed_dir: "trimmed".to_string(),
            discard_dir: "discard".to_string(),
            formats: vec![OutputFormat::Json],
            matching: MatchingConfig::default(),
            combine_discards: false,
            dry_run: false,
            force: false,
            progress_enabled: false,
        }
    }

    #[test]
    fn test_output_dir_for_with_explicit() {
        let input = Path::new("/data/audio.wav");
        let output = output_dir_for(input, Some(Path::new("/results")));
        assert_eq!(output, PathBuf::from("/results"));
    }

    #[test]
    fn test_output_dir_for_without_explicit() {
        let input = Path::new("/data/audio.wav");
        let output = output_dir_for(input, None);
        assert_eq!(output, PathBuf::from("/data"));
    }

    #[test]
    fn test_layout_paths() {
        let layout = options(Some(PathBuf::from("/out"))).layout_for(Path::new("/data/show.mp3"));

        assert_eq!(layout.cleaned_path(), PathBuf::from("/out/trimmed/show.wav"));
        assert_eq!(
            layout.report_path(OutputFormat::Json),
            PathBuf::from("/out/trimmed/show.adsnip.json")
        );
        assert_eq!(
            layout.report_path(OutputFormat::Audacity),
            PathBuf::from("/out/trimmed/show.adsnip.labels.txt")
        );
        assert_eq!(layout.discard_dir, PathBuf::from("/out/discard"));
    }

    #[test]
    fn test_layout_unicode_stem() {
        let layout = options(None).layout_for(Path::new("/data/ääni_tiedostö.wav"));
        assert_eq!(layout.stem, "ääni_tiedostö");
        assert_eq!(layout.trimmed_dir, PathBuf::from("/data/trimmed"));
    }

    #[test]
    fn test_match_config_conversion() {
        let mut opts = options(None);
        opts.matching.merge_gap_ms = 250;
        opts.matching.pre_padding_secs = 0.5;
        opts.matching.min_separation_secs = Some(2.0);

        let config = opts.match_config(8000);
        assert_eq!(config.merge_gap, 2000);
        assert_eq!(config.pre_padding, 4000);
        assert_eq!(config.post_padding, 0);
        assert_eq!(config.min_separation, Some(16_000));
    }

    #[test]
    fn test_should_process_skips_existing() {
        let dir = TempDir::new().unwrap();
        let layout = options(Some(dir.path().to_path_buf())).layout_for(Path::new("show.wav"));
        assert_eq!(should_process(&layout, false), ProcessCheck::Process);

        std::fs::create_dir_all(&layout.trimmed_dir).unwrap();
        std::fs::write(layout.cleaned_path(), b"").unwrap();
        assert_eq!(should_process(&layout, false), ProcessCheck::SkipExists);
        assert_eq!(should_process(&layout, true), ProcessCheck::Process);
    }

    #[test]
    fn test_collect_skips_output_dirs() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.wav"), b"").unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::create_dir_all(dir.path().join("trimmed")).unwrap();
        std::fs::write(dir.path().join("trimmed").join("b.wav"), b"").unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.flac"), b"").unwrap();

        let files =
            collect_input_files(&[dir.path().to_path_buf()], &["trimmed", "discard"]).unwrap();

        assert_eq!(
            files,
            vec![
                dir.path().join("a.mp3"),
                dir.path().join("b.wav"),
                dir.path().join("sub").join("c.flac"),
            ]
        );
    }

    #[test]
    fn test_same_stem_inputs_collide() {
        let files = vec![
            PathBuf::from("/data/show.mp3"),
            PathBuf::from("/data/other.wav"),
            PathBuf::from("/data/show.wav"),
        ];

        let result = check_output_collisions(&files, &options(None));
        match result {
            Err(Error::OutputCollision {
                first,
                second,
                output,
            }) => {
                assert_eq!(first, PathBuf::from("/data/show.mp3"));
                assert_eq!(second, PathBuf::from("/data/show.wav"));
                assert_eq!(output, PathBuf::from("/data/trimmed/show.wav"));
            }
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_shared_output_dir_collides_across_folders() {
        let files = vec![PathBuf::from("/a/show.wav"), PathBuf::from("/b/show.wav")];

        assert!(check_output_collisions(&files, &options(None)).is_ok());
        assert!(matches!(
            check_output_collisions(&files, &options(Some(PathBuf::from("/out")))),
            Err(Error::OutputCollision { .. })
        ));
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("test.wav")));
        assert!(is_audio_file(Path::new("test.FLAC")));
        assert!(is_audio_file(Path::new("test.ogg")));
        assert!(!is_audio_file(Path::new("test.txt")));
        assert!(is_audio_file(Path::new("テスト.wav")));
    }
}

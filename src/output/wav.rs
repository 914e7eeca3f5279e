//! WAV file writing.
//!
//! Writes the cleaned track, one file per discarded fragment, and
//! optionally all discarded audio in one file.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter as HoundWriter};

use crate::Error;
use crate::constants::output::{AUDIO_EXTENSION, COMBINED_DISCARD_SUFFIX, FILENAME_TIME_DECIMALS};

/// Writes processed audio below a trimmed and a discard directory.
pub struct WavWriter {
    /// Directory for cleaned tracks.
    trimmed_dir: PathBuf,
    /// Directory for discarded audio.
    discard_dir: PathBuf,
}

impl WavWriter {
    /// Create a new WAV writer with the given output directories.
    #[must_use]
    pub fn new(trimmed_dir: PathBuf, discard_dir: PathBuf) -> Self {
        Self {
            trimmed_dir,
            discard_dir,
        }
    }

    /// Path of the cleaned track for an input stem.
    pub fn cleaned_path(&self, stem: &str) -> PathBuf {
        self.trimmed_dir
            .join(format!("{}.{AUDIO_EXTENSION}", sanitize_filename(stem)))
    }

    /// Path of the combined discard file for an input stem.
    pub fn combined_path(&self, stem: &str) -> PathBuf {
        self.discard_dir
            .join(format!("{}{COMBINED_DISCARD_SUFFIX}", sanitize_filename(stem)))
    }

    /// Write the cleaned track.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn write_cleaned(
        &self,
        stem: &str,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<PathBuf, Error> {
        create_dir(&self.trimmed_dir)?;
        let output_path = self.cleaned_path(stem);
        write_wav_file(&output_path, samples, sample_rate)?;
        Ok(output_path)
    }

    /// Write one discarded fragment.
    ///
    /// Fragments go into a subdirectory named after the input, with a
    /// filename containing the fragment number and time range.
    ///
    /// # Arguments
    ///
    /// * `stem` - Input file stem
    /// * `index` - 1-based fragment number
    /// * `start_time` - Fragment start in seconds
    /// * `end_time` - Fragment end in seconds
    /// * `samples` - Audio samples as f32 (-1.0 to 1.0)
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn write_fragment(
        &self,
        stem: &str,
        index: usize,
        start_time: f64,
        end_time: f64,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<PathBuf, Error> {
        let safe_stem = sanitize_filename(stem);
        let fragment_dir = self.discard_dir.join(&safe_stem);
        create_dir(&fragment_dir)?;

        let filename = fragment_filename(&safe_stem, index, start_time, end_time);
        let output_path = fragment_dir.join(filename);
        write_wav_file(&output_path, samples, sample_rate)?;
        Ok(output_path)
    }

    /// Write all discarded audio of a track into one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn write_combined(
        &self,
        stem: &str,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<PathBuf, Error> {
        create_dir(&self.discard_dir)?;
        let output_path = self.combined_path(stem);
        write_wav_file(&output_path, samples, sample_rate)?;
        Ok(output_path)
    }
}

fn create_dir(dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir).map_err(|e| Error::OutputDirCreateFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Sanitize a string for use as a filename/directory name.
///
/// Replaces characters that are invalid in filenames across platforms
/// and prevents path traversal attacks.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    // Prevent path traversal: replace ".." with "__"
    sanitized.replace("..", "__")
}

/// Generate a filename for a discarded fragment.
///
/// Format: `stem_NNN_start-end.wav`
/// Example: `show_001_12.3-42.3.wav`
fn fragment_filename(stem: &str, index: usize, start_time: f64, end_time: f64) -> String {
    format!(
        "{stem}_{index:03}_{start_time:.prec$}-{end_time:.prec$}.{AUDIO_EXTENSION}",
        prec = FILENAME_TIME_DECIMALS
    )
}

/// Write mono samples to a 16-bit PCM WAV file.
///
/// # Errors
///
/// Returns [`Error::WavWriteFailed`] if the file cannot be created or written.
pub fn write_wav_file(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = HoundWriter::create(path, spec).map_err(|e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Convert f32 samples to i16
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let sample_i16 = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer
            .write_sample(sample_i16)
            .map_err(|e| Error::WavWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    writer.finalize().map_err(|e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Morning Show"), "Morning Show");
        assert_eq!(sanitize_filename("a/b:c*d"), "a_b_c_d");
        assert_eq!(sanitize_filename("file?name"), "file_name");
    }

    #[test]
    fn test_sanitize_filename_prevents_path_traversal() {
        assert_eq!(sanitize_filename(".."), "__");
        assert_eq!(sanitize_filename("../etc"), "___etc");
        assert_eq!(sanitize_filename("ep. 12"), "ep. 12");
    }

    #[test]
    fn test_fragment_filename() {
        assert_eq!(
            fragment_filename("show", 1, 12.3, 42.3),
            "show_001_12.3-42.3.wav"
        );
        assert_eq!(
            fragment_filename("show", 12, 0.04, 1.96),
            "show_012_0.0-2.0.wav"
        );
    }

    #[test]
    fn test_write_fragment_layout() {
        let dir = TempDir::new().unwrap();
        let writer = WavWriter::new(dir.path().join("trimmed"), dir.path().join("discard"));

        let path = writer
            .write_fragment("show", 1, 12.3, 42.3, &[0.0; 100], 8000)
            .unwrap();

        assert_eq!(
            path,
            dir.path()
                .join("discard")
                .join("show")
                .join("show_001_12.3-42.3.wav")
        );
        assert!(path.exists());
    }

    #[test]
    fn test_write_cleaned_round_trips_samples() {
        let dir = TempDir::new().unwrap();
        let writer = WavWriter::new(dir.path().join("trimmed"), dir.path().join("discard"));

        let path = writer
            .write_cleaned("show", &[0.0, 0.5, -0.5, 2.0], 16_000)
            .unwrap();
        assert_eq!(path, dir.path().join("trimmed").join("show.wav"));

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(samples, vec![0, 16_383, -16_383, i16::MAX]);
    }

    #[test]
    fn test_combined_path() {
        let writer = WavWriter::new(PathBuf::from("out/trimmed"), PathBuf::from("out/discard"));
        assert_eq!(
            writer.combined_path("show"),
            PathBuf::from("out/discard/show.discard.wav")
        );
    }
}

//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "adsnip";

/// Default minimum normalized correlation score for a candidate match.
pub const DEFAULT_MIN_SCORE: f32 = 0.8;

/// Default gap tolerance when merging nearby matches, in milliseconds.
pub const DEFAULT_MERGE_GAP_MS: u32 = 250;

/// Default padding added before and after each match, in seconds.
pub const DEFAULT_PADDING_SECS: f64 = 0.0;

/// Maximum allowed padding in seconds.
pub const MAX_PADDING_SECS: f64 = 300.0;

/// Normalized correlation score bounds.
pub mod score {
    /// Lowest possible score (perfectly inverted match).
    pub const MIN: f32 = -1.0;
    /// Highest possible score (perfect match).
    pub const MAX: f32 = 1.0;
    /// Decimal places for score formatting.
    pub const DECIMAL_PLACES: usize = 4;
}

/// Cross-correlation tuning.
pub mod correlation {
    /// `Auto` mode correlates in the time domain while
    /// `template_len * positions` stays at or below this many multiply-adds.
    pub const DIRECT_WORK_LIMIT: usize = 1 << 22;

    /// Smallest FFT block used for overlap-save correlation.
    pub const MIN_FFT_LEN: usize = 1 << 14;

    /// Windows whose energy is below this fraction of the template energy
    /// score zero instead of being normalized.
    pub const ENERGY_FLOOR_RATIO: f64 = 1e-9;
}

/// Template silence trimming.
pub mod trim {
    /// Default magnitude above which a sample counts as audible.
    pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.1;

    /// Audible run length (exclusive) that marks where a clip starts or ends.
    pub const MIN_AUDIBLE_RUN: usize = 50;
}

/// Output file layout.
pub mod output {
    /// Default subdirectory for cleaned tracks.
    pub const DEFAULT_TRIMMED_DIR: &str = "trimmed";

    /// Default subdirectory for discarded fragments.
    pub const DEFAULT_DISCARD_DIR: &str = "discard";

    /// Extension of written audio files.
    pub const AUDIO_EXTENSION: &str = "wav";

    /// Suffix of the combined discard file.
    pub const COMBINED_DISCARD_SUFFIX: &str = ".discard.wav";

    /// Decimal places for seconds in fragment filenames.
    pub const FILENAME_TIME_DECIMALS: usize = 1;
}

/// Report file extensions by format.
pub mod report_extensions {
    /// CSV segment table.
    pub const CSV: &str = ".adsnip.csv";
    /// Audacity label track.
    pub const AUDACITY: &str = ".adsnip.labels.txt";
    /// JSON report.
    pub const JSON: &str = ".adsnip.json";
}

/// Supported input audio file extensions.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "m4a", "aac", "ogg"];

//! Error types for adsnip.

/// Result type alias for adsnip operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for adsnip.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// No templates were given on the command line or in the config.
    #[error("no templates specified (use -t or set defaults.templates in config)")]
    NoTemplates,

    /// None of the given templates could be loaded.
    #[error("none of the {count} template(s) could be loaded")]
    NoUsableTemplates {
        /// Number of templates that were attempted.
        count: usize,
    },

    /// No valid audio files found.
    #[error("no valid audio files found in the provided paths")]
    NoValidAudioFiles,

    /// Two inputs map to the same output files.
    #[error("'{first}' and '{second}' would both be written to '{output}'")]
    OutputCollision {
        /// Input that claims the output first.
        first: std::path::PathBuf,
        /// Input that would overwrite it.
        second: std::path::PathBuf,
        /// Shared cleaned track path.
        output: std::path::PathBuf,
    },

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Template and track sample rates differ.
    #[error(
        "template '{template}' has sample rate {template_rate} Hz but the track is {track_rate} Hz"
    )]
    RateMismatch {
        /// Template identifier.
        template: String,
        /// Template sample rate in Hz.
        template_rate: u32,
        /// Track sample rate in Hz.
        track_rate: u32,
    },

    /// Template has no samples.
    #[error("template '{template}' is empty")]
    EmptyTemplate {
        /// Template identifier.
        template: String,
    },

    /// Template contains only zero samples.
    #[error("template '{template}' is completely silent")]
    SilentTemplate {
        /// Template identifier.
        template: String,
    },

    /// Interval input broke the sorted, non-overlapping contract.
    #[error("interval invariant violated: {message}")]
    InvariantViolation {
        /// Description of the violation.
        message: String,
    },

    /// FFT planning or execution failed.
    #[error("FFT correlation failed: {reason}")]
    Fft {
        /// Description of the failure.
        reason: String,
    },

    /// Failed to write WAV file.
    #[error("failed to write WAV file '{path}'")]
    WavWriteFailed {
        /// Path to the WAV file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write JSON report file.
    #[error("failed to write JSON report '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write CSV report file.
    #[error("failed to write CSV report '{path}'")]
    CsvWrite {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to open the log file.
    #[error("failed to open log file '{path}'")]
    LogFileOpen {
        /// Path to the log file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

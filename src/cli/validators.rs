//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

use crate::constants::{MAX_PADDING_SECS, score};

/// Parse and validate a correlation score (-1.0 to 1.0).
pub fn parse_score(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(score::MIN..=score::MAX).contains(&value) {
        return Err(format!(
            "score must be between {} and {}, got {value}",
            score::MIN,
            score::MAX
        ));
    }

    Ok(value)
}

/// Parse and validate a bounded float value.
///
/// # Arguments
///
/// * `s` - The string to parse
/// * `min` - Minimum allowed value (inclusive)
/// * `max` - Maximum allowed value (inclusive)
/// * `name` - Name of the parameter for error messages
pub fn parse_bounded_float(s: &str, min: f64, max: f64, name: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(min..=max).contains(&value) {
        return Err(format!(
            "{name} must be between {min} and {max}, got {value}"
        ));
    }

    Ok(value)
}

/// Parse and validate padding in seconds.
pub fn parse_padding(s: &str) -> Result<f64, String> {
    parse_bounded_float(s, 0.0, MAX_PADDING_SECS, "padding")
}

/// Parse and validate a non-negative duration in seconds.
pub fn parse_seconds(s: &str) -> Result<f64, String> {
    parse_bounded_float(s, 0.0, f64::MAX, "duration")
}

/// Parse and validate a silence threshold (greater than 0.0, at most 1.0).
pub fn parse_silence_threshold(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(value > 0.0 && value <= 1.0) {
        return Err(format!(
            "silence threshold must be above 0.0 and at most 1.0, got {value}"
        ));
    }

    Ok(value)
}

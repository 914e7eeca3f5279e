//! Configuration validation.

use crate::config::{Config, MatchingConfig, OutputConfig};
use crate::constants::{MAX_PADDING_SECS, score};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_matching(&config.matching)?;
    validate_output(&config.output)?;
    Ok(())
}

/// Validate matching settings.
pub fn validate_matching(matching: &MatchingConfig) -> Result<()> {
    if !(score::MIN..=score::MAX).contains(&matching.min_score) {
        return Err(Error::ConfigValidation {
            message: format!(
                "min_score must be between {} and {}, got {}",
                score::MIN,
                score::MAX,
                matching.min_score
            ),
        });
    }

    if let Some(separation) = matching.min_separation_secs
        && !(separation >= 0.0 && separation.is_finite())
    {
        return Err(Error::ConfigValidation {
            message: format!("min_separation_secs must be non-negative, got {separation}"),
        });
    }

    validate_padding("pre_padding_secs", matching.pre_padding_secs)?;
    validate_padding("post_padding_secs", matching.post_padding_secs)?;

    if !(matching.silence_threshold > 0.0 && matching.silence_threshold <= 1.0) {
        return Err(Error::ConfigValidation {
            message: format!(
                "silence_threshold must be in (0, 1], got {}",
                matching.silence_threshold
            ),
        });
    }

    Ok(())
}

fn validate_padding(name: &str, value: f64) -> Result<()> {
    if !(0.0..=MAX_PADDING_SECS).contains(&value) {
        return Err(Error::ConfigValidation {
            message: format!("{name} must be between 0 and {MAX_PADDING_SECS}, got {value}"),
        });
    }
    Ok(())
}

fn validate_output(output: &OutputConfig) -> Result<()> {
    for (name, dir) in [
        ("trimmed_dir", &output.trimmed_dir),
        ("discard_dir", &output.discard_dir),
    ] {
        if dir.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: format!("{name} must not be empty"),
            });
        }
    }

    if output.trimmed_dir == output.discard_dir {
        return Err(Error::ConfigValidation {
            message: "trimmed_dir and discard_dir must differ".to_string(),
        });
    }

    Ok(())
}

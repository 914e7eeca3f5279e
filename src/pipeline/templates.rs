//! Loading reference clips from disk.

use crate::audio::decode_audio_file;
use crate::config::MatchingConfig;
use crate::error::{Error, Result};
use crate::matcher::Template;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Decode every template file, trimming silent edges if enabled.
///
/// Templates that fail to load are logged and skipped.
///
/// # Errors
///
/// Returns [`Error::NoTemplates`] when `paths` is empty and
/// [`Error::NoUsableTemplates`] when none of them could be loaded.
pub fn load_templates(paths: &[PathBuf], matching: &MatchingConfig) -> Result<Vec<Template>> {
    if paths.is_empty() {
        return Err(Error::NoTemplates);
    }

    let mut templates = Vec::with_capacity(paths.len());
    for path in paths {
        match load_template(path, matching) {
            Ok(template) => {
                info!(
                    "Loaded template '{}' ({} samples at {} Hz)",
                    template.id(),
                    template.len(),
                    template.sample_rate()
                );
                templates.push(template);
            }
            Err(e) => warn!("Skipping template {}: {e}", path.display()),
        }
    }

    if templates.is_empty() {
        return Err(Error::NoUsableTemplates { count: paths.len() });
    }

    Ok(templates)
}

/// Decode one template file.
///
/// # Errors
///
/// Returns an error if the file cannot be decoded or holds no usable audio.
pub fn load_template(path: &Path, matching: &MatchingConfig) -> Result<Template> {
    let decoded = decode_audio_file(path)?;
    let id = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let mut template = Template::new(id, decoded.samples, decoded.sample_rate)?;

    if !matching.trim_templates {
        return Ok(template);
    }

    if !template.trim_silence(matching.silence_threshold) {
        warn!(
            "Template '{}' has no sustained audio above {}; using it untrimmed",
            template.id(),
            matching.silence_threshold
        );
        return Ok(template);
    }

    debug!(
        "Template '{}': trimmed {} leading and {} trailing samples",
        template.id(),
        template.lead_in(),
        template.tail()
    );
    Ok(template)
}

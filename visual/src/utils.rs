use std::path::{Path, PathBuf};
use tracing::warn;

use crate::AutomationError;

/// Clamp a match confidence into `[0, 1]`.
///
/// NaN cannot be clamped meaningfully and is replaced by `fallback`.
pub fn validate_confidence(confidence: f64, fallback: f64) -> f64 {
    if confidence.is_nan() {
        warn!(fallback, "Confidence value is NaN, using fallback");
        return fallback.clamp(0.0, 1.0);
    }
    if !(0.0..=1.0).contains(&confidence) {
        warn!("Confidence value {} not in range [0,1], clamping", confidence);
        return confidence.clamp(0.0, 1.0);
    }
    confidence
}

/// Coerce a timeout in seconds: anything below `-1` becomes `-1` (no deadline).
pub fn validate_timeout(timeout: i64) -> i64 {
    if timeout < -1 {
        warn!("Invalid timeout value {}, using -1", timeout);
        return -1;
    }
    timeout
}

/// Resolve an image path to an absolute one and make sure it exists.
pub fn resolve_image_path(image: &Path) -> Result<PathBuf, AutomationError> {
    let absolute = if image.is_absolute() {
        image.to_path_buf()
    } else {
        std::env::current_dir()?.join(image)
    };
    if !absolute.is_file() {
        return Err(AutomationError::ImageNotFound(absolute));
    }
    Ok(absolute.canonicalize().unwrap_or(absolute))
}

/// Escape a string for interpolation inside an AppleScript string literal.
pub fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

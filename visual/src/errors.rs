use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the engines and helpers underneath the public façades.
///
/// The `Screen`, `Keyboard` and `App` methods never return these; they log
/// them and report failure as `false` / `None`.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Image file not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Failed to load image {}: {source}", path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Screen capture failed: {0}")]
    Capture(String),

    #[error("Input synthesis failed: {0}")]
    Input(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

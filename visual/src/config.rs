use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::utils::{validate_confidence, validate_timeout};
use crate::AutomationError;

/// Largest box `highlight` will trace, in pixels
pub const MAX_HIGHLIGHT_BOX_SIZE: i32 = 4096;

/// Defaults and pacing shared by the `Screen`, `Keyboard` and `App` façades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualConfig {
    /// Match confidence used when a caller does not pass one
    pub default_confidence: f64,

    /// Timeout for `wait` in seconds; -1 waits forever
    pub default_timeout_secs: i64,

    /// Timeout for `exists` in seconds
    pub exists_timeout_secs: f64,

    /// Delay between screen scans while waiting for an image
    pub wait_interval_ms: u64,

    /// Delay between checks in the `on_appears` / `on_vanish` / `on_change` loops
    pub observe_interval_ms: u64,

    /// Delay between keystrokes when typing text
    pub type_interval_ms: u64,

    /// Pause after moving the pointer before pressing a button
    pub click_settle_ms: u64,

    /// Side length in pixels of the box traced by `highlight`
    pub highlight_box_size: i32,

    /// Default duration of a `highlight`
    pub highlight_duration_ms: u64,
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            default_confidence: 0.9,
            default_timeout_secs: 10,
            exists_timeout_secs: 3.0,
            wait_interval_ms: 100,
            observe_interval_ms: 500,
            type_interval_ms: 100,
            click_settle_ms: 50,
            highlight_box_size: 50,
            highlight_duration_ms: 500,
        }
    }
}

impl VisualConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, AutomationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: VisualConfig = serde_json::from_str(&raw)
            .map_err(|e| AutomationError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config.validated())
    }

    /// Apply the same clamping the façades apply to per-call arguments.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        self.default_confidence =
            validate_confidence(self.default_confidence, defaults.default_confidence);
        self.default_timeout_secs = validate_timeout(self.default_timeout_secs);
        if !self.exists_timeout_secs.is_finite() || self.exists_timeout_secs < 0.0 {
            self.exists_timeout_secs = defaults.exists_timeout_secs;
        }
        if self.highlight_box_size < 2 {
            self.highlight_box_size = defaults.highlight_box_size;
        }
        self.highlight_box_size = self.highlight_box_size.min(MAX_HIGHLIGHT_BOX_SIZE);
        self
    }

    pub fn wait_interval(&self) -> Duration {
        Duration::from_millis(self.wait_interval_ms)
    }

    pub fn observe_interval(&self) -> Duration {
        Duration::from_millis(self.observe_interval_ms)
    }

    pub fn type_interval(&self) -> Duration {
        Duration::from_millis(self.type_interval_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_duration_ms)
    }
}

use crate::{AutomationError, Key, MouseButton, Point, ScreenshotResult};
use std::path::Path;
use std::process::Child;
use std::sync::Arc;

pub mod capture;
pub mod commands;
pub mod input;
pub mod unsupported;

#[cfg(target_os = "macos")]
pub mod macos;
#[cfg(target_os = "windows")]
pub mod windows;

/// Whether a key goes down, comes up, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Press,
    Release,
    Click,
}

/// Source of screenshots
#[async_trait::async_trait]
pub trait ScreenEngine: Send + Sync {
    /// Capture a screenshot of the primary monitor
    async fn capture_screen(&self) -> Result<ScreenshotResult, AutomationError>;
}

/// Mouse and keyboard synthesis
pub trait InputEngine: Send + Sync {
    /// Current pointer position in logical coordinates
    fn mouse_position(&self) -> Result<Point, AutomationError>;

    /// Move the pointer to an absolute logical position
    fn move_mouse(&self, to: Point) -> Result<(), AutomationError>;

    /// Click `button` `count` times at the current pointer position
    fn click(&self, button: MouseButton, count: u32) -> Result<(), AutomationError>;

    /// Send a single key event
    fn key(&self, key: Key, direction: KeyDirection) -> Result<(), AutomationError>;

    /// Type a run of text as-is
    fn text(&self, text: &str) -> Result<(), AutomationError>;
}

/// Launching, quitting and activating native applications
pub trait AppEngine: Send + Sync {
    /// Start `app_name`, or the executable/bundle at `path` when given.
    ///
    /// Returns the launched process when there is one worth tracking. On macOS
    /// the launch goes through `open`, which exits immediately, so `None`.
    fn launch(&self, app_name: &str, path: Option<&Path>) -> Result<Option<Child>, AutomationError>;

    /// Ask the OS to quit every instance of `app_name`
    fn quit(&self, app_name: &str) -> Result<(), AutomationError>;

    /// Bring `app_name` to the foreground
    fn activate(&self, app_name: &str) -> Result<(), AutomationError>;
}

pub fn create_screen_engine() -> Arc<dyn ScreenEngine> {
    Arc::new(capture::XcapScreenEngine::new())
}

pub fn create_input_engine() -> Arc<dyn InputEngine> {
    Arc::new(input::EnigoInputEngine::new())
}

/// Create the appropriate application engine for the current platform
pub fn create_app_engine() -> Arc<dyn AppEngine> {
    #[cfg(target_os = "macos")]
    {
        Arc::new(macos::MacOSAppEngine)
    }
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsAppEngine)
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        Arc::new(unsupported::UnsupportedAppEngine::new(std::env::consts::OS))
    }
}

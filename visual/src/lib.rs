//! Image-driven desktop automation
//!
//! This crate finds images on screen, clicks and types, and opens, closes and
//! focuses native applications. Screen capture, template matching and input
//! synthesis are delegated to `xcap`, `imageproc` and `enigo`; what lives here
//! is argument validation, logging and the macOS/Windows branching around them.
//!
//! Every façade method reports failure as `false` or `None` and logs the cause
//! through `tracing`; nothing panics on a missing image or an unsupported OS.
//!
//! ```rust,no_run
//! # async fn demo() {
//! use visual::Desktop;
//!
//! let desktop = Desktop::new();
//! let mut notepad = desktop.app("notepad");
//! if notepad.open(None) {
//!     desktop.keyboard().type_text("Hello, World!", None);
//!     if desktop.screen().click("save_button.png", None).await {
//!         println!("saved");
//!     }
//!     notepad.close();
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub mod app;
pub mod config;
pub mod errors;
pub mod keyboard;
pub mod keys;
pub mod matcher;
pub mod platforms;
pub mod screen;
#[cfg(test)]
mod tests;
pub mod utils;

pub use app::App;
pub use config::VisualConfig;
pub use errors::AutomationError;
pub use keyboard::Keyboard;
pub use keys::Key;
pub use matcher::MatchResult;
pub use screen::Screen;

/// A position in logical screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift by (`dx`, `dy`), stopping at the edges of the `i32` range.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// What a pointer action is aimed at: an image to look for, or a fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Image(PathBuf),
    Point(Point),
}

impl From<&str> for Target {
    fn from(path: &str) -> Self {
        Target::Image(PathBuf::from(path))
    }
}

impl From<String> for Target {
    fn from(path: String) -> Self {
        Target::Image(PathBuf::from(path))
    }
}

impl From<&Path> for Target {
    fn from(path: &Path) -> Self {
        Target::Image(path.to_path_buf())
    }
}

impl From<PathBuf> for Target {
    fn from(path: PathBuf) -> Self {
        Target::Image(path)
    }
}

impl From<&PathBuf> for Target {
    fn from(path: &PathBuf) -> Self {
        Target::Image(path.clone())
    }
}

impl From<Point> for Target {
    fn from(point: Point) -> Self {
        Target::Point(point)
    }
}

impl From<(i32, i32)> for Target {
    fn from(point: (i32, i32)) -> Self {
        Target::Point(point.into())
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Holds the screenshot data
#[derive(Debug, Clone)]
pub struct ScreenshotResult {
    /// Physical-pixel image of the monitor
    pub image: image::RgbaImage,
    /// Logical position of the monitor's top-left corner
    pub origin: Point,
    /// Physical pixels per logical point (2.0 on Retina displays)
    pub scale_factor: f32,
}

impl ScreenshotResult {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Map a pixel position in `image` to logical screen coordinates.
    pub fn to_screen(&self, px: u32, py: u32) -> Point {
        let scale = if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        Point::new(
            self.origin.x + (px as f32 / scale).round() as i32,
            self.origin.y + (py as f32 / scale).round() as i32,
        )
    }
}

/// The main entry point: owns the platform engines and hands out façades.
#[derive(Clone)]
pub struct Desktop {
    screen_engine: Arc<dyn platforms::ScreenEngine>,
    input_engine: Arc<dyn platforms::InputEngine>,
    app_engine: Arc<dyn platforms::AppEngine>,
    config: VisualConfig,
}

impl Desktop {
    /// Create a desktop with the default engines for the current platform.
    pub fn new() -> Self {
        Self::with_config(VisualConfig::default())
    }

    pub fn with_config(config: VisualConfig) -> Self {
        let start = Instant::now();
        let desktop = Self::with_engines(
            platforms::create_screen_engine(),
            platforms::create_input_engine(),
            platforms::create_app_engine(),
            config,
        );
        info!(
            duration_ms = start.elapsed().as_millis(),
            platform = std::env::consts::OS,
            "Desktop automation engines initialized"
        );
        desktop
    }

    /// Create a desktop around caller-supplied engines.
    pub fn with_engines(
        screen_engine: Arc<dyn platforms::ScreenEngine>,
        input_engine: Arc<dyn platforms::InputEngine>,
        app_engine: Arc<dyn platforms::AppEngine>,
        config: VisualConfig,
    ) -> Self {
        Self {
            screen_engine,
            input_engine,
            app_engine,
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        Screen::with_engines(
            self.screen_engine.clone(),
            self.input_engine.clone(),
            self.config.clone(),
        )
    }

    pub fn keyboard(&self) -> Keyboard {
        Keyboard::with_engine(self.input_engine.clone(), self.config.clone())
    }

    pub fn app(&self, name: &str) -> App {
        App::with_engine(name, self.app_engine.clone())
    }
}

impl Default for Desktop {
    fn default() -> Self {
        Self::new()
    }
}

/// Find `image` on the primary screen with the default engines.
pub async fn find(image: impl AsRef<Path>, confidence: Option<f64>) -> Option<Point> {
    Screen::new().find(image, confidence).await
}

/// Wait up to `timeout_secs` for `image` to appear on the primary screen.
pub async fn wait(
    image: impl AsRef<Path>,
    timeout_secs: Option<i64>,
    confidence: Option<f64>,
) -> Option<Point> {
    Screen::new().wait(image, timeout_secs, confidence).await
}

/// Left-click an image or a point.
pub async fn click(target: impl Into<Target>, confidence: Option<f64>) -> bool {
    Screen::new().click(target, confidence).await
}

/// Type `text` with the default keystroke interval.
pub fn type_text(text: &str) -> bool {
    Keyboard::new().type_text(text, None)
}

/// Install a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it more than once is harmless; only the first call installs.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

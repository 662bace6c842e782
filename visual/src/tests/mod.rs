mod keyboard_tests;

use image::{GrayImage, Luma, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::platforms::{AppEngine, InputEngine, KeyDirection, ScreenEngine};
use crate::{AutomationError, Key, MouseButton, Point, ScreenshotResult, VisualConfig};

// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()))
        .with_test_writer()
        .try_init();
}

/// Deterministic gray noise, so any crop of it occurs exactly once.
pub fn noise_screen(width: u32, height: u32, seed: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let mut h = x
            .wrapping_mul(374_761_393)
            .wrapping_add(y.wrapping_mul(668_265_263))
            .wrapping_add(seed.wrapping_mul(2_246_822_519));
        h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
        let v = ((h ^ (h >> 16)) & 0xff) as u8;
        Rgba([v, v, v, 255])
    })
}

/// Grayscale crop of `screen`, converted the same way the matcher converts screenshots.
pub fn crop_gray(screen: &RgbaImage, x: u32, y: u32, width: u32, height: u32) -> GrayImage {
    let gray = crate::matcher::to_gray(screen);
    image::imageops::crop_imm(&gray, x, y, width, height).to_image()
}

/// Plain white screen, like an empty document
pub fn white_screen(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

/// White label with a dark 3px bar across the middle, like a line of text.
pub fn text_label(width: u32, height: u32) -> GrayImage {
    let top = height / 2 - 1;
    GrayImage::from_fn(width, height, |x, y| {
        if (5..width - 5).contains(&x) && (top..top + 3).contains(&y) {
            Luma([20])
        } else {
            Luma([255])
        }
    })
}

/// Draw `image` onto `screen` with its top-left corner at (`x`, `y`).
pub fn paste(screen: &mut RgbaImage, image: &GrayImage, x: u32, y: u32) {
    for (dx, dy, pixel) in image.enumerate_pixels() {
        let v = pixel[0];
        screen.put_pixel(x + dx, y + dy, Rgba([v, v, v, 255]));
    }
}

/// 2px black/white checkerboard
pub fn checkerboard(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if (x / 2 + y / 2) % 2 == 0 {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}

/// Write `image` as a PNG in `dir` and return its path.
pub fn save_png(dir: &Path, name: &str, image: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

/// Plays back a fixed sequence of frames; the last one repeats forever.
pub struct FakeScreen {
    frames: Vec<RgbaImage>,
    captures: AtomicUsize,
    fail: bool,
}

impl FakeScreen {
    pub fn new(frames: Vec<RgbaImage>) -> Self {
        assert!(!frames.is_empty());
        Self {
            frames,
            captures: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            frames: vec![RgbaImage::new(1, 1)],
            captures: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ScreenEngine for FakeScreen {
    async fn capture_screen(&self) -> Result<ScreenshotResult, AutomationError> {
        let n = self.captures.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AutomationError::Capture("no display".to_string()));
        }
        let frame = &self.frames[n.min(self.frames.len() - 1)];
        Ok(ScreenshotResult {
            image: frame.clone(),
            origin: Point::new(0, 0),
            scale_factor: 1.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Move(Point),
    Click(MouseButton, u32),
    Key(Key, KeyDirection),
    Text(String),
}

/// Records input instead of sending it.
pub struct RecordingInput {
    events: Mutex<Vec<InputEvent>>,
    position: Mutex<Point>,
    fail_on: Option<(Key, KeyDirection)>,
}

impl RecordingInput {
    pub fn new() -> Self {
        Self::at(Point::new(0, 0))
    }

    pub fn at(position: Point) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            position: Mutex::new(position),
            fail_on: None,
        }
    }

    pub fn failing_on(key: Key, direction: KeyDirection) -> Self {
        Self {
            fail_on: Some((key, direction)),
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: InputEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl InputEngine for RecordingInput {
    fn mouse_position(&self) -> Result<Point, AutomationError> {
        Ok(*self.position.lock().unwrap())
    }

    fn move_mouse(&self, to: Point) -> Result<(), AutomationError> {
        *self.position.lock().unwrap() = to;
        self.record(InputEvent::Move(to));
        Ok(())
    }

    fn click(&self, button: MouseButton, count: u32) -> Result<(), AutomationError> {
        self.record(InputEvent::Click(button, count));
        Ok(())
    }

    fn key(&self, key: Key, direction: KeyDirection) -> Result<(), AutomationError> {
        if self.fail_on == Some((key, direction)) {
            return Err(AutomationError::Input(format!("{} is stuck", key)));
        }
        self.record(InputEvent::Key(key, direction));
        Ok(())
    }

    fn text(&self, text: &str) -> Result<(), AutomationError> {
        self.record(InputEvent::Text(text.to_string()));
        Ok(())
    }
}

/// Records application calls; launches succeed without a process.
#[derive(Default)]
pub struct RecordingApps {
    calls: Mutex<Vec<String>>,
}

impl RecordingApps {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl AppEngine for RecordingApps {
    fn launch(&self, app_name: &str, path: Option<&Path>) -> Result<Option<Child>, AutomationError> {
        let call = match path {
            Some(path) => format!("launch {} {}", app_name, path.display()),
            None => format!("launch {}", app_name),
        };
        self.calls.lock().unwrap().push(call);
        Ok(None)
    }

    fn quit(&self, app_name: &str) -> Result<(), AutomationError> {
        self.calls.lock().unwrap().push(format!("quit {}", app_name));
        Ok(())
    }

    fn activate(&self, app_name: &str) -> Result<(), AutomationError> {
        self.calls.lock().unwrap().push(format!("activate {}", app_name));
        Ok(())
    }
}

/// Config with no pacing delays
pub fn fast_config() -> VisualConfig {
    VisualConfig {
        type_interval_ms: 0,
        click_settle_ms: 0,
        highlight_duration_ms: 0,
        ..VisualConfig::default()
    }
}

pub fn screen_with(
    screen: Arc<FakeScreen>,
    input: Arc<RecordingInput>,
) -> crate::Screen {
    crate::Screen::with_engines(screen, input, fast_config())
}

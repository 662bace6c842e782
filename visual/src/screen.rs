//! Finding images on screen and pointing at them.

use image::GrayImage;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, instrument};

use crate::matcher::{self, MatchResult};
use crate::platforms::{self, InputEngine, ScreenEngine};
use crate::utils::{resolve_image_path, validate_confidence, validate_timeout};
use crate::{AutomationError, MouseButton, Point, ScreenshotResult, Target, VisualConfig};

/// Step between pointer positions while tracing a highlight
const HIGHLIGHT_STEP: Duration = Duration::from_millis(10);

/// How long each presence check in the observer loops may wait for the image
const OBSERVE_CHECK_SECS: i64 = 1;

/// Image search and mouse actions on the primary screen.
///
/// Methods report failure as `None` / `false` and log the reason; errors from
/// the capture or input engines never escape.
#[derive(Clone)]
pub struct Screen {
    screen_engine: Arc<dyn ScreenEngine>,
    input_engine: Arc<dyn InputEngine>,
    config: VisualConfig,
}

impl Screen {
    /// Screen backed by the default engines and configuration
    pub fn new() -> Self {
        Self::with_engines(
            platforms::create_screen_engine(),
            platforms::create_input_engine(),
            VisualConfig::default(),
        )
    }

    pub fn with_engines(
        screen_engine: Arc<dyn ScreenEngine>,
        input_engine: Arc<dyn InputEngine>,
        config: VisualConfig,
    ) -> Self {
        Self {
            screen_engine,
            input_engine,
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &VisualConfig {
        &self.config
    }

    fn confidence(&self, confidence: Option<f64>) -> f64 {
        let fallback = self.config.default_confidence;
        validate_confidence(confidence.unwrap_or(fallback), fallback)
    }

    /// Capture the primary monitor.
    pub async fn capture(&self) -> Result<ScreenshotResult, AutomationError> {
        let start = std::time::Instant::now();
        let screenshot = self.screen_engine.capture_screen().await?;
        debug!(
            duration_ms = start.elapsed().as_millis(),
            width = screenshot.width(),
            height = screenshot.height(),
            "Screen captured"
        );
        Ok(screenshot)
    }

    /// Find an image on screen and return the full match.
    #[instrument(level = "debug", skip_all, fields(image = %image.as_ref().display()))]
    pub async fn find_match(
        &self,
        image: impl AsRef<Path>,
        confidence: Option<f64>,
    ) -> Option<MatchResult> {
        let confidence = self.confidence(confidence);
        let template = self.prepare(image.as_ref())?;
        match self.locate_once(&template, confidence).await {
            Ok(Some(found)) => {
                debug!(
                    x = found.center.x,
                    y = found.center.y,
                    score = found.score,
                    "Found image at coordinates: {}",
                    found.center
                );
                Some(found)
            }
            Ok(None) => {
                debug!("Image not found: {}", image.as_ref().display());
                None
            }
            Err(e) => {
                error!("Error finding image: {}", e);
                None
            }
        }
    }

    /// Find an image on screen and return the centre of the match.
    pub async fn find(&self, image: impl AsRef<Path>, confidence: Option<f64>) -> Option<Point> {
        self.find_match(image, confidence)
            .await
            .map(|found| found.center)
    }

    /// Wait for an image to appear on screen.
    ///
    /// `timeout_secs` of `0` scans once, `-1` waits indefinitely; values below
    /// `-1` are treated as `-1`.
    #[instrument(level = "debug", skip_all, fields(image = %image.as_ref().display()))]
    pub async fn wait(
        &self,
        image: impl AsRef<Path>,
        timeout_secs: Option<i64>,
        confidence: Option<f64>,
    ) -> Option<Point> {
        let confidence = self.confidence(confidence);
        let timeout = validate_timeout(timeout_secs.unwrap_or(self.config.default_timeout_secs));
        let template = self.prepare(image.as_ref())?;

        match self.poll(&template, timeout, confidence).await {
            Ok(Some(found)) => {
                debug!("Found image at coordinates: {}", found.center);
                Some(found.center)
            }
            Ok(None) => {
                debug!("Image not found after waiting {} seconds", timeout);
                None
            }
            Err(e) => {
                error!("Error waiting for image: {}", e);
                None
            }
        }
    }

    /// Check whether an image shows up within `timeout_secs` (fractions are truncated).
    pub async fn exists(
        &self,
        image: impl AsRef<Path>,
        timeout_secs: Option<f64>,
        confidence: Option<f64>,
    ) -> bool {
        let timeout = timeout_secs.unwrap_or(self.config.exists_timeout_secs);
        let found = self
            .wait(image.as_ref(), Some(seconds_to_timeout(timeout)), confidence)
            .await
            .is_some();
        debug!("Image exists on screen: {} - {}", image.as_ref().display(), found);
        found
    }

    /// Left-click an image or a point.
    pub async fn click(&self, target: impl Into<Target>, confidence: Option<f64>) -> bool {
        self.click_target(target.into(), confidence, MouseButton::Left, 1, "Click")
            .await
    }

    pub async fn double_click(&self, target: impl Into<Target>, confidence: Option<f64>) -> bool {
        self.click_target(target.into(), confidence, MouseButton::Left, 2, "Double click")
            .await
    }

    pub async fn right_click(&self, target: impl Into<Target>, confidence: Option<f64>) -> bool {
        self.click_target(target.into(), confidence, MouseButton::Right, 1, "Right click")
            .await
    }

    #[instrument(level = "debug", skip(self, confidence))]
    async fn click_target(
        &self,
        target: Target,
        confidence: Option<f64>,
        button: MouseButton,
        count: u32,
        action: &'static str,
    ) -> bool {
        let location = match &target {
            Target::Image(path) => match self.find(path, confidence).await {
                Some(location) => location,
                None => {
                    debug!("{} failed: image not found", action);
                    return false;
                }
            },
            Target::Point(point) => *point,
        };

        match self.press_at(location, button, count).await {
            Ok(()) => {
                match target {
                    Target::Image(_) => debug!("{} on image at: {}", action, location),
                    Target::Point(_) => debug!("{} at coordinates: {}", action, location),
                }
                true
            }
            Err(e) => {
                error!("Error during {} operation: {}", action.to_lowercase(), e);
                false
            }
        }
    }

    async fn press_at(
        &self,
        location: Point,
        button: MouseButton,
        count: u32,
    ) -> Result<(), AutomationError> {
        self.input_engine.move_mouse(location)?;
        let settle = self.config.click_settle();
        if !settle.is_zero() {
            sleep(settle).await;
        }
        self.input_engine.click(button, count)
    }

    /// Trace a box around the target with the mouse pointer, then put the pointer back.
    ///
    /// Each edge takes a quarter of `duration`.
    #[instrument(level = "debug", skip(self, target, confidence))]
    pub async fn highlight(
        &self,
        target: impl Into<Target>,
        duration: Option<Duration>,
        confidence: Option<f64>,
    ) -> bool {
        let location = match target.into() {
            Target::Image(path) => match self.find(&path, confidence).await {
                Some(location) => location,
                None => {
                    debug!("Highlight failed: image not found");
                    return false;
                }
            },
            Target::Point(point) => point,
        };
        let duration = duration.unwrap_or_else(|| self.config.highlight_duration());

        match self.trace_box(location, duration).await {
            Ok(()) => {
                debug!("Highlighted region at: {}", location);
                true
            }
            Err(e) => {
                error!("Error during highlight operation: {}", e);
                false
            }
        }
    }

    async fn trace_box(&self, center: Point, duration: Duration) -> Result<(), AutomationError> {
        let half = self.config.highlight_box_size / 2;
        let corners = [
            center.offset(-half, -half),
            center.offset(half, -half),
            center.offset(half, half),
            center.offset(-half, half),
            center.offset(-half, -half),
        ];

        let original = self.input_engine.mouse_position()?;
        let traced = self.trace_path(&corners, duration / 4).await;
        let restored = self.input_engine.move_mouse(original);
        traced.and(restored)
    }

    async fn trace_path(&self, corners: &[Point], per_edge: Duration) -> Result<(), AutomationError> {
        let Some((&first, rest)) = corners.split_first() else {
            return Ok(());
        };
        self.input_engine.move_mouse(first)?;

        let steps = (per_edge.as_millis() / HIGHLIGHT_STEP.as_millis()).max(1) as i32;
        let mut from = first;
        for &to in rest {
            for step in 1..=steps {
                let x = lerp(from.x, to.x, step, steps);
                let y = lerp(from.y, to.y, step, steps);
                self.input_engine.move_mouse(Point::new(x, y))?;
                if steps > 1 {
                    sleep(per_edge / steps as u32).await;
                }
            }
            from = to;
        }
        Ok(())
    }

    /// Call `handler` once when the image appears. Returns whether it was called.
    ///
    /// A positive `timeout_secs` bounds the observation; zero or negative
    /// observes until the image appears.
    #[instrument(
        level = "debug",
        skip(self, image, handler, confidence),
        fields(image = %image.as_ref().display())
    )]
    pub async fn on_appears<F: FnOnce()>(
        &self,
        image: impl AsRef<Path>,
        handler: F,
        timeout_secs: i64,
        confidence: Option<f64>,
    ) -> bool {
        let start = Instant::now();
        let confidence = self.confidence(confidence);
        let Some(template) = self.prepare(image.as_ref()) else {
            return false;
        };
        self.observe(
            image.as_ref(),
            &template,
            handler,
            timeout_secs,
            confidence,
            start,
            false,
            "onAppears",
        )
        .await
    }

    /// Call `handler` once when the image is no longer on screen.
    #[instrument(
        level = "debug",
        skip(self, image, handler, confidence),
        fields(image = %image.as_ref().display())
    )]
    pub async fn on_vanish<F: FnOnce()>(
        &self,
        image: impl AsRef<Path>,
        handler: F,
        timeout_secs: i64,
        confidence: Option<f64>,
    ) -> bool {
        let start = Instant::now();
        let confidence = self.confidence(confidence);
        let Some(template) = self.prepare(image.as_ref()) else {
            return false;
        };
        self.observe(
            image.as_ref(),
            &template,
            handler,
            timeout_secs,
            confidence,
            start,
            true,
            "onVanish",
        )
        .await
    }

    /// Call `handler` once when the image's presence differs from what it was at the start.
    #[instrument(
        level = "debug",
        skip(self, image, handler, confidence),
        fields(image = %image.as_ref().display())
    )]
    pub async fn on_change<F: FnOnce()>(
        &self,
        image: impl AsRef<Path>,
        handler: F,
        timeout_secs: i64,
        confidence: Option<f64>,
    ) -> bool {
        let start = Instant::now();
        let confidence = self.confidence(confidence);
        let Some(template) = self.prepare(image.as_ref()) else {
            return false;
        };
        let initial = match self.present(&template, confidence).await {
            Ok(present) => present,
            Err(e) => {
                error!("Error in onChange: {}", e);
                return false;
            }
        };
        self.observe(
            image.as_ref(),
            &template,
            handler,
            timeout_secs,
            confidence,
            start,
            initial,
            "onChange",
        )
        .await
    }

    /// Check presence until it differs from `baseline`, then call `handler`.
    #[allow(clippy::too_many_arguments)]
    async fn observe<F: FnOnce()>(
        &self,
        image: &Path,
        template: &GrayImage,
        handler: F,
        timeout_secs: i64,
        confidence: f64,
        start: Instant,
        baseline: bool,
        name: &str,
    ) -> bool {
        let timeout = validate_timeout(timeout_secs);
        // A deadline past what Instant can represent is no deadline at all
        let deadline = if timeout > 0 {
            start.checked_add(Duration::from_secs(timeout as u64))
        } else {
            None
        };

        loop {
            if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                debug!("{} timeout reached for: {}", name, image.display());
                return false;
            }

            match self.present(template, confidence).await {
                Ok(present) if present != baseline => {
                    debug!("{} condition met, calling handler: {}", name, image.display());
                    handler();
                    info!(
                        duration_ms = start.elapsed().as_millis(),
                        "{} handler called", name
                    );
                    return true;
                }
                Ok(_) => {}
                Err(e) => {
                    error!("Error in {}: {}", name, e);
                    return false;
                }
            }

            sleep(self.config.observe_interval()).await;
        }
    }

    /// Resolve and decode an image, logging why it is unusable.
    fn prepare(&self, image: &Path) -> Option<GrayImage> {
        let path = match resolve_image_path(image) {
            Ok(path) => path,
            Err(e) => {
                error!("{}", e);
                return None;
            }
        };
        match matcher::load_template(&path) {
            Ok(template) => Some(template),
            Err(e) => {
                error!("{}", e);
                None
            }
        }
    }

    async fn locate_once(
        &self,
        template: &GrayImage,
        confidence: f64,
    ) -> Result<Option<MatchResult>, AutomationError> {
        let screenshot = self.capture().await?;
        Ok(matcher::locate(&screenshot, template, confidence))
    }

    async fn present(&self, template: &GrayImage, confidence: f64) -> Result<bool, AutomationError> {
        Ok(self
            .poll(template, OBSERVE_CHECK_SECS, confidence)
            .await?
            .is_some())
    }

    /// Scan until the template is found or `timeout` seconds pass (-1: no deadline).
    async fn poll(
        &self,
        template: &GrayImage,
        timeout: i64,
        confidence: f64,
    ) -> Result<Option<MatchResult>, AutomationError> {
        let deadline = if timeout >= 0 {
            Instant::now().checked_add(Duration::from_secs(timeout as u64))
        } else {
            None
        };

        loop {
            if let Some(found) = self.locate_once(template, confidence).await? {
                return Ok(Some(found));
            }

            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(None);
                    }
                    self.config.wait_interval().min(deadline - now)
                }
                None => self.config.wait_interval(),
            };
            sleep(pause).await;
        }
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// The point `step / steps` of the way from `from` to `to`, computed without overflow.
fn lerp(from: i32, to: i32, step: i32, steps: i32) -> i32 {
    let (from, to) = (i64::from(from), i64::from(to));
    let value = from + (to - from) * i64::from(step) / i64::from(steps);
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Whole seconds of a fractional timeout; NaN becomes a single scan.
fn seconds_to_timeout(secs: f64) -> i64 {
    if secs.is_nan() {
        0
    } else {
        // `as` saturates at the i64 bounds
        secs.trunc() as i64
    }
}

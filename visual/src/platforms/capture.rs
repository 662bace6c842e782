//! Primary-monitor screenshots using xcap

use crate::platforms::ScreenEngine;
use crate::{AutomationError, Point, ScreenshotResult};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct XcapScreenEngine;

impl XcapScreenEngine {
    pub fn new() -> Self {
        Self
    }

    fn capture_primary() -> Result<ScreenshotResult, AutomationError> {
        let monitors = xcap::Monitor::all()
            .map_err(|e| AutomationError::Capture(format!("Failed to get monitors: {}", e)))?;

        let mut primary_monitor: Option<xcap::Monitor> = None;
        for monitor in monitors {
            match monitor.is_primary() {
                Ok(true) => {
                    primary_monitor = Some(monitor);
                    break;
                }
                Ok(false) => continue,
                Err(e) => {
                    return Err(AutomationError::Capture(format!(
                        "Error checking monitor primary status: {}",
                        e
                    )));
                }
            }
        }
        let primary_monitor = primary_monitor
            .ok_or_else(|| AutomationError::Capture("Could not find primary monitor".to_string()))?;

        let origin = Point::new(
            primary_monitor.x().unwrap_or(0),
            primary_monitor.y().unwrap_or(0),
        );
        let scale_factor = primary_monitor.scale_factor().unwrap_or(1.0);

        let image = primary_monitor
            .capture_image()
            .map_err(|e| AutomationError::Capture(format!("Failed to capture screen: {}", e)))?;

        debug!(
            width = image.width(),
            height = image.height(),
            scale_factor,
            "Captured primary monitor"
        );

        Ok(ScreenshotResult {
            image,
            origin,
            scale_factor,
        })
    }
}

#[async_trait::async_trait]
impl ScreenEngine for XcapScreenEngine {
    async fn capture_screen(&self) -> Result<ScreenshotResult, AutomationError> {
        tokio::task::spawn_blocking(Self::capture_primary)
            .await
            .map_err(|e| AutomationError::Capture(format!("Capture task failed: {}", e)))?
    }
}

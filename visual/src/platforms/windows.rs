use crate::platforms::commands;
use crate::platforms::AppEngine;
use crate::AutomationError;
use std::path::Path;
use std::process::Child;
use tracing::{debug, error, info};

use ::windows::core::{HSTRING, PCWSTR};
use ::windows::Win32::UI::WindowsAndMessaging::{FindWindowW, SetForegroundWindow};

/// Drives applications by spawning them, `taskkill`, and the Win32 window API.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsAppEngine;

impl AppEngine for WindowsAppEngine {
    fn launch(&self, app_name: &str, path: Option<&Path>) -> Result<Option<Child>, AutomationError> {
        let command = commands::windows_open(app_name, path);
        debug!(?command, "Spawning application");
        let child = command.to_command().spawn().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to start '{}': {}", app_name, e))
        })?;
        info!(pid = child.id(), "Application process started");
        Ok(Some(child))
    }

    fn quit(&self, app_name: &str) -> Result<(), AutomationError> {
        let command = commands::windows_quit(app_name);
        let output = command.to_command().output().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to run taskkill: {}", e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(
                "taskkill for '{}' failed. Stderr: {}",
                app_name,
                stderr.trim()
            );
            return Err(AutomationError::PlatformError(format!(
                "taskkill for '{}' failed: {}",
                app_name,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn activate(&self, app_name: &str) -> Result<(), AutomationError> {
        let title = HSTRING::from(app_name);
        // Top-level window whose title is exactly the app name
        let hwnd = unsafe { FindWindowW(PCWSTR::null(), &title) }.map_err(|_| {
            AutomationError::PlatformError(format!("No window titled '{}'", app_name))
        })?;
        if hwnd.is_invalid() {
            return Err(AutomationError::PlatformError(format!(
                "No window titled '{}'",
                app_name
            )));
        }

        if unsafe { SetForegroundWindow(hwnd) }.as_bool() {
            Ok(())
        } else {
            Err(AutomationError::PlatformError(format!(
                "Failed to bring '{}' to the foreground",
                app_name
            )))
        }
    }
}

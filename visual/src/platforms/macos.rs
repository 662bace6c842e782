use crate::platforms::commands::{self, CommandLine};
use crate::platforms::AppEngine;
use crate::AutomationError;
use std::path::Path;
use std::process::Child;
use tracing::{debug, error};

/// Drives applications through `open` and AppleScript.
#[derive(Debug, Default, Clone, Copy)]
pub struct MacOSAppEngine;

impl MacOSAppEngine {
    fn run(&self, command: &CommandLine, what: &str) -> Result<(), AutomationError> {
        debug!(?command, "Running {}", what);
        let output = command.to_command().output().map_err(|e| {
            AutomationError::PlatformError(format!("Failed to run {}: {}", what, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("{} failed. Stderr: {}", what, stderr.trim());
            return Err(AutomationError::PlatformError(format!(
                "{} failed: {}",
                what,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl AppEngine for MacOSAppEngine {
    fn launch(&self, app_name: &str, path: Option<&Path>) -> Result<Option<Child>, AutomationError> {
        // `open` hands the launch to LaunchServices and exits; there is no
        // child to keep, so closing goes through `quit app`.
        self.run(&commands::macos_open(app_name, path), "open")?;
        Ok(None)
    }

    fn quit(&self, app_name: &str) -> Result<(), AutomationError> {
        self.run(&commands::macos_quit(app_name), "osascript quit")
    }

    fn activate(&self, app_name: &str) -> Result<(), AutomationError> {
        self.run(&commands::macos_activate(app_name), "osascript activate")
    }
}

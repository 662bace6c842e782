use crate::platforms::AppEngine;
use crate::AutomationError;
use std::path::Path;
use std::process::Child;

/// Application engine for platforms without app control.
///
/// Every operation fails with `UnsupportedPlatform`.
#[derive(Debug, Clone)]
pub struct UnsupportedAppEngine {
    platform: String,
}

impl UnsupportedAppEngine {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
        }
    }

    fn unsupported(&self, operation: &str) -> AutomationError {
        AutomationError::UnsupportedPlatform(format!(
            "{} is not supported on {}",
            operation, self.platform
        ))
    }
}

impl AppEngine for UnsupportedAppEngine {
    fn launch(&self, _app_name: &str, _path: Option<&Path>) -> Result<Option<Child>, AutomationError> {
        Err(self.unsupported("opening applications"))
    }

    fn quit(&self, _app_name: &str) -> Result<(), AutomationError> {
        Err(self.unsupported("closing applications"))
    }

    fn activate(&self, _app_name: &str) -> Result<(), AutomationError> {
        Err(self.unsupported("focusing applications"))
    }
}

use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, error, instrument, warn};

use crate::keys::parse_keys;
use crate::platforms::{self, InputEngine, KeyDirection};
use crate::{AutomationError, Key, VisualConfig};

/// Keyboard input: typing text, single keys and key combinations.
#[derive(Clone)]
pub struct Keyboard {
    input_engine: Arc<dyn InputEngine>,
    config: VisualConfig,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::with_engine(platforms::create_input_engine(), VisualConfig::default())
    }

    pub fn with_engine(input_engine: Arc<dyn InputEngine>, config: VisualConfig) -> Self {
        Self {
            input_engine,
            config: config.validated(),
        }
    }

    /// Type text, pausing `interval` between keystrokes (default from config).
    ///
    /// This blocks the calling thread for the whole text. On a multi-threaded
    /// tokio runtime the worker hands its other tasks off first; on a
    /// current-thread runtime, run it through `spawn_blocking` to keep the
    /// runtime responsive.
    #[instrument(level = "debug", skip(self, text), fields(chars = text.chars().count()))]
    pub fn type_text(&self, text: &str, interval: Option<Duration>) -> bool {
        let interval = interval.unwrap_or_else(|| self.config.type_interval());
        let on_worker = Handle::try_current()
            .map(|handle| handle.runtime_flavor() == RuntimeFlavor::MultiThread)
            .unwrap_or(false);
        let result = if on_worker && !interval.is_zero() {
            tokio::task::block_in_place(|| self.write(text, interval))
        } else {
            self.write(text, interval)
        };
        match result {
            Ok(()) => {
                debug!("Typed {} characters", text.chars().count());
                true
            }
            Err(e) => {
                error!("Error typing text: {}", e);
                false
            }
        }
    }

    fn write(&self, text: &str, interval: Duration) -> Result<(), AutomationError> {
        if interval.is_zero() {
            return self.input_engine.text(text);
        }

        let mut buf = [0u8; 4];
        for (i, c) in text.chars().enumerate() {
            if i > 0 {
                thread::sleep(interval);
            }
            self.input_engine.text(c.encode_utf8(&mut buf))?;
        }
        Ok(())
    }

    /// Press keys together: down in order, up in reverse (e.g. `["ctrl", "shift", "s"]`).
    ///
    /// Every name is checked before anything is pressed.
    #[instrument(level = "debug", skip(self))]
    pub fn hotkey(&self, keys: &[&str]) -> bool {
        if keys.is_empty() {
            warn!("Hotkey called without keys");
            return false;
        }
        let keys = match parse_keys(keys) {
            Ok(keys) => keys,
            Err(e) => {
                error!("Error during hotkey: {}", e);
                return false;
            }
        };

        match self.chord(&keys) {
            Ok(()) => {
                debug!(?keys, "Hotkey sent");
                true
            }
            Err(e) => {
                error!("Error during hotkey: {}", e);
                false
            }
        }
    }

    fn chord(&self, keys: &[Key]) -> Result<(), AutomationError> {
        let mut pressed = Vec::with_capacity(keys.len());
        let mut result = Ok(());
        for &key in keys {
            if let Err(e) = self.input_engine.key(key, KeyDirection::Press) {
                result = Err(e);
                break;
            }
            pressed.push(key);
        }

        // Release whatever went down, even after a failure, so no modifier sticks
        for &key in pressed.iter().rev() {
            let released = self.input_engine.key(key, KeyDirection::Release);
            if result.is_ok() {
                result = released;
            }
        }
        result
    }

    /// Press and release a single named key.
    #[instrument(level = "debug", skip(self))]
    pub fn press(&self, key: &str) -> bool {
        let result = key
            .parse::<Key>()
            .and_then(|parsed| self.input_engine.key(parsed, KeyDirection::Click));
        match result {
            Ok(()) => {
                debug!("Pressed key: {}", key);
                true
            }
            Err(e) => {
                error!("Error pressing key: {}", e);
                false
            }
        }
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}

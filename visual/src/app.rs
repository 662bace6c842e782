use std::path::Path;
use std::process::Child;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::platforms::{self, AppEngine};
use crate::AutomationError;

/// A native application, addressed by name.
///
/// On Windows every process started by [`App::open`] is kept, and
/// [`App::close`] terminates them directly; otherwise closing asks the OS to
/// quit the app by name.
pub struct App {
    name: String,
    engine: Arc<dyn AppEngine>,
    processes: Vec<Child>,
}

impl App {
    /// App driven by the engine for the current platform
    pub fn new(name: &str) -> Self {
        Self::with_engine(name, platforms::create_app_engine())
    }

    pub fn with_engine(name: &str, engine: Arc<dyn AppEngine>) -> Self {
        Self {
            name: name.to_string(),
            engine,
            processes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process id of the most recently launched process, when one is being tracked
    pub fn pid(&self) -> Option<u32> {
        self.processes.last().map(Child::id)
    }

    /// Process ids of every tracked process, oldest first
    pub fn pids(&self) -> Vec<u32> {
        self.processes.iter().map(Child::id).collect()
    }

    /// Open the application, or the bundle/executable at `path`.
    #[instrument(skip(self), fields(app_name = %self.name))]
    pub fn open(&mut self, path: Option<&Path>) -> bool {
        let start = Instant::now();
        info!("Opening application");

        match self.engine.launch(&self.name, path) {
            Ok(process) => {
                if let Some(process) = process {
                    if !self.processes.is_empty() {
                        debug!(
                            tracked = self.processes.len(),
                            "Opening another instance; close will stop all of them"
                        );
                    }
                    self.processes.push(process);
                }
                info!(
                    duration_ms = start.elapsed().as_millis(),
                    pid = ?self.pid(),
                    "Application opened"
                );
                true
            }
            Err(e) => {
                error!("Error opening application '{}': {}", self.name, e);
                false
            }
        }
    }

    /// Close the application.
    #[instrument(skip(self), fields(app_name = %self.name))]
    pub fn close(&mut self) -> bool {
        let result = if self.processes.is_empty() {
            self.engine.quit(&self.name)
        } else {
            self.terminate_all()
        };
        match result {
            Ok(()) => {
                info!("Application closed");
                true
            }
            Err(e) => {
                error!("Error closing application '{}': {}", self.name, e);
                false
            }
        }
    }

    /// Kill and reap every tracked process; keeps going past failures and
    /// reports the first one.
    fn terminate_all(&mut self) -> Result<(), AutomationError> {
        let mut result = Ok(());
        let mut quit_by_name = false;
        for child in std::mem::take(&mut self.processes) {
            match Self::terminate(child) {
                Ok(true) => {}
                Ok(false) => quit_by_name = true,
                Err(e) => {
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        }
        if quit_by_name {
            // A launcher exited on its own (e.g. it handed off to another
            // process), so the app has to be closed by name.
            let quit = self.engine.quit(&self.name);
            if result.is_ok() {
                result = quit;
            }
        }
        result
    }

    /// Kill `child` and wait for it. `Ok(false)` if it had already exited.
    fn terminate(mut child: Child) -> Result<bool, AutomationError> {
        if let Some(status) = child.try_wait()? {
            warn!(?status, pid = child.id(), "Launched process already exited");
            return Ok(false);
        }
        child.kill()?;
        let status = child.wait()?;
        debug!(?status, pid = child.id(), "Terminated application process");
        Ok(true)
    }

    /// Bring the application to the front.
    #[instrument(skip(self), fields(app_name = %self.name))]
    pub fn focus(&self) -> bool {
        match self.engine.activate(&self.name) {
            Ok(()) => {
                info!("Application focused");
                true
            }
            Err(e) => {
                error!("Error focusing application '{}': {}", self.name, e);
                false
            }
        }
    }
}

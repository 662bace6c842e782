//! Cross-platform mouse and keyboard input using enigo

use enigo::{
    Button, Coordinate, Direction, Enigo, Key as EnigoKey, Keyboard as _, Mouse as _, Settings,
};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::debug;

use crate::platforms::{InputEngine, KeyDirection};
use crate::{AutomationError, Key, MouseButton, Point};

/// Gap between the presses of a multi-click
const MULTI_CLICK_GAP: Duration = Duration::from_millis(30);

type Job<C> = Box<dyn FnOnce(&mut C) + Send>;
type Connect<C> = Arc<dyn Fn() -> Result<C, AutomationError> + Send + Sync>;

/// A single long-lived connection owned by a dedicated thread.
///
/// Jobs run one after another against the same connection, so state the
/// connection keeps between calls (held keys in particular) survives. The
/// thread is started on first use and again after it dies; it exits, dropping
/// the connection, once the owner is dropped.
struct ConnectionThread<C> {
    connect: Connect<C>,
    jobs: Mutex<Option<mpsc::Sender<Job<C>>>>,
}

impl<C: 'static> ConnectionThread<C> {
    fn new(connect: impl Fn() -> Result<C, AutomationError> + Send + Sync + 'static) -> Self {
        Self {
            connect: Arc::new(connect),
            jobs: Mutex::new(None),
        }
    }

    fn run<T, F>(&self, job: F) -> Result<T, AutomationError>
    where
        T: Send + 'static,
        F: FnOnce(&mut C) -> Result<T, AutomationError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = mpsc::channel();
        let job: Job<C> = Box::new(move |conn| {
            let _ = reply_tx.send(job(conn));
        });

        {
            let mut jobs = self
                .jobs
                .lock()
                .map_err(|_| AutomationError::Input("input thread lock poisoned".to_string()))?;
            if jobs.is_none() {
                *jobs = Some(self.spawn()?);
            }
            let sent = jobs.as_ref().map(|tx| tx.send(job).is_ok());
            if sent != Some(true) {
                *jobs = None;
                return Err(AutomationError::Input("input thread is gone".to_string()));
            }
        }

        reply_rx
            .recv()
            .map_err(|_| AutomationError::Input("input thread stopped mid-call".to_string()))?
    }

    fn spawn(&self) -> Result<mpsc::Sender<Job<C>>, AutomationError> {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Job<C>>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let connect = self.connect.clone();

        thread::Builder::new()
            .name("visual-input".to_string())
            .spawn(move || {
                let mut conn = match connect() {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                for job in jobs_rx {
                    job(&mut conn);
                }
                debug!("Input thread shutting down");
            })?;

        ready_rx
            .recv()
            .map_err(|_| AutomationError::Input("input thread exited during startup".to_string()))??;
        debug!("Input thread started");
        Ok(jobs_tx)
    }
}

/// Input engine backed by enigo.
///
/// One `Enigo` lives on a background thread for the engine's lifetime, so a
/// key pressed by one call is still down for the next. It is created lazily,
/// which keeps constructing the engine cheap on machines without a display.
pub struct EnigoInputEngine {
    connection: ConnectionThread<Enigo>,
}

impl EnigoInputEngine {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            connection: ConnectionThread::new(move || {
                Enigo::new(&settings).map_err(|e| {
                    AutomationError::Input(format!("Failed to create input controller: {:?}", e))
                })
            }),
        }
    }
}

impl Default for EnigoInputEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEngine for EnigoInputEngine {
    fn mouse_position(&self) -> Result<Point, AutomationError> {
        self.connection.run(|enigo| {
            let (x, y) = enigo.location().map_err(|e| {
                AutomationError::Input(format!("Failed to read mouse location: {:?}", e))
            })?;
            Ok(Point::new(x, y))
        })
    }

    fn move_mouse(&self, to: Point) -> Result<(), AutomationError> {
        self.connection.run(move |enigo| {
            enigo
                .move_mouse(to.x, to.y, Coordinate::Abs)
                .map_err(|e| AutomationError::Input(format!("Failed to move mouse: {:?}", e)))
        })
    }

    fn click(&self, button: MouseButton, count: u32) -> Result<(), AutomationError> {
        let btn = to_enigo_button(button);
        self.connection.run(move |enigo| {
            for i in 0..count {
                if i > 0 {
                    thread::sleep(MULTI_CLICK_GAP);
                }
                enigo
                    .button(btn, Direction::Click)
                    .map_err(|e| AutomationError::Input(format!("Failed to click: {:?}", e)))?;
            }
            Ok(())
        })
    }

    fn key(&self, key: Key, direction: KeyDirection) -> Result<(), AutomationError> {
        let direction = match direction {
            KeyDirection::Press => Direction::Press,
            KeyDirection::Release => Direction::Release,
            KeyDirection::Click => Direction::Click,
        };
        self.connection.run(move |enigo| {
            enigo
                .key(to_enigo_key(key), direction)
                .map_err(|e| AutomationError::Input(format!("Failed to send key {}: {:?}", key, e)))
        })
    }

    fn text(&self, text: &str) -> Result<(), AutomationError> {
        let text = text.to_string();
        self.connection.run(move |enigo| {
            enigo
                .text(&text)
                .map_err(|e| AutomationError::Input(format!("Failed to type text: {:?}", e)))
        })
    }
}

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

fn to_enigo_key(key: Key) -> EnigoKey {
    match key {
        Key::Char(c) => EnigoKey::Unicode(c),

        Key::Enter => EnigoKey::Return,
        Key::Tab => EnigoKey::Tab,
        Key::Space => EnigoKey::Space,
        Key::Backspace => EnigoKey::Backspace,
        Key::Delete => EnigoKey::Delete,
        Key::Escape => EnigoKey::Escape,

        Key::Up => EnigoKey::UpArrow,
        Key::Down => EnigoKey::DownArrow,
        Key::Left => EnigoKey::LeftArrow,
        Key::Right => EnigoKey::RightArrow,
        Key::Home => EnigoKey::Home,
        Key::End => EnigoKey::End,
        Key::PageUp => EnigoKey::PageUp,
        Key::PageDown => EnigoKey::PageDown,

        Key::Control => EnigoKey::Control,
        Key::Alt => EnigoKey::Alt,
        Key::Shift => EnigoKey::Shift,
        Key::Meta => EnigoKey::Meta,
        Key::CapsLock => EnigoKey::CapsLock,

        Key::F(1) => EnigoKey::F1,
        Key::F(2) => EnigoKey::F2,
        Key::F(3) => EnigoKey::F3,
        Key::F(4) => EnigoKey::F4,
        Key::F(5) => EnigoKey::F5,
        Key::F(6) => EnigoKey::F6,
        Key::F(7) => EnigoKey::F7,
        Key::F(8) => EnigoKey::F8,
        Key::F(9) => EnigoKey::F9,
        Key::F(10) => EnigoKey::F10,
        Key::F(11) => EnigoKey::F11,
        // Key::from_str only produces F1..=F12
        Key::F(_) => EnigoKey::F12,
    }
}

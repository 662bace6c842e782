//! Key names accepted by `Keyboard::press` and `Keyboard::hotkey`.

use std::fmt;
use std::str::FromStr;

use crate::AutomationError;

/// A keyboard key, independent of the input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character, typed as-is
    Char(char),

    // Editing
    Enter,
    Tab,
    Space,
    Backspace,
    Delete,
    Escape,

    // Navigation
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,

    // Modifiers
    Control,
    Alt,
    Shift,
    Meta, // Windows key / Command key
    CapsLock,

    /// Function key F1..=F12
    F(u8),
}

impl Key {
    pub fn is_modifier(&self) -> bool {
        matches!(self, Key::Control | Key::Alt | Key::Shift | Key::Meta)
    }
}

impl FromStr for Key {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(match c {
                ' ' => Key::Space,
                '\n' => Key::Enter,
                '\t' => Key::Tab,
                c => Key::Char(c),
            });
        }

        let lower = s.trim().to_lowercase();
        let key = match lower.as_str() {
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "space" => Key::Space,
            "backspace" | "bs" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "esc" | "escape" => Key::Escape,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "capslock" => Key::CapsLock,
            "ctrl" | "control" => Key::Control,
            "alt" | "option" => Key::Alt,
            "shift" => Key::Shift,
            "win" | "cmd" | "command" | "meta" | "super" => Key::Meta,
            other => match other.strip_prefix('f').map(str::parse::<u8>) {
                Some(Ok(n)) if (1..=12).contains(&n) => Key::F(n),
                _ => {
                    return Err(AutomationError::InvalidArgument(format!(
                        "unknown key name '{}'",
                        s
                    )))
                }
            },
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::F(n) => write!(f, "f{}", n),
            other => write!(f, "{}", format!("{:?}", other).to_lowercase()),
        }
    }
}

/// Parse every name up front so a bad name fails before any key goes down.
pub fn parse_keys(names: &[&str]) -> Result<Vec<Key>, AutomationError> {
    names.iter().map(|name| name.parse()).collect()
}

//! Command lines used by the application engines.
//!
//! Kept free of platform gates so every OS builds and tests them.

use std::ffi::OsString;
use std::path::Path;

use crate::utils::applescript_escape;

/// A program plus its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandLine {
    fn new<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn to_command(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

/// `open <path>` for a bundle/file, `open -a <name>` otherwise.
pub fn macos_open(app_name: &str, path: Option<&Path>) -> CommandLine {
    match path {
        Some(path) => CommandLine::new("open", [path.as_os_str().to_os_string()]),
        None => CommandLine::new("open", ["-a", app_name]),
    }
}

pub fn macos_quit(app_name: &str) -> CommandLine {
    CommandLine::new(
        "osascript",
        [
            "-e".to_string(),
            format!("quit app \"{}\"", applescript_escape(app_name)),
        ],
    )
}

pub fn macos_activate(app_name: &str) -> CommandLine {
    CommandLine::new(
        "osascript",
        [
            "-e".to_string(),
            format!(
                "tell application \"{}\" to activate",
                applescript_escape(app_name)
            ),
        ],
    )
}

/// Spawn the executable at `path`, or `app_name` resolved through `PATH`.
pub fn windows_open(app_name: &str, path: Option<&Path>) -> CommandLine {
    match path {
        Some(path) => CommandLine::new(path.as_os_str(), Vec::<OsString>::new()),
        None => CommandLine::new(app_name, Vec::<OsString>::new()),
    }
}

/// Image name taskkill matches against; `.exe` is appended unless present.
pub fn windows_image_name(app_name: &str) -> String {
    if app_name.to_lowercase().ends_with(".exe") {
        app_name.to_string()
    } else {
        format!("{}.exe", app_name)
    }
}

pub fn windows_quit(app_name: &str) -> CommandLine {
    CommandLine::new(
        "taskkill",
        ["/F".to_string(), "/IM".to_string(), windows_image_name(app_name)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(cmd: &CommandLine) -> Vec<String> {
        cmd.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_macos_open_by_name() {
        let cmd = macos_open("Safari", None);
        assert_eq!(cmd.program, "open");
        assert_eq!(args(&cmd), vec!["-a", "Safari"]);
    }

    #[test]
    fn test_macos_open_by_path() {
        let cmd = macos_open("Safari", Some(Path::new("/Applications/Safari.app")));
        assert_eq!(args(&cmd), vec!["/Applications/Safari.app"]);
    }

    #[test]
    fn test_macos_scripts_escape_the_name() {
        assert_eq!(args(&macos_quit("Notes")), vec!["-e", "quit app \"Notes\""]);
        assert_eq!(
            args(&macos_activate("Bad\" & do shell script \"x")),
            vec![
                "-e",
                "tell application \"Bad\\\" & do shell script \\\"x\" to activate"
            ]
        );
    }

    #[test]
    fn test_windows_open() {
        let cmd = windows_open("notepad", None);
        assert_eq!(cmd.program, "notepad");
        assert!(cmd.args.is_empty());

        let cmd = windows_open("notepad", Some(Path::new(r"C:\Windows\notepad.exe")));
        assert_eq!(cmd.program, r"C:\Windows\notepad.exe");
    }

    #[test]
    fn test_windows_quit() {
        assert_eq!(args(&windows_quit("notepad")), vec!["/F", "/IM", "notepad.exe"]);
        assert_eq!(args(&windows_quit("Code.EXE")), vec!["/F", "/IM", "Code.EXE"]);
    }
}

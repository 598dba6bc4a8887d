//! Console Cursor Suppression
//!
//! The fbcon blinking cursor draws over the raster output, so at startup the
//! `cursor_blink` control file is switched to "0" and the text console is
//! cleared. Nothing here is fatal.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::{info, warn};

/// Erase display, then move the cursor home
const CLEAR_CONSOLE: &[u8] = b"\x1b[2J\x1b[H";

/// What happened to the cursor blink flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOutcome {
    /// The flag already read "0"
    AlreadyDisabled,
    /// The flag was switched off
    Disabled,
    /// The flag could not be read or written
    Failed,
}

/// Disable cursor blinking and clear stdout's console
pub fn suppress_blink(path: &Path) -> CursorOutcome {
    suppress_blink_with(path, &mut io::stdout())
}

/// Disable cursor blinking, clearing `console` when the flag changed
pub fn suppress_blink_with<W: Write>(path: &Path, console: &mut W) -> CursorOutcome {
    let current = match fs::read_to_string(path) {
        Ok(current) => current,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read cursor blink flag");
            return CursorOutcome::Failed;
        }
    };

    if current.trim() == "0" {
        return CursorOutcome::AlreadyDisabled;
    }

    info!("Making cursor invisible");
    if let Err(e) = fs::write(path, "0") {
        warn!(path = %path.display(), error = %e, "Failed to disable cursor blink");
        return CursorOutcome::Failed;
    }

    if let Err(e) = console.write_all(CLEAR_CONSOLE).and_then(|()| console.flush()) {
        warn!(error = %e, "Failed to clear console");
    }

    CursorOutcome::Disabled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blinking_cursor_is_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor_blink");
        fs::write(&path, "1\n").unwrap();

        let mut console = Vec::new();
        assert_eq!(suppress_blink_with(&path, &mut console), CursorOutcome::Disabled);
        assert_eq!(fs::read_to_string(&path).unwrap(), "0");
        assert_eq!(console, CLEAR_CONSOLE);
    }

    #[test]
    fn test_disabled_cursor_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursor_blink");
        fs::write(&path, "0\n").unwrap();

        let mut console = Vec::new();
        assert_eq!(
            suppress_blink_with(&path, &mut console),
            CursorOutcome::AlreadyDisabled
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "0\n");
        assert!(console.is_empty());
    }

    #[test]
    fn test_missing_control_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = Vec::new();
        assert_eq!(
            suppress_blink_with(&dir.path().join("absent"), &mut console),
            CursorOutcome::Failed
        );
        assert!(console.is_empty());
    }
}

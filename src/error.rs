//! Error types for the display and input devices.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while opening or writing the display device.
#[derive(Error, Debug)]
pub enum DisplayError {
    /// The device node could not be opened for writing.
    #[error("Failed to open display device {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The framebuffer memory is smaller than one frame.
    #[error(
        "Display device {} holds {available} bytes but a frame needs {required}",
        .path.display()
    )]
    SizeMismatch {
        path: PathBuf,
        required: usize,
        available: usize,
    },

    /// Writing or flushing a frame failed.
    #[error("Failed to write frame to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised by the keyboard event device.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to open input device {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read events from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

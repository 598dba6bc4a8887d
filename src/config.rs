//! Configuration for fb-square.
//!
//! Loaded from YAML with defaults matching the reference 512x64 panel.
//! The file is optional: `$FB_SQUARE_CONFIG` overrides the default path
//! `/etc/fb-square/config.yaml`, and a missing file means "all defaults".

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::framebuffer::geometry::{HalfExtents, Screen, Step};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/fb-square/config.yaml";

/// Environment variable that overrides the config file path
pub const CONFIG_PATH_ENV: &str = "FB_SQUARE_CONFIG";

/// Largest frame we agree to allocate (64 MiB)
const MAX_FRAME_BYTES: u64 = 64 * 1024 * 1024;

/// Upper bound for `display_write_retries`
const MAX_WRITE_RETRIES: u32 = 10;

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Framebuffer device written on every redraw
    pub display_path: PathBuf,

    /// evdev keyboard device
    pub input_path: PathBuf,

    /// fbcon cursor blink control file
    pub cursor_blink_path: PathBuf,

    /// Disable the console cursor blink at startup
    pub suppress_cursor: bool,

    /// Screen width in pixels (one byte each)
    pub width: u32,

    /// Screen height in pixels
    pub height: u32,

    /// Pixel value for "on"
    pub on_value: u8,

    /// Rectangle half-width
    pub half_width: u32,

    /// Rectangle half-height
    pub half_height: u32,

    /// Horizontal move per Left/Right event
    pub step_x: i32,

    /// Vertical move per Up/Down event
    pub step_y: i32,

    /// Reopen the display device for every frame instead of keeping a handle
    pub reopen_each_frame: bool,

    /// Extra attempts after a failed frame write
    pub display_write_retries: u32,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Log format (pretty, json)
    pub log_format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            display_path: PathBuf::from("/dev/fb0"),
            input_path: PathBuf::from("/dev/input/event2"),
            cursor_blink_path: PathBuf::from("/sys/class/graphics/fbcon/cursor_blink"),
            suppress_cursor: true,
            width: 512,
            height: 64,
            on_value: 0x0F,
            half_width: 10,
            half_height: 5,
            step_x: 10,
            step_y: 5,
            reopen_each_frame: false,
            display_write_retries: 1,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Config file path: `$FB_SQUARE_CONFIG` or the default
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Load from `$FB_SQUARE_CONFIG` or the default path
    pub fn load() -> (Self, ConfigSource) {
        Self::load_from_path(Self::path())
    }

    /// Load configuration from a specific path, falling back to defaults.
    ///
    /// Runs before logging is set up, so nothing is logged here; the caller
    /// reports the returned `ConfigSource` once a subscriber exists.
    pub fn load_from_path(path: impl Into<PathBuf>) -> (Self, ConfigSource) {
        let path = path.into();

        if !path.exists() {
            return (Self::default(), ConfigSource::Missing(path));
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) => {
                return (
                    Self::default(),
                    ConfigSource::Fallback(ConfigError::Read { path, source }),
                )
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(config) => (config, ConfigSource::File(path)),
            Err(source) => (
                Self::default(),
                ConfigSource::Fallback(ConfigError::Parse { path, source }),
            ),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "width/height".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if u64::from(self.width) * u64::from(self.height) > MAX_FRAME_BYTES {
            return Err(ConfigError::InvalidValue {
                field: "width/height".to_string(),
                message: format!("frame must not exceed {} bytes", MAX_FRAME_BYTES),
            });
        }

        if self.half_width == 0 || self.half_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "half_width/half_height".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }

        if self.on_value == 0 {
            return Err(ConfigError::InvalidValue {
                field: "on_value".to_string(),
                message: "must differ from the background value 0".to_string(),
            });
        }

        if self.display_write_retries > MAX_WRITE_RETRIES {
            return Err(ConfigError::InvalidValue {
                field: "display_write_retries".to_string(),
                message: format!("must be at most {}", MAX_WRITE_RETRIES),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log_level".to_string(),
                message: format!("must be one of: {:?}", valid_levels),
            });
        }

        Ok(())
    }

    pub fn screen(&self) -> Screen {
        Screen::new(self.width, self.height)
    }

    pub fn extents(&self) -> HalfExtents {
        HalfExtents::new(self.half_width, self.half_height)
    }

    pub fn step(&self) -> Step {
        Step::new(self.step_x, self.step_y)
    }
}

/// Where the loaded configuration came from
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No file at this path, defaults used
    Missing(PathBuf),
    /// The file was unusable, defaults used
    Fallback(ConfigError),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

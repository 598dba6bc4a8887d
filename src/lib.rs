//! fb-square
//!
//! Draws a single filled rectangle on a raw Linux framebuffer and moves it
//! with the arrow keys of an evdev keyboard.
//!
//! Modules:
//! - `config` - YAML configuration with defaults for the reference panel
//! - `cursor` - fbcon cursor blink suppression
//! - `error` - device error types
//! - `framebuffer` - frame rendering, display output and the input loop

pub mod config;
pub mod cursor;
pub mod error;
pub mod framebuffer;

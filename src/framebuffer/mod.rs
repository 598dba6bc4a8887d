//! Raw Framebuffer Rendering and Input Loop
//!
//! Architecture:
//! - `geometry.rs` - screen, position and movement types
//! - `frame.rs` - one-byte-per-pixel frame with the filled rectangle
//! - `fb.rs` - framebuffer device wrapper and the `Surface` trait
//! - `input.rs` - evdev keyboard events as a blocking iterator
//! - `app.rs` - position state and the input-to-redraw loop

pub mod app;
pub mod fb;
pub mod frame;
pub mod geometry;
pub mod input;

pub use app::{run, App};

//! Application Logic
//!
//! Owns the rectangle position and drives the input-to-redraw loop: every
//! accepted key event moves the rectangle and synchronously presents a new
//! frame before the next event is read.

use anyhow::{Context, Result};
use evdev::InputEvent;
use tracing::{debug, info, warn};

use super::fb::{Framebuffer, Surface};
use super::frame::Frame;
use super::geometry::{Position, Step};
use super::input::{direction_for, KeyEvents};
use crate::config::Config;
use crate::error::{DisplayError, InputError};

/// Application state
pub struct App<S> {
    position: Position,
    step: Step,
    frame: Frame,
    surface: S,
    write_retries: u32,
}

impl<S: Surface> App<S> {
    /// Position starts at the screen center
    pub fn new(config: &Config, surface: S) -> Self {
        let screen = config.screen();
        Self {
            position: Position::center(screen),
            step: config.step(),
            frame: Frame::new(screen, config.extents(), config.on_value),
            surface,
            write_retries: config.display_write_retries,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Render the current position and present it, retrying failed writes.
    ///
    /// The position is never modified here.
    pub fn redraw(&mut self) -> Result<(), DisplayError> {
        self.frame.render(self.position);

        let mut attempt = 0;
        loop {
            match self.surface.present(&self.frame) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.write_retries => {
                    attempt += 1;
                    warn!(error = %e, attempt = attempt, "Frame write failed, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply one input event. Returns whether a redraw happened.
    pub fn handle_event(&mut self, event: &InputEvent) -> Result<bool, DisplayError> {
        let Some(direction) = direction_for(event) else {
            return Ok(false);
        };

        self.position = self.position.moved(direction, self.step);
        debug!(
            ?direction,
            x = self.position.x,
            y = self.position.y,
            "Moved rectangle"
        );

        self.redraw()?;
        Ok(true)
    }

    /// Consume events until the stream ends or an error occurs
    pub fn run<I>(&mut self, events: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<InputEvent, InputError>>,
    {
        for event in events {
            let event = event.context("Input device read failed")?;
            self.handle_event(&event).context("Failed to redraw frame")?;
        }
        Ok(())
    }
}

/// Open both devices, draw the first frame and run the input loop.
///
/// Returns `Ok` only when the input device goes away.
pub fn run(config: &Config) -> Result<()> {
    info!("Starting framebuffer square");

    let fb = Framebuffer::open(&config.display_path, config.screen(), config.reopen_each_frame)
        .context("Failed to open display")?;

    let mut app = App::new(config, fb);
    app.redraw().context("Failed to draw initial frame")?;

    let mut events = KeyEvents::open(&config.input_path).context("Failed to open keyboard")?;

    info!(
        x = app.position().x,
        y = app.position().y,
        "Entering input loop"
    );
    app.run(&mut events)?;

    info!(
        input = %events.path().display(),
        display = %app.surface().path().display(),
        frames = app.surface().frames_written(),
        "Input device closed, exiting"
    );
    Ok(())
}

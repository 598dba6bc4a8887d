//! Monochrome frame buffer
//!
//! One byte per pixel, row-major. Each redraw clears the whole buffer and
//! fills the clipped rectangle around the current position.

use std::ops::Range;

use super::geometry::{HalfExtents, Position, Screen};

/// Background pixel value
pub const OFF: u8 = 0x00;

pub struct Frame {
    screen: Screen,
    extents: HalfExtents,
    on_value: u8,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(screen: Screen, extents: HalfExtents, on_value: u8) -> Self {
        Self {
            screen,
            extents,
            on_value,
            data: vec![OFF; screen.frame_len()],
        }
    }

    /// Regenerate the frame for a rectangle centered on `position`.
    ///
    /// A pixel is lit iff `|x - position.x| < half_width` and
    /// `|y - position.y| < half_height`. Pixels outside the screen are never
    /// visited.
    pub fn render(&mut self, position: Position) {
        self.data.fill(OFF);

        let cols = clip(position.x, self.extents.half_width, self.screen.width);
        let rows = clip(position.y, self.extents.half_height, self.screen.height);
        if cols.is_empty() {
            return;
        }

        let width = self.screen.width as usize;
        for y in rows {
            let row = y * width;
            self.data[row + cols.start..row + cols.end].fill(self.on_value);
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel value, or `None` outside the screen
    pub fn pixel(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.screen.width || y >= self.screen.height {
            return None;
        }
        self.data
            .get(y as usize * self.screen.width as usize + x as usize)
            .copied()
    }

    /// Number of lit pixels
    pub fn lit(&self) -> usize {
        self.data.iter().filter(|&&b| b != OFF).count()
    }
}

/// Open interval `(center - half, center + half)` clipped to `[0, size)`
fn clip(center: i32, half: u32, size: u32) -> Range<usize> {
    let center = i64::from(center);
    let half = i64::from(half);
    let lo = (center - half + 1).max(0);
    let hi = (center + half).min(i64::from(size));
    if lo >= hi {
        return 0..0;
    }
    lo as usize..hi as usize
}

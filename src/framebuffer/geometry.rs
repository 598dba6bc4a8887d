//! Screen, position and movement types.

/// Fixed screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
}

impl Screen {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Bytes in one frame (one byte per pixel)
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Rectangle half-width and half-height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfExtents {
    pub half_width: u32,
    pub half_height: u32,
}

impl HalfExtents {
    pub const fn new(half_width: u32, half_height: u32) -> Self {
        Self {
            half_width,
            half_height,
        }
    }
}

/// Distance moved by one accepted key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub dx: i32,
    pub dy: i32,
}

impl Step {
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Movement direction. Screen y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Rectangle center. May lie anywhere, including off screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Screen midpoint
    pub fn center(screen: Screen) -> Self {
        Self {
            x: (screen.width / 2) as i32,
            y: (screen.height / 2) as i32,
        }
    }

    /// Position after one move in `direction`
    pub fn moved(self, direction: Direction, step: Step) -> Self {
        match direction {
            Direction::Up => Self::new(self.x, self.y.saturating_sub(step.dy)),
            Direction::Down => Self::new(self.x, self.y.saturating_add(step.dy)),
            Direction::Left => Self::new(self.x.saturating_sub(step.dx), self.y),
            Direction::Right => Self::new(self.x.saturating_add(step.dx), self.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Step = Step::new(10, 5);

    #[test]
    fn test_center_of_reference_screen() {
        assert_eq!(Position::center(Screen::new(512, 64)), Position::new(256, 32));
    }

    #[test]
    fn test_moves() {
        let p = Position::new(256, 32);
        assert_eq!(p.moved(Direction::Up, STEP), Position::new(256, 27));
        assert_eq!(p.moved(Direction::Down, STEP), Position::new(256, 37));
        assert_eq!(p.moved(Direction::Left, STEP), Position::new(246, 32));
        assert_eq!(p.moved(Direction::Right, STEP), Position::new(266, 32));
    }

    #[test]
    fn test_independent_axes_commute() {
        let p = Position::new(256, 32);
        let a = p.moved(Direction::Up, STEP).moved(Direction::Right, STEP);
        let b = p.moved(Direction::Right, STEP).moved(Direction::Up, STEP);
        assert_eq!(a, b);
        assert_eq!(a, Position::new(266, 27));
    }

    #[test]
    fn test_moves_saturate() {
        let p = Position::new(i32::MIN, i32::MAX);
        assert_eq!(p.moved(Direction::Left, STEP).x, i32::MIN);
        assert_eq!(p.moved(Direction::Down, STEP).y, i32::MAX);
    }
}

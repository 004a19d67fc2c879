//! Virtual pointer integration.
//!
//! The input context owns a [`CursorIntegrator`]: directional keys set a per-axis delta and
//! every poll adds it (doubled unless slow mode is on) to an unbounded absolute position.
//!
//! The machine-tick context owns a [`PointerTracker`], which turns successive absolute
//! positions into the relative motion the emulated mouse expects.

use picomac_shared::CursorSnapshot;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorIntegrator {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    button: bool,
    slow: bool,
}

impl CursorIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn delta(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }

    pub fn button(&self) -> bool {
        self.button
    }

    pub fn is_slow(&self) -> bool {
        self.slow
    }

    pub fn set_dx(&mut self, dx: i32) {
        self.dx = dx;
    }

    pub fn set_dy(&mut self, dy: i32) {
        self.dy = dy;
    }

    pub fn set_button(&mut self, down: bool) {
        self.button = down;
    }

    pub fn toggle_speed(&mut self) {
        self.slow = !self.slow;
    }

    fn step(&self) -> i32 {
        if self.slow {
            1
        } else {
            2
        }
    }

    /// Advance one poll cycle. Returns `true` if the position moved.
    pub fn tick(&mut self) -> bool {
        let step = self.step();
        self.x = self.x.wrapping_add(self.dx * step);
        self.y = self.y.wrapping_add(self.dy * step);
        self.dx != 0 || self.dy != 0
    }
}

/// Relative mouse report for the emulated machine.
///
/// `dy` is already flipped: the handheld's screen grows downwards while the emulated mouse
/// reports positive `dy` as upward motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerMotion {
    pub dx: i32,
    pub dy: i32,
    pub button: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    last_x: i32,
    last_y: i32,
    last_button: bool,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `cursor` against the last reported position. Returns `None` when nothing changed.
    pub fn update(&mut self, cursor: CursorSnapshot) -> Option<PointerMotion> {
        let dx = cursor.x.wrapping_sub(self.last_x);
        let dy = cursor.y.wrapping_sub(self.last_y);
        if dx == 0 && dy == 0 && cursor.button == self.last_button {
            return None;
        }

        self.last_x = cursor.x;
        self.last_y = cursor.y;
        self.last_button = cursor.button;
        Some(PointerMotion {
            dx,
            dy: -dy,
            button: cursor.button,
        })
    }
}

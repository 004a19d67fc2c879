//! Viewport offset published by the scan-out context.

#[cfg(all(feature = "loom", test))]
use loom::sync::atomic::AtomicI32;
#[cfg(not(all(feature = "loom", test)))]
use std::sync::atomic::AtomicI32;

use std::sync::atomic::Ordering;

/// Top-left corner of the visible window inside the virtual screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportOffset {
    pub x: i32,
    pub y: i32,
}

/// Last viewport offset used for a frame.
///
/// Only the scan-out context stores into this. The two axes are independent, so a reader may
/// observe `x` from one frame and `y` from the next; both values are always within range.
#[derive(Debug)]
pub struct SharedViewport {
    x: AtomicI32,
    y: AtomicI32,
}

impl SharedViewport {
    pub fn new() -> Self {
        Self {
            x: AtomicI32::new(0),
            y: AtomicI32::new(0),
        }
    }

    pub fn load(&self) -> ViewportOffset {
        ViewportOffset {
            x: self.x.load(Ordering::Relaxed),
            y: self.y.load(Ordering::Relaxed),
        }
    }

    pub fn store(&self, offset: ViewportOffset) {
        self.x.store(offset.x, Ordering::Relaxed);
        self.y.store(offset.y, Ordering::Relaxed);
    }
}

impl Default for SharedViewport {
    fn default() -> Self {
        Self::new()
    }
}

//! Input state published by the input context.
//!
//! The cursor is published with the same generation protocol as a seqlock so the machine-tick
//! context never sees `x` from one poll and `y` from another:
//! 1) Mark the generation as busy ([`CURSOR_GENERATION_BUSY_BIT`]).
//! 2) Store all cursor fields.
//! 3) Store `generation + 1` with the busy bit cleared.
//!
//! There is a single writer, so step 1 is a plain store rather than a compare-exchange.

#[cfg(all(feature = "loom", test))]
use loom::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8};
#[cfg(not(all(feature = "loom", test)))]
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU8};

use std::sync::atomic::Ordering;

/// Internal bit used to mark the cursor generation as "being updated".
pub const CURSOR_GENERATION_BUSY_BIT: u32 = 1 << 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Every key edge is forwarded to the emulated keyboard.
    Key,
    /// Arrow keys drive the emulated pointer.
    #[default]
    Pointer,
}

impl InputMode {
    pub fn toggled(self) -> Self {
        match self {
            InputMode::Key => InputMode::Pointer,
            InputMode::Pointer => InputMode::Key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorSnapshot {
    pub generation: u32,
    pub x: i32,
    pub y: i32,
    pub button: bool,
    pub slow: bool,
}

#[derive(Debug)]
pub struct SharedInputState {
    modifiers: AtomicU8,
    pointer_mode: AtomicBool,

    cursor_generation: AtomicU32,
    cursor_x: AtomicI32,
    cursor_y: AtomicI32,
    cursor_button: AtomicBool,
    cursor_slow: AtomicBool,
}

impl SharedInputState {
    pub fn new(mode: InputMode) -> Self {
        Self {
            modifiers: AtomicU8::new(0),
            pointer_mode: AtomicBool::new(mode == InputMode::Pointer),
            cursor_generation: AtomicU32::new(0),
            cursor_x: AtomicI32::new(0),
            cursor_y: AtomicI32::new(0),
            cursor_button: AtomicBool::new(false),
            cursor_slow: AtomicBool::new(false),
        }
    }

    /// Raw modifier bits (see `picomac_input::Modifiers`).
    pub fn modifiers(&self) -> u8 {
        self.modifiers.load(Ordering::SeqCst)
    }

    pub fn store_modifiers(&self, bits: u8) {
        self.modifiers.store(bits, Ordering::SeqCst);
    }

    pub fn mode(&self) -> InputMode {
        if self.pointer_mode.load(Ordering::SeqCst) {
            InputMode::Pointer
        } else {
            InputMode::Key
        }
    }

    pub fn store_mode(&self, mode: InputMode) {
        self.pointer_mode
            .store(mode == InputMode::Pointer, Ordering::SeqCst);
    }

    /// Publish a complete cursor update. Returns the new generation.
    pub fn publish_cursor(&self, x: i32, y: i32, button: bool, slow: bool) -> u32 {
        let start = self.cursor_generation.load(Ordering::SeqCst) & !CURSOR_GENERATION_BUSY_BIT;
        self.cursor_generation
            .store(start | CURSOR_GENERATION_BUSY_BIT, Ordering::SeqCst);

        test_yield();
        self.cursor_x.store(x, Ordering::SeqCst);
        test_yield();
        self.cursor_y.store(y, Ordering::SeqCst);
        test_yield();
        self.cursor_button.store(button, Ordering::SeqCst);
        test_yield();
        self.cursor_slow.store(slow, Ordering::SeqCst);
        test_yield();

        let new_generation = start.wrapping_add(1) & !CURSOR_GENERATION_BUSY_BIT;
        self.cursor_generation
            .store(new_generation, Ordering::SeqCst);
        new_generation
    }

    pub fn cursor(&self) -> CursorSnapshot {
        loop {
            let gen0 = self.cursor_generation.load(Ordering::SeqCst);
            if gen0 & CURSOR_GENERATION_BUSY_BIT != 0 {
                // Writer in progress.
                spin_hint();
                continue;
            }

            let x = self.cursor_x.load(Ordering::SeqCst);
            let y = self.cursor_y.load(Ordering::SeqCst);
            let button = self.cursor_button.load(Ordering::SeqCst);
            let slow = self.cursor_slow.load(Ordering::SeqCst);

            let gen1 = self.cursor_generation.load(Ordering::SeqCst);
            if gen0 != gen1 {
                continue;
            }

            return CursorSnapshot {
                generation: gen0,
                x,
                y,
                button,
                slow,
            };
        }
    }
}

impl Default for SharedInputState {
    fn default() -> Self {
        Self::new(InputMode::default())
    }
}

#[cfg(all(test, feature = "loom"))]
#[inline]
fn test_yield() {
    loom::thread::yield_now();
}

#[cfg(all(test, not(feature = "loom")))]
#[inline]
fn test_yield() {
    std::thread::yield_now();
}

#[cfg(not(test))]
#[inline]
fn test_yield() {}

#[cfg(all(test, feature = "loom"))]
#[inline]
fn spin_hint() {
    loom::thread::yield_now();
}

#[cfg(not(all(test, feature = "loom")))]
#[inline]
fn spin_hint() {
    std::hint::spin_loop();
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    #[test]
    fn defaults_to_pointer_mode_with_cursor_at_origin() {
        let state = SharedInputState::default();
        assert_eq!(state.mode(), InputMode::Pointer);
        assert_eq!(state.modifiers(), 0);
        let cursor = state.cursor();
        assert_eq!((cursor.x, cursor.y, cursor.button, cursor.slow), (0, 0, false, false));
    }

    #[test]
    fn mode_round_trips() {
        let state = SharedInputState::new(InputMode::Key);
        assert_eq!(state.mode(), InputMode::Key);
        state.store_mode(InputMode::Key.toggled());
        assert_eq!(state.mode(), InputMode::Pointer);
    }

    #[test]
    fn generation_increments_by_one_per_publish() {
        let state = SharedInputState::default();
        let g0 = state.cursor().generation;
        assert_eq!(state.publish_cursor(1, 2, false, false), g0.wrapping_add(1));
        assert_eq!(state.publish_cursor(3, 4, true, true), g0.wrapping_add(2));
        let snap = state.cursor();
        assert_eq!(snap.generation, g0.wrapping_add(2));
        assert_eq!((snap.x, snap.y, snap.button, snap.slow), (3, 4, true, true));
    }

    #[test]
    fn cursor_snapshot_is_coherent_across_concurrent_publishes() {
        let state = Arc::new(SharedInputState::default());
        let writer_state = state.clone();

        let writer = thread::spawn(move || {
            for token in 0i32..10_000 {
                writer_state.publish_cursor(token, -token, token % 2 == 0, token % 2 == 0);
            }
        });

        for _ in 0..10_000 {
            let snap = state.cursor();
            assert_eq!(snap.y, -snap.x);
            assert_eq!(snap.button, snap.slow);
        }

        writer.join().unwrap();
        let snap = state.cursor();
        assert_eq!((snap.x, snap.y), (9_999, -9_999));
    }
}

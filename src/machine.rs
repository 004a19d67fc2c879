//! Machine-tick context: drives the emulated Mac and feeds it queued input.

use std::sync::Arc;

use picomac_input::{PointerMotion, PointerTracker};
use picomac_ipc::{EncodedKeyEvent, KeyEventRing};
use picomac_shared::SharedInputState;

/// Vertical retrace interval of the emulated Mac, in microseconds (60 Hz).
pub const VSYNC_PERIOD_US: u64 = 16_667;
/// Real-time clock interrupt interval, in microseconds.
pub const ONE_HZ_PERIOD_US: u64 = 1_000_000;

/// The emulated machine, as seen from the bridge.
pub trait MacMachine {
    /// Run one slice of emulation.
    fn run_loop(&mut self);
    fn on_vsync(&mut self);
    fn on_one_hz(&mut self);
    /// Relative mouse motion. Positive `dy` is upward.
    fn submit_pointer(&mut self, dx: i32, dy: i32, button: bool);
    /// One key edge. `code` is the wire byte of an [`EncodedKeyEvent`]
    /// (`(keycode << 1) | 1`).
    fn submit_key(&mut self, code: u8, pressed: bool);
}

impl<M: MacMachine + ?Sized> MacMachine for &mut M {
    fn run_loop(&mut self) {
        (**self).run_loop();
    }

    fn on_vsync(&mut self) {
        (**self).on_vsync();
    }

    fn on_one_hz(&mut self) {
        (**self).on_one_hz();
    }

    fn submit_pointer(&mut self, dx: i32, dy: i32, button: bool) {
        (**self).submit_pointer(dx, dy, button);
    }

    fn submit_key(&mut self, code: u8, pressed: bool) {
        (**self).submit_key(code, pressed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimings {
    pub vsync_period_us: u64,
    pub one_hz_period_us: u64,
}

impl Default for TickTimings {
    fn default() -> Self {
        Self {
            vsync_period_us: VSYNC_PERIOD_US,
            one_hz_period_us: ONE_HZ_PERIOD_US,
        }
    }
}

/// What one [`MachineTicker::poll`] delivered to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub vsync: bool,
    pub one_hz: bool,
    pub pointer: Option<PointerMotion>,
    pub key: Option<EncodedKeyEvent>,
}

/// Consumer side of the input path. Owns the timers and the last pointer position reported to
/// the machine.
pub struct MachineTicker {
    ring: Arc<KeyEventRing>,
    input: Arc<SharedInputState>,
    pointer: PointerTracker,
    timings: TickTimings,
    last_vsync_us: u64,
    last_one_hz_us: u64,
}

impl MachineTicker {
    pub fn new(ring: Arc<KeyEventRing>, input: Arc<SharedInputState>, timings: TickTimings) -> Self {
        Self {
            ring,
            input,
            pointer: PointerTracker::new(),
            timings,
            last_vsync_us: 0,
            last_one_hz_us: 0,
        }
    }

    pub fn timings(&self) -> TickTimings {
        self.timings
    }

    /// One iteration of the machine loop at monotonic time `now_us`.
    ///
    /// Runs the machine, fires due timer events, reports pointer motion if the cursor changed,
    /// and delivers at most one queued key.
    pub fn poll<M: MacMachine + ?Sized>(&mut self, machine: &mut M, now_us: u64) -> TickReport {
        let mut report = TickReport::default();
        machine.run_loop();

        if now_us.saturating_sub(self.last_vsync_us) >= self.timings.vsync_period_us {
            machine.on_vsync();
            self.last_vsync_us = now_us;
            report.vsync = true;
        }
        if now_us.saturating_sub(self.last_one_hz_us) >= self.timings.one_hz_period_us {
            machine.on_one_hz();
            self.last_one_hz_us = now_us;
            report.one_hz = true;
        }

        if let Some(motion) = self.pointer.update(self.input.cursor()) {
            machine.submit_pointer(motion.dx, motion.dy, motion.button);
            report.pointer = Some(motion);
        }

        if let Some(event) = self.ring.try_pop() {
            tracing::trace!(?event, "key delivered");
            machine.submit_key(event.wire_code(), event.is_pressed());
            report.key = Some(event);
        }

        report
    }
}

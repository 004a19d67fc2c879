//! The input context: one [`InputPipeline::poll_input`] per loop iteration reads the keyboard
//! controller, updates modifiers and mode, moves the virtual pointer, and queues key edges for
//! the machine-tick context.

use std::sync::Arc;

use picomac_ipc::KeyEventRing;
use picomac_shared::{InputMode, SharedInputState};

use crate::bus::KeyboardBus;
use crate::cursor::CursorIntegrator;
use crate::keycode::RawKeyEvent;
use crate::keymap::encode_raw_key;
use crate::mode::{ModeStateMachine, PointerBindings, Route};
use crate::modifiers::{ModifierTracker, SystemControl};

/// Upper bound on FIFO reads performed by [`InputPipeline::reset`].
const RESET_DRAIN_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputConfig {
    pub initial_mode: InputMode,
    pub bindings: PointerBindings,
}

/// The input context: owns the keyboard bus and all producer-side state.
pub struct InputPipeline<B, S> {
    bus: B,
    system: S,
    ring: Arc<KeyEventRing>,
    shared: Arc<SharedInputState>,

    modifiers: ModifierTracker,
    mode: ModeStateMachine,
    cursor: CursorIntegrator,
    initial_mode: InputMode,
}

impl<B: KeyboardBus, S: SystemControl> InputPipeline<B, S> {
    pub fn new(
        bus: B,
        system: S,
        ring: Arc<KeyEventRing>,
        shared: Arc<SharedInputState>,
        config: InputConfig,
    ) -> Self {
        shared.store_mode(config.initial_mode);
        Self {
            bus,
            system,
            ring,
            shared,
            modifiers: ModifierTracker::new(),
            mode: ModeStateMachine::new(config.initial_mode, config.bindings),
            cursor: CursorIntegrator::new(),
            initial_mode: config.initial_mode,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn mode(&self) -> InputMode {
        self.mode.mode()
    }

    pub fn cursor(&self) -> &CursorIntegrator {
        &self.cursor
    }

    /// Discard stale controller events and return to the power-on state.
    pub fn reset(&mut self) {
        let drained = self.bus.drain(RESET_DRAIN_LIMIT);
        self.modifiers.reset();
        self.shared.store_modifiers(0);
        self.mode = ModeStateMachine::new(self.initial_mode, *self.mode.bindings());
        self.shared.store_mode(self.initial_mode);
        tracing::info!(drained, mode = ?self.initial_mode, "keyboard input reset");
    }

    /// Translate and queue one key edge. Unmapped keys and a full ring drop the event.
    pub fn push_key(&self, code: u8, pressed: bool) -> bool {
        let Some(event) = encode_raw_key(code, pressed) else {
            tracing::debug!(code = format_args!("{code:#04x}"), "unmapped key dropped");
            return false;
        };
        match self.ring.try_push(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(?event, "key ring full, event dropped");
                false
            }
        }
    }

    /// One iteration of the input loop. Returns the controller event that was processed, if any.
    ///
    /// The cursor is integrated on every call, whether or not an event arrived.
    pub fn poll_input(&mut self) -> Option<RawKeyEvent> {
        let event = match self.bus.read_fifo() {
            Ok(word) => RawKeyEvent::from_fifo_word(word),
            Err(err) => {
                tracing::warn!(%err, "keyboard read failed");
                None
            }
        };

        if let Some(event) = event {
            self.handle_event(event);
        }

        if self.cursor.tick() {
            self.publish_cursor();
        }
        event
    }

    fn handle_event(&mut self, event: RawKeyEvent) {
        if self.modifiers.update(event) {
            self.shared.store_modifiers(self.modifiers.mask().bits());
        }

        if let Some(action) = self.modifiers.system_action(event) {
            tracing::info!(?action, "system combo");
            self.system.perform(action);
        }

        let before = self.mode.mode();
        let cursor_before = (self.cursor.button(), self.cursor.is_slow());
        let route = self.mode.handle(event, &mut self.cursor);
        if self.mode.mode() != before {
            self.shared.store_mode(self.mode.mode());
        }
        if (self.cursor.button(), self.cursor.is_slow()) != cursor_before {
            self.publish_cursor();
        }

        if let Route::Forward { code, pressed } = route {
            self.push_key(code, pressed);
        }
    }

    fn publish_cursor(&self) {
        let (x, y) = self.cursor.position();
        self.shared
            .publish_cursor(x, y, self.cursor.button(), self.cursor.is_slow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::bus::ScriptedKeyboard;
    use crate::keycode::raw_key;
    use crate::keymap::MacKeyCode;
    use crate::modifiers::SystemAction;

    #[derive(Default)]
    struct RecordingSystem(Vec<SystemAction>);

    impl SystemControl for RecordingSystem {
        fn perform(&mut self, action: SystemAction) {
            self.0.push(action);
        }
    }

    fn pipeline(mode: InputMode) -> InputPipeline<ScriptedKeyboard, RecordingSystem> {
        InputPipeline::new(
            ScriptedKeyboard::new(),
            RecordingSystem::default(),
            Arc::new(KeyEventRing::new()),
            Arc::new(SharedInputState::new(mode)),
            InputConfig {
                initial_mode: mode,
                ..InputConfig::default()
            },
        )
    }

    #[test]
    fn push_key_drops_unmapped_codes() {
        let p = pipeline(InputMode::Key);
        assert!(!p.push_key(raw_key::INSERT, true));
        assert!(p.ring.is_empty());
        assert!(p.push_key(b'a', true));
        assert_eq!(p.ring.try_pop(), Some(MacKeyCode::A.encode(true)));
    }

    #[test]
    fn push_key_reports_full_ring() {
        let p = pipeline(InputMode::Key);
        for _ in 0..p.ring.capacity() {
            assert!(p.push_key(b'a', true));
        }
        assert!(!p.push_key(b'b', true));
    }

    #[test]
    fn bus_errors_read_as_no_event() {
        let mut p = pipeline(InputMode::Key);
        p.bus_mut().push_error(crate::BusError::Timeout);
        assert_eq!(p.poll_input(), None);
        assert!(p.ring.is_empty());
    }

    #[test]
    fn modifiers_are_published() {
        let mut p = pipeline(InputMode::Key);
        p.bus_mut().push_event(RawKeyEvent::pressed(raw_key::CONTROL));
        p.poll_input();
        assert_eq!(p.shared.modifiers(), 0x10);
    }

    #[test]
    fn reset_drains_and_restores_initial_state() {
        let mut p = pipeline(InputMode::Pointer);
        p.bus_mut().push_event(RawKeyEvent::pressed(raw_key::RIGHT_SHIFT));
        p.bus_mut().push_event(RawKeyEvent::pressed(raw_key::ALT));
        p.poll_input();
        p.poll_input();
        assert_eq!(p.mode(), InputMode::Key);

        p.bus_mut().push_event(RawKeyEvent::pressed(b'a'));
        p.bus_mut().push_event(RawKeyEvent::released(b'a'));
        p.reset();

        assert_eq!(p.bus().remaining(), 0);
        assert_eq!(p.mode(), InputMode::Pointer);
        assert_eq!(p.shared.mode(), InputMode::Pointer);
        assert_eq!(p.shared.modifiers(), 0);
    }

    #[test]
    fn combo_invokes_system_control() {
        let mut p = pipeline(InputMode::Key);
        p.bus_mut().extend([
            RawKeyEvent::pressed(raw_key::CONTROL),
            RawKeyEvent::pressed(raw_key::ALT),
            RawKeyEvent::pressed(raw_key::DELETE),
            RawKeyEvent::released(raw_key::DELETE),
        ]);
        for _ in 0..4 {
            p.poll_input();
        }
        assert_eq!(p.system().0, vec![SystemAction::WatchdogReset]);
    }
}

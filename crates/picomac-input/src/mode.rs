//! Key mode / pointer mode interpretation of controller events.

use picomac_shared::InputMode;

use crate::cursor::CursorIntegrator;
use crate::keycode::{raw_key, KeyState, RawKeyEvent};

/// Keys with a dedicated meaning outside ordinary typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerBindings {
    /// Flips between key mode and pointer mode. Never forwarded.
    pub mode_toggle: u8,
    pub left: u8,
    pub right: u8,
    pub up: u8,
    pub down: u8,
    /// Mouse button while in pointer mode.
    pub button: u8,
    /// Released to toggle slow pointer movement while in pointer mode.
    pub speed: u8,
}

impl Default for PointerBindings {
    fn default() -> Self {
        Self {
            mode_toggle: raw_key::RIGHT_SHIFT,
            left: raw_key::LEFT,
            right: raw_key::RIGHT,
            up: raw_key::UP,
            down: raw_key::DOWN,
            button: raw_key::ENTER,
            speed: raw_key::SPACE,
        }
    }
}

/// What the pipeline should do with an event after the state machine has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Claimed by mode or pointer handling.
    Consumed,
    /// Hand to the key map and queue.
    Forward { code: u8, pressed: bool },
    /// Not an edge (idle/hold/long-hold); nothing to do.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ModeStateMachine {
    mode: InputMode,
    bindings: PointerBindings,
}

impl ModeStateMachine {
    pub fn new(mode: InputMode, bindings: PointerBindings) -> Self {
        Self { mode, bindings }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn bindings(&self) -> &PointerBindings {
        &self.bindings
    }

    pub fn handle(&mut self, event: RawKeyEvent, cursor: &mut CursorIntegrator) -> Route {
        if event.code == self.bindings.mode_toggle {
            if event.state == KeyState::Pressed {
                self.mode = self.mode.toggled();
                tracing::debug!(mode = ?self.mode, "input mode toggled");
            }
            return Route::Consumed;
        }

        let Some(pressed) = event.state.edge() else {
            return Route::Ignored;
        };

        match self.mode {
            InputMode::Key => Route::Forward {
                code: event.code,
                pressed,
            },
            InputMode::Pointer => self.handle_pointer(event.code, pressed, cursor),
        }
    }

    fn handle_pointer(&self, code: u8, pressed: bool, cursor: &mut CursorIntegrator) -> Route {
        let b = &self.bindings;
        // Releasing either key of an axis stops that axis, even if the opposite key is still
        // held.
        if code == b.left || code == b.right {
            let dir = if code == b.left { -1 } else { 1 };
            cursor.set_dx(if pressed { dir } else { 0 });
        } else if code == b.up || code == b.down {
            let dir = if code == b.up { -1 } else { 1 };
            cursor.set_dy(if pressed { dir } else { 0 });
        } else if code == b.button {
            cursor.set_button(pressed);
        } else if code == b.speed {
            if !pressed {
                cursor.toggle_speed();
            }
        } else {
            return Route::Forward { code, pressed };
        }
        Route::Consumed
    }
}

impl Default for ModeStateMachine {
    fn default() -> Self {
        Self::new(InputMode::default(), PointerBindings::default())
    }
}

//! Keyboard input path: from the handheld's keyboard controller to the emulated Macintosh.
//!
//! The controller reports key edges in its own code space ([`keycode::raw_key`]). Each poll:
//! 1. [`modifiers::ModifierTracker`] updates the held-modifier mask and checks the
//!    Control+Alt system combos.
//! 2. [`mode::ModeStateMachine`] either claims the event for the virtual pointer or forwards it.
//! 3. Forwarded edges are translated by [`keymap::map_raw_key`] and queued on the shared
//!    [`picomac_ipc::KeyEventRing`].
//! 4. [`cursor::CursorIntegrator`] advances the pointer and publishes it to
//!    [`picomac_shared::SharedInputState`].
//!
//! [`pipeline::InputPipeline`] wires the steps together.

pub mod bus;
pub mod controller;
pub mod cursor;
pub mod keycode;
pub mod keymap;
pub mod mode;
pub mod modifiers;
pub mod pipeline;

pub use bus::{BusError, KeyboardBus, ScriptedKeyboard};
pub use controller::{I2cTransport, KeyboardController, Register, KEYBOARD_I2C_ADDR};
pub use cursor::{CursorIntegrator, PointerMotion, PointerTracker};
pub use keycode::{KeyState, RawKeyEvent};
pub use keymap::{map_raw_key, MacKeyCode};
pub use mode::{ModeStateMachine, PointerBindings, Route};
pub use modifiers::{ModifierTracker, Modifiers, SystemAction, SystemControl};
pub use pipeline::{InputConfig, InputPipeline};

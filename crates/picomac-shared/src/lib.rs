//! Process-wide state shared between the input, machine-tick and scan-out contexts.
//!
//! Every field has exactly one writer context:
//! - [`input_state::SharedInputState`]: written only by the input context.
//! - [`viewport::SharedViewport`]: written only by the scan-out context.
//!
//! Readers may run on any context. Nothing here takes a lock.

pub mod input_state;
pub mod viewport;

pub use input_state::{CursorSnapshot, InputMode, SharedInputState};
pub use viewport::{SharedViewport, ViewportOffset};

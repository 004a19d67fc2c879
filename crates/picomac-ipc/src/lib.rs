//! Cross-core plumbing between the input context and the machine-tick context.
//!
//! - [`ring::KeyEventRing`]: fixed-capacity SPSC queue of encoded key events.
//! - [`protocol::EncodedKeyEvent`]: the 16-bit wire format the emulated keyboard consumes.

pub mod layout;
pub mod protocol;
pub mod ring;

pub use protocol::EncodedKeyEvent;
pub use ring::{KeyEventRing, PushError};

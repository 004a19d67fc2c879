//! Wire format for key events handed to the emulated keyboard.
//!
//! A record is a single `u16`:
//! - bit 15: set for key-down, clear for key-up
//! - bits [7:0]: the keycode shifted left by one with bit 0 forced set
//!
//! The emulated keyboard controller consumes the low byte as-is, so the doubling and the
//! valid bit are part of the contract, not an encoding detail.

use core::fmt;

use crate::layout::key_record::{
    MAX_KEYCODE, PRESSED_BIT, RESERVED_MASK, VALID_BIT, WIRE_CODE_MASK,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EncodedKeyEvent(u16);

impl EncodedKeyEvent {
    /// Encode a 7-bit keycode. Bits above [`MAX_KEYCODE`] are discarded.
    pub const fn from_keycode(keycode: u8, pressed: bool) -> Self {
        let wire = (((keycode & MAX_KEYCODE) as u16) << 1) | VALID_BIT;
        let pressed = if pressed { PRESSED_BIT } else { 0 };
        Self(wire | pressed)
    }

    /// Validate a raw record read back from the ring.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        if raw & VALID_BIT == 0 || raw & RESERVED_MASK != 0 {
            return None;
        }
        Some(Self(raw))
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn is_pressed(self) -> bool {
        self.0 & PRESSED_BIT != 0
    }

    /// The byte handed to the emulated keyboard (`(keycode << 1) | 1`).
    pub const fn wire_code(self) -> u8 {
        (self.0 & WIRE_CODE_MASK) as u8
    }

    /// The un-doubled 7-bit keycode.
    pub const fn keycode(self) -> u8 {
        self.wire_code() >> 1
    }
}

impl fmt::Debug for EncodedKeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedKeyEvent")
            .field("keycode", &format_args!("{:#04x}", self.keycode()))
            .field("pressed", &self.is_pressed())
            .finish()
    }
}

impl From<EncodedKeyEvent> for u16 {
    fn from(ev: EncodedKeyEvent) -> Self {
        ev.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_bit_15_and_doubles_code() {
        let ev = EncodedKeyEvent::from_keycode(0x24, true);
        assert_eq!(ev.raw(), 0x8049);
        assert_eq!(ev.wire_code(), 0x49);
        assert_eq!(ev.keycode(), 0x24);
        assert!(ev.is_pressed());
    }

    #[test]
    fn release_clears_bit_15() {
        let ev = EncodedKeyEvent::from_keycode(0x24, false);
        assert_eq!(ev.raw(), 0x0049);
        assert!(!ev.is_pressed());
    }

    #[test]
    fn keycode_zero_is_still_a_valid_record() {
        // The `A` key is keycode 0 on the target keyboard.
        let ev = EncodedKeyEvent::from_keycode(0x00, true);
        assert_eq!(ev.raw(), 0x8001);
        assert_eq!(EncodedKeyEvent::from_raw(0x8001), Some(ev));
    }

    #[test]
    fn from_raw_rejects_malformed_records() {
        assert_eq!(EncodedKeyEvent::from_raw(0), None);
        assert_eq!(EncodedKeyEvent::from_raw(0x8048), None);
        assert_eq!(EncodedKeyEvent::from_raw(0x0149), None);
    }
}

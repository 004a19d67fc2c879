//! Layout constants for the key event ring and its record format.

/// Number of slots in the key event ring.
///
/// One slot is always left unused so `head == tail` unambiguously means "empty"; at most
/// [`KEY_RING_MAX_LIVE`] events are queued at once.
pub const KEY_RING_SLOTS: usize = 32;

/// Index mask for [`KEY_RING_SLOTS`]. The slot count must stay a power of two.
pub const KEY_RING_MASK: u32 = (KEY_RING_SLOTS as u32) - 1;

/// Maximum number of live entries.
pub const KEY_RING_MAX_LIVE: usize = KEY_RING_SLOTS - 1;

const _: () = assert!(KEY_RING_SLOTS.is_power_of_two());

/// Bit layout of an encoded key event (`u16`).
pub mod key_record {
    /// Set when the record describes a key-down edge.
    pub const PRESSED_BIT: u16 = 1 << 15;
    /// Low byte: `(keycode << 1) | VALID_BIT`.
    pub const WIRE_CODE_MASK: u16 = 0x00FF;
    /// Always set in a well-formed record; the emulated keyboard relies on it.
    pub const VALID_BIT: u16 = 1;
    /// Largest keycode representable in the 7-bit code field.
    pub const MAX_KEYCODE: u8 = 0x7F;
    /// Bits that must be zero in a well-formed record.
    pub const RESERVED_MASK: u16 = !(PRESSED_BIT | WIRE_CODE_MASK);
}

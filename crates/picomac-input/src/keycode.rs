//! Key codes and edge states reported by the keyboard controller.
//!
//! The controller's FIFO yields 16-bit words: the high byte is the key code, the low byte is
//! the [`KeyState`]. Printable keys report their ASCII value (so shifted symbols get their own
//! codes); the rest live in the `0x81..` range.

/// Controller key codes.
pub mod raw_key {
    pub const NONE: u8 = 0x00;

    pub const ALT: u8 = 0xA1;
    pub const LEFT_SHIFT: u8 = 0xA2;
    pub const RIGHT_SHIFT: u8 = 0xA3;
    pub const CONTROL: u8 = 0xA5;

    pub const BACKSPACE: u8 = 0x08;
    pub const TAB: u8 = 0x09;
    pub const ENTER: u8 = 0x0A;
    pub const SPACE: u8 = b' ';

    pub const F1: u8 = 0x81;
    pub const F2: u8 = 0x82;
    pub const F3: u8 = 0x83;
    pub const F4: u8 = 0x84;
    pub const F5: u8 = 0x85;
    pub const F6: u8 = 0x86;
    pub const F7: u8 = 0x87;
    pub const F8: u8 = 0x88;
    pub const F9: u8 = 0x89;
    pub const F10: u8 = 0x90;

    pub const ESC: u8 = 0xB1;
    pub const LEFT: u8 = 0xB4;
    pub const UP: u8 = 0xB5;
    pub const DOWN: u8 = 0xB6;
    pub const RIGHT: u8 = 0xB7;

    pub const CAPS_LOCK: u8 = 0xC1;

    /// Shared by the Break and Pause legends.
    pub const PAUSE: u8 = 0xD0;
    pub const INSERT: u8 = 0xD1;
    pub const HOME: u8 = 0xD2;
    pub const DELETE: u8 = 0xD4;
    pub const END: u8 = 0xD5;
    pub const PAGE_UP: u8 = 0xD6;
    pub const PAGE_DOWN: u8 = 0xD7;

    /// Look up a key by name (`"right_shift"`, `"f1"`, `"up"`, ...) or by its single printable
    /// character. Names are case-insensitive; single characters are taken literally.
    pub fn from_name(name: &str) -> Option<u8> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return (c.is_ascii_graphic() || c == ' ').then_some(c as u8);
        }

        let code = match name.to_ascii_lowercase().replace('-', "_").as_str() {
            "alt" => ALT,
            "left_shift" | "lshift" => LEFT_SHIFT,
            "right_shift" | "rshift" => RIGHT_SHIFT,
            "control" | "ctrl" => CONTROL,
            "backspace" => BACKSPACE,
            "tab" => TAB,
            "enter" | "return" => ENTER,
            "space" => SPACE,
            "f1" => F1,
            "f2" => F2,
            "f3" => F3,
            "f4" => F4,
            "f5" => F5,
            "f6" => F6,
            "f7" => F7,
            "f8" => F8,
            "f9" => F9,
            "f10" => F10,
            "esc" | "escape" => ESC,
            "left" => LEFT,
            "up" => UP,
            "down" => DOWN,
            "right" => RIGHT,
            "caps_lock" => CAPS_LOCK,
            "pause" | "break" => PAUSE,
            "insert" => INSERT,
            "home" => HOME,
            "delete" | "del" => DELETE,
            "end" => END,
            "page_up" => PAGE_UP,
            "page_down" => PAGE_DOWN,
            _ => return None,
        };
        Some(code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Idle,
    Pressed,
    Hold,
    Released,
    LongHold,
}

impl KeyState {
    /// Unknown values are treated as [`KeyState::Idle`] so they never produce edges.
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => KeyState::Pressed,
            2 => KeyState::Hold,
            3 => KeyState::Released,
            4 => KeyState::LongHold,
            _ => KeyState::Idle,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            KeyState::Idle => 0,
            KeyState::Pressed => 1,
            KeyState::Hold => 2,
            KeyState::Released => 3,
            KeyState::LongHold => 4,
        }
    }

    /// `Some(pressed)` for clean press/release edges, `None` for everything else.
    pub fn edge(self) -> Option<bool> {
        match self {
            KeyState::Pressed => Some(true),
            KeyState::Released => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKeyEvent {
    pub code: u8,
    pub state: KeyState,
}

impl RawKeyEvent {
    pub const fn new(code: u8, state: KeyState) -> Self {
        Self { code, state }
    }

    pub const fn pressed(code: u8) -> Self {
        Self::new(code, KeyState::Pressed)
    }

    pub const fn released(code: u8) -> Self {
        Self::new(code, KeyState::Released)
    }

    /// Decode a controller FIFO word. Returns `None` for the empty-FIFO word (code 0).
    pub fn from_fifo_word(word: u16) -> Option<Self> {
        let code = (word >> 8) as u8;
        if code == raw_key::NONE {
            return None;
        }
        Some(Self {
            code,
            state: KeyState::from_u8((word & 0xFF) as u8),
        })
    }

    pub fn to_fifo_word(self) -> u16 {
        (u16::from(self.code) << 8) | u16::from(self.state.to_u8())
    }
}

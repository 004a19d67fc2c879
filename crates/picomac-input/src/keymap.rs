//! Controller key code to Macintosh keycode translation.
//!
//! The controller reports shifted symbols as distinct codes (`'!'` vs `'1'`), while the Mac
//! expects the physical key plus a separate Shift edge. Both codes therefore map to the same
//! Mac key; the user's shift key is forwarded on its own.

use picomac_ipc::EncodedKeyEvent;

use crate::keycode::raw_key;

/// 7-bit Macintosh keyboard keycode, as consumed by the emulated keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacKeyCode(u8);

impl MacKeyCode {
    pub const A: Self = Self(0x00);
    pub const S: Self = Self(0x01);
    pub const D: Self = Self(0x02);
    pub const F: Self = Self(0x03);
    pub const H: Self = Self(0x04);
    pub const G: Self = Self(0x05);
    pub const Z: Self = Self(0x06);
    pub const X: Self = Self(0x07);
    pub const C: Self = Self(0x08);
    pub const V: Self = Self(0x09);
    pub const B: Self = Self(0x0B);
    pub const Q: Self = Self(0x0C);
    pub const W: Self = Self(0x0D);
    pub const E: Self = Self(0x0E);
    pub const R: Self = Self(0x0F);
    pub const Y: Self = Self(0x10);
    pub const T: Self = Self(0x11);
    pub const DIGIT_1: Self = Self(0x12);
    pub const DIGIT_2: Self = Self(0x13);
    pub const DIGIT_3: Self = Self(0x14);
    pub const DIGIT_4: Self = Self(0x15);
    pub const DIGIT_6: Self = Self(0x16);
    pub const DIGIT_5: Self = Self(0x17);
    pub const EQUAL: Self = Self(0x18);
    pub const DIGIT_9: Self = Self(0x19);
    pub const DIGIT_7: Self = Self(0x1A);
    pub const MINUS: Self = Self(0x1B);
    pub const DIGIT_8: Self = Self(0x1C);
    pub const DIGIT_0: Self = Self(0x1D);
    pub const RIGHT_BRACKET: Self = Self(0x1E);
    pub const O: Self = Self(0x1F);
    pub const U: Self = Self(0x20);
    pub const LEFT_BRACKET: Self = Self(0x21);
    pub const I: Self = Self(0x22);
    pub const P: Self = Self(0x23);
    pub const RETURN: Self = Self(0x24);
    pub const L: Self = Self(0x25);
    pub const J: Self = Self(0x26);
    pub const QUOTE: Self = Self(0x27);
    pub const K: Self = Self(0x28);
    pub const SEMICOLON: Self = Self(0x29);
    pub const BACKSLASH: Self = Self(0x2A);
    pub const COMMA: Self = Self(0x2B);
    pub const SLASH: Self = Self(0x2C);
    pub const N: Self = Self(0x2D);
    pub const M: Self = Self(0x2E);
    pub const PERIOD: Self = Self(0x2F);
    pub const TAB: Self = Self(0x30);
    pub const SPACE: Self = Self(0x31);
    pub const GRAVE: Self = Self(0x32);
    pub const BACKSPACE: Self = Self(0x33);
    pub const ESCAPE: Self = Self(0x35);
    pub const COMMAND: Self = Self(0x37);
    pub const SHIFT: Self = Self(0x38);
    pub const CAPS_LOCK: Self = Self(0x39);
    pub const OPTION: Self = Self(0x3A);
    pub const CONTROL: Self = Self(0x3B);
    pub const F5: Self = Self(0x60);
    pub const F6: Self = Self(0x61);
    pub const F7: Self = Self(0x62);
    pub const F3: Self = Self(0x63);
    pub const F8: Self = Self(0x64);
    pub const F9: Self = Self(0x65);
    pub const F10: Self = Self(0x6D);
    pub const PAUSE: Self = Self(0x71);
    pub const HOME: Self = Self(0x73);
    pub const PAGE_UP: Self = Self(0x74);
    pub const F4: Self = Self(0x76);
    pub const END: Self = Self(0x77);
    pub const F2: Self = Self(0x78);
    pub const PAGE_DOWN: Self = Self(0x79);
    pub const F1: Self = Self(0x7A);
    pub const LEFT: Self = Self(0x7B);
    pub const RIGHT: Self = Self(0x7C);
    pub const DOWN: Self = Self(0x7D);
    pub const UP: Self = Self(0x7E);

    pub const fn code(self) -> u8 {
        self.0
    }

    pub const fn encode(self, pressed: bool) -> EncodedKeyEvent {
        EncodedKeyEvent::from_keycode(self.0, pressed)
    }
}

/// Translate a controller key code. Codes without a Mac counterpart return `None` and are
/// dropped by the caller.
pub fn map_raw_key(code: u8) -> Option<MacKeyCode> {
    let key = match code {
        raw_key::ALT => MacKeyCode::OPTION,
        raw_key::LEFT_SHIFT => MacKeyCode::SHIFT,
        raw_key::RIGHT_SHIFT => MacKeyCode::COMMAND,
        raw_key::CONTROL => MacKeyCode::CONTROL,

        b'a' | b'A' => MacKeyCode::A,
        b'b' | b'B' => MacKeyCode::B,
        b'c' | b'C' => MacKeyCode::C,
        b'd' | b'D' => MacKeyCode::D,
        b'e' | b'E' => MacKeyCode::E,
        b'f' | b'F' => MacKeyCode::F,
        b'g' | b'G' => MacKeyCode::G,
        b'h' | b'H' => MacKeyCode::H,
        b'i' | b'I' => MacKeyCode::I,
        b'j' | b'J' => MacKeyCode::J,
        b'k' | b'K' => MacKeyCode::K,
        b'l' | b'L' => MacKeyCode::L,
        b'm' | b'M' => MacKeyCode::M,
        b'n' | b'N' => MacKeyCode::N,
        b'o' | b'O' => MacKeyCode::O,
        b'p' | b'P' => MacKeyCode::P,
        b'q' | b'Q' => MacKeyCode::Q,
        b'r' | b'R' => MacKeyCode::R,
        b's' | b'S' => MacKeyCode::S,
        b't' | b'T' => MacKeyCode::T,
        b'u' | b'U' => MacKeyCode::U,
        b'v' | b'V' => MacKeyCode::V,
        b'w' | b'W' => MacKeyCode::W,
        b'x' | b'X' => MacKeyCode::X,
        b'y' | b'Y' => MacKeyCode::Y,
        b'z' | b'Z' => MacKeyCode::Z,

        b'0' | b'(' => MacKeyCode::DIGIT_0,
        b'1' | b'!' => MacKeyCode::DIGIT_1,
        b'2' | b'@' => MacKeyCode::DIGIT_2,
        b'3' | b'#' => MacKeyCode::DIGIT_3,
        b'4' | b'$' => MacKeyCode::DIGIT_4,
        b'5' | b'%' => MacKeyCode::DIGIT_5,
        b'6' | b'^' => MacKeyCode::DIGIT_6,
        b'7' | b'&' => MacKeyCode::DIGIT_7,
        b'8' | b'*' => MacKeyCode::DIGIT_8,
        b'9' | b')' => MacKeyCode::DIGIT_9,

        b' ' => MacKeyCode::SPACE,
        b'`' | b'~' => MacKeyCode::GRAVE,
        b'=' | b'+' => MacKeyCode::EQUAL,
        b'-' | b'_' => MacKeyCode::MINUS,
        b'\\' | b'|' => MacKeyCode::BACKSLASH,
        b'.' | b'>' => MacKeyCode::PERIOD,
        b',' | b'<' => MacKeyCode::COMMA,
        b';' | b':' => MacKeyCode::SEMICOLON,
        b'\'' | b'"' => MacKeyCode::QUOTE,
        b'/' | b'?' => MacKeyCode::SLASH,
        b']' | b'}' => MacKeyCode::RIGHT_BRACKET,
        b'[' | b'{' => MacKeyCode::LEFT_BRACKET,

        raw_key::BACKSPACE | raw_key::DELETE => MacKeyCode::BACKSPACE,
        raw_key::ENTER => MacKeyCode::RETURN,
        raw_key::TAB => MacKeyCode::TAB,
        raw_key::ESC => MacKeyCode::ESCAPE,
        raw_key::CAPS_LOCK => MacKeyCode::CAPS_LOCK,
        raw_key::PAUSE => MacKeyCode::PAUSE,
        raw_key::HOME => MacKeyCode::HOME,
        raw_key::END => MacKeyCode::END,
        raw_key::PAGE_UP => MacKeyCode::PAGE_UP,
        raw_key::PAGE_DOWN => MacKeyCode::PAGE_DOWN,

        raw_key::F1 => MacKeyCode::F1,
        raw_key::F2 => MacKeyCode::F2,
        raw_key::F3 => MacKeyCode::F3,
        raw_key::F4 => MacKeyCode::F4,
        raw_key::F5 => MacKeyCode::F5,
        raw_key::F6 => MacKeyCode::F6,
        raw_key::F7 => MacKeyCode::F7,
        raw_key::F8 => MacKeyCode::F8,
        raw_key::F9 => MacKeyCode::F9,
        raw_key::F10 => MacKeyCode::F10,

        raw_key::LEFT => MacKeyCode::LEFT,
        raw_key::RIGHT => MacKeyCode::RIGHT,
        raw_key::UP => MacKeyCode::UP,
        raw_key::DOWN => MacKeyCode::DOWN,

        _ => return None,
    };
    Some(key)
}

/// Translate and encode a key edge in one step.
pub fn encode_raw_key(code: u8, pressed: bool) -> Option<EncodedKeyEvent> {
    map_raw_key(code).map(|key| key.encode(pressed))
}

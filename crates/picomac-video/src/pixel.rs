use std::fmt;

/// Native pixel encoding of a physical panel.
///
/// The emulated screen only ever produces black and white; `to_rgb8`/`from_rgb8` exist for host
/// tooling (PNG dumps, overlays).
pub trait PixelFormat {
    type Pixel: Copy + Default + PartialEq + fmt::Debug;

    const BLACK: Self::Pixel;
    const WHITE: Self::Pixel;

    fn to_rgb8(pixel: Self::Pixel) -> [u8; 3];
    fn from_rgb8(rgb: [u8; 3]) -> Self::Pixel;
}

/// 16-bit 5:6:5 RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb565;

impl PixelFormat for Rgb565 {
    type Pixel = u16;

    const BLACK: u16 = 0x0000;
    const WHITE: u16 = 0xFFFF;

    fn to_rgb8(pixel: u16) -> [u8; 3] {
        let r = ((pixel >> 11) & 0x1F) as u8;
        let g = ((pixel >> 5) & 0x3F) as u8;
        let b = (pixel & 0x1F) as u8;
        // Replicate the high bits so full intensity maps to 0xFF.
        [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
    }

    fn from_rgb8([r, g, b]: [u8; 3]) -> u16 {
        (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
    }
}

/// 3-bit packed RGB (`0b0000_0RGB`), one bit per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb111;

impl PixelFormat for Rgb111 {
    type Pixel = u8;

    const BLACK: u8 = 0b000;
    const WHITE: u8 = 0b111;

    fn to_rgb8(pixel: u8) -> [u8; 3] {
        let on = |bit: u8| if pixel & bit != 0 { 0xFF } else { 0x00 };
        [on(0b100), on(0b010), on(0b001)]
    }

    fn from_rgb8([r, g, b]: [u8; 3]) -> u8 {
        (u8::from(r != 0) << 2) | (u8::from(g != 0) << 1) | u8::from(b != 0)
    }
}

/// Expand `out.len()` pixels of a packed 1bpp row, starting `bit_offset` pixels into `src`.
///
/// Bit 7 of each byte is the leftmost pixel. A set bit is black. Pixels past the end of `src`
/// are left untouched.
pub fn expand_row<P: PixelFormat>(src: &[u8], bit_offset: usize, out: &mut [P::Pixel]) {
    for (i, px) in out.iter_mut().enumerate() {
        let bit = bit_offset + i;
        let Some(&byte) = src.get(bit / 8) else {
            break;
        };
        *px = if byte & (0x80 >> (bit % 8)) != 0 {
            P::BLACK
        } else {
            P::WHITE
        };
    }
}

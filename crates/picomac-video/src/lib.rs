//! Scan-out of the emulated Macintosh's 1bpp framebuffer onto the handheld's 320×320 LCD.
//!
//! The emulated screen (the "virtual screen", 640×480 by default) is larger than the panel, so
//! [`ViewportTracker`] pans a visible window over it to follow the emulated mouse. Each frame
//! [`Scanout::render_frame`] expands the visible rows through a [`PixelFormat`] and hands them to
//! a [`Display`] one row at a time.

mod display;
mod guest_ram;
mod pixel;
mod scanout;
mod viewport;

pub use display::{Display, MemoryDisplay};
pub use guest_ram::GuestRam;
pub use pixel::{expand_row, PixelFormat, Rgb111, Rgb565};
pub use scanout::Scanout;
pub use viewport::{GeometryError, ScreenGeometry, ViewportTracker, MAX_VIRTUAL_DIMENSION};

/// Guest address of the mouse X coordinate (big-endian signed word).
pub const MOUSE_X_ADDR: u32 = 0x82A;
/// Guest address of the mouse Y coordinate (big-endian signed word).
pub const MOUSE_Y_ADDR: u32 = 0x828;

pub const VISIBLE_WIDTH: u32 = 320;
pub const VISIBLE_HEIGHT: u32 = 320;
pub const DEFAULT_VIRTUAL_WIDTH: u32 = 640;
pub const DEFAULT_VIRTUAL_HEIGHT: u32 = 480;

/// Rows drawn between calls to the input poll hook.
pub const ROWS_PER_POLL: u32 = 80;

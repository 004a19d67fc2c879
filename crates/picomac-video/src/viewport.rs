//! Auto-panning of the visible window over the virtual screen.
//!
//! The window only moves while the pointer is outside it (or inside the `margin` band along
//! an edge), and then by one pixel per axis per frame. It never jumps to re-centre.

use picomac_shared::ViewportOffset;
use thiserror::Error;

use crate::{DEFAULT_VIRTUAL_HEIGHT, DEFAULT_VIRTUAL_WIDTH, VISIBLE_HEIGHT, VISIBLE_WIDTH};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("screen dimensions must be non-zero")]
    ZeroDimension,

    #[error("visible window {visible_width}x{visible_height} exceeds virtual screen {virtual_width}x{virtual_height}")]
    VisibleExceedsVirtual {
        visible_width: u32,
        visible_height: u32,
        virtual_width: u32,
        virtual_height: u32,
    },

    #[error("virtual screen {width}x{height} exceeds the {max} pixel pointer range")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("virtual screen width {0} is not a multiple of 8")]
    UnalignedWidth(u32),

    #[error("margin {margin} leaves no room in a {visible_width}x{visible_height} window")]
    MarginTooLarge {
        margin: u32,
        visible_width: u32,
        visible_height: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub virtual_width: u32,
    pub virtual_height: u32,
    pub visible_width: u32,
    pub visible_height: u32,
    /// Distance from a window edge at which panning starts.
    pub margin: u32,
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self {
            virtual_width: DEFAULT_VIRTUAL_WIDTH,
            virtual_height: DEFAULT_VIRTUAL_HEIGHT,
            visible_width: VISIBLE_WIDTH,
            visible_height: VISIBLE_HEIGHT,
            margin: 0,
        }
    }
}

/// Largest virtual dimension the emulated mouse can address; its coordinates are signed 16-bit.
pub const MAX_VIRTUAL_DIMENSION: u32 = i16::MAX as u32;

impl ScreenGeometry {
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.virtual_width == 0
            || self.virtual_height == 0
            || self.visible_width == 0
            || self.visible_height == 0
        {
            return Err(GeometryError::ZeroDimension);
        }
        if self.virtual_width > MAX_VIRTUAL_DIMENSION || self.virtual_height > MAX_VIRTUAL_DIMENSION {
            return Err(GeometryError::TooLarge {
                width: self.virtual_width,
                height: self.virtual_height,
                max: MAX_VIRTUAL_DIMENSION,
            });
        }
        if self.visible_width > self.virtual_width || self.visible_height > self.virtual_height {
            return Err(GeometryError::VisibleExceedsVirtual {
                visible_width: self.visible_width,
                visible_height: self.visible_height,
                virtual_width: self.virtual_width,
                virtual_height: self.virtual_height,
            });
        }
        if self.virtual_width % 8 != 0 {
            return Err(GeometryError::UnalignedWidth(self.virtual_width));
        }
        if self.margin.saturating_mul(2) >= self.visible_width.min(self.visible_height) {
            return Err(GeometryError::MarginTooLarge {
                margin: self.margin,
                visible_width: self.visible_width,
                visible_height: self.visible_height,
            });
        }
        Ok(())
    }

    pub fn max_offset(&self) -> ViewportOffset {
        ViewportOffset {
            x: (self.virtual_width - self.visible_width) as i32,
            y: (self.virtual_height - self.visible_height) as i32,
        }
    }

    /// Bytes per row of the packed 1bpp framebuffer.
    pub fn stride(&self) -> usize {
        self.virtual_width as usize / 8
    }

    pub fn framebuffer_len(&self) -> usize {
        self.stride() * self.virtual_height as usize
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.virtual_width && (y as u32) < self.virtual_height
    }
}

#[derive(Debug, Clone)]
pub struct ViewportTracker {
    geometry: ScreenGeometry,
    offset: ViewportOffset,
}

impl ViewportTracker {
    pub fn new(geometry: ScreenGeometry) -> Result<Self, GeometryError> {
        geometry.validate()?;
        Ok(Self {
            geometry,
            offset: ViewportOffset::default(),
        })
    }

    pub fn geometry(&self) -> &ScreenGeometry {
        &self.geometry
    }

    pub fn offset(&self) -> ViewportOffset {
        self.offset
    }

    /// Step toward keeping (`x`, `y`) visible. Pointers outside the virtual screen are ignored.
    /// Returns `true` if the offset moved.
    pub fn follow(&mut self, x: i32, y: i32) -> bool {
        if !self.geometry.contains(x, y) {
            return false;
        }

        let g = &self.geometry;
        let max = g.max_offset();
        let next = ViewportOffset {
            x: step_axis(self.offset.x, x, g.visible_width as i32, g.margin as i32, max.x),
            y: step_axis(self.offset.y, y, g.visible_height as i32, g.margin as i32, max.y),
        };
        let moved = next != self.offset;
        self.offset = next;
        moved
    }
}

fn step_axis(offset: i32, pos: i32, visible: i32, margin: i32, max: i32) -> i32 {
    if pos >= offset + visible - margin && offset < max {
        offset + 1
    } else if pos < offset + margin && offset > 0 {
        offset - 1
    } else {
        offset
    }
}

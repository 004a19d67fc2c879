use std::sync::Arc;

use picomac_shared::{SharedViewport, ViewportOffset};

use crate::display::Display;
use crate::guest_ram::GuestRam;
use crate::pixel::{expand_row, PixelFormat};
use crate::viewport::{GeometryError, ScreenGeometry, ViewportTracker};
use crate::{MOUSE_X_ADDR, MOUSE_Y_ADDR, ROWS_PER_POLL};

/// Repaints the panel from guest RAM. Owned by the scan-out context, which is the only writer of
/// the [`SharedViewport`] it publishes to.
pub struct Scanout<P: PixelFormat> {
    tracker: ViewportTracker,
    framebuffer: Option<u32>,
    viewport: Arc<SharedViewport>,
    rows_per_poll: u32,
    row: Vec<P::Pixel>,
    frames: u64,
}

impl<P: PixelFormat> Scanout<P> {
    pub fn new(geometry: ScreenGeometry, viewport: Arc<SharedViewport>) -> Result<Self, GeometryError> {
        let tracker = ViewportTracker::new(geometry)?;
        viewport.store(tracker.offset());
        Ok(Self {
            tracker,
            framebuffer: None,
            viewport,
            rows_per_poll: ROWS_PER_POLL,
            row: vec![P::WHITE; geometry.visible_width as usize],
            frames: 0,
        })
    }

    /// Set the guest address of the packed 1bpp framebuffer. Until this is called, rendering is
    /// a no-op.
    pub fn attach_framebuffer(&mut self, addr: u32) {
        tracing::info!(addr = format_args!("{addr:#x}"), "framebuffer attached");
        self.framebuffer = Some(addr);
    }

    /// Rows drawn between calls to the poll hook. Zero disables the hook.
    pub fn set_rows_per_poll(&mut self, rows: u32) {
        self.rows_per_poll = rows;
    }

    pub fn geometry(&self) -> &ScreenGeometry {
        self.tracker.geometry()
    }

    pub fn offset(&self) -> ViewportOffset {
        self.tracker.offset()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one full scan-out pass. `poll` is called after every `rows_per_poll` rows.
    ///
    /// Returns `false` without touching the display when no framebuffer is attached or guest RAM
    /// does not cover it.
    pub fn render_frame<R, D>(&mut self, ram: &R, display: &mut D, mut poll: impl FnMut()) -> bool
    where
        R: GuestRam + ?Sized,
        D: Display<P> + ?Sized,
    {
        let Some(base) = self.framebuffer else {
            return false;
        };
        let geometry = *self.tracker.geometry();
        let Some(fb) = ram.read_bytes(base, geometry.framebuffer_len()) else {
            tracing::debug!(
                base = format_args!("{base:#x}"),
                len = geometry.framebuffer_len(),
                "framebuffer outside guest RAM"
            );
            return false;
        };

        if let (Some(x), Some(y)) = (ram.read_u16_be(MOUSE_X_ADDR), ram.read_u16_be(MOUSE_Y_ADDR)) {
            if self.tracker.follow(i32::from(x as i16), i32::from(y as i16)) {
                tracing::trace!(offset = ?self.tracker.offset(), "viewport moved");
            }
        }
        let offset = self.tracker.offset();
        self.viewport.store(offset);

        let stride = geometry.stride();
        for y in 0..geometry.visible_height {
            let src_row = (offset.y as usize + y as usize) * stride;
            expand_row::<P>(&fb[src_row..src_row + stride], offset.x as usize, &mut self.row);
            display.draw_row(&self.row, 0, y, geometry.visible_width, 1);

            if self.rows_per_poll != 0 && (y + 1) % self.rows_per_poll == 0 {
                poll();
            }
        }

        self.frames += 1;
        true
    }
}

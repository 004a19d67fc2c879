use std::sync::Arc;

use picomac_shared::{SharedViewport, ViewportOffset};
use picomac_video::{
    Display, GuestRam, MemoryDisplay, Rgb111, Rgb565, Scanout, ScreenGeometry, ViewportTracker,
    MOUSE_X_ADDR, MOUSE_Y_ADDR,
};
use proptest::prelude::*;

const FB: u32 = 0x4000;

struct Guest {
    ram: Vec<u8>,
    geometry: ScreenGeometry,
}

impl Guest {
    fn new() -> Self {
        let geometry = ScreenGeometry::default();
        Self {
            ram: vec![0; FB as usize + geometry.framebuffer_len()],
            geometry,
        }
    }

    fn set_pointer(&mut self, x: u16, y: u16) {
        self.ram[MOUSE_X_ADDR as usize..][..2].copy_from_slice(&x.to_be_bytes());
        self.ram[MOUSE_Y_ADDR as usize..][..2].copy_from_slice(&y.to_be_bytes());
    }

    fn set_black(&mut self, x: u32, y: u32) {
        let idx = FB as usize + y as usize * self.geometry.stride() + x as usize / 8;
        self.ram[idx] |= 0x80 >> (x % 8);
    }
}

impl GuestRam for Guest {
    fn read_bytes(&self, addr: u32, len: usize) -> Option<&[u8]> {
        self.ram.read_bytes(addr, len)
    }
}

#[test]
fn pointer_at_right_edge_pans_to_clamp_one_step_per_frame() {
    let mut guest = Guest::new();
    guest.set_pointer(639, 0);
    let shared = Arc::new(SharedViewport::new());
    let mut scanout = Scanout::<Rgb565>::new(guest.geometry, Arc::clone(&shared)).unwrap();
    scanout.attach_framebuffer(FB);
    let mut lcd = MemoryDisplay::<Rgb565>::new(320, 320);

    let mut last = 0;
    for _ in 0..400 {
        assert!(scanout.render_frame(&guest, &mut lcd, || {}));
        let x = shared.load().x;
        assert!(x == last || x == last + 1, "jumped from {last} to {x}");
        assert!(x <= 320);
        last = x;
    }
    assert_eq!(shared.load(), ViewportOffset { x: 320, y: 0 });
}

#[test]
fn panned_frame_shows_the_right_columns() {
    let mut guest = Guest::new();
    for y in 0..480 {
        guest.set_black(150, y);
    }
    guest.set_pointer(639, 0);

    let mut scanout = Scanout::<Rgb111>::new(guest.geometry, Arc::new(SharedViewport::new())).unwrap();
    scanout.attach_framebuffer(FB);
    let mut lcd = MemoryDisplay::<Rgb111>::new(320, 320);
    for _ in 0..103 {
        scanout.render_frame(&guest, &mut lcd, || {});
    }
    assert_eq!(scanout.offset().x, 103);

    for y in [0, 160, 319] {
        let row = lcd.row(y).unwrap();
        for (x, &px) in row.iter().enumerate() {
            let expected = if x == 47 { 0 } else { 7 };
            assert_eq!(px, expected, "x={x} y={y}");
        }
    }
}

#[test]
fn poll_hook_interleaves_with_rows() {
    let mut guest = Guest::new();
    guest.set_pointer(0, 0);
    let mut scanout = Scanout::<Rgb565>::new(guest.geometry, Arc::new(SharedViewport::new())).unwrap();
    scanout.attach_framebuffer(FB);

    let mut lcd = MemoryDisplay::<Rgb565>::new(320, 320);
    let mut rows_at_poll = Vec::new();
    {
        // The hook observes how many rows were already on the panel.
        let calls = std::cell::Cell::new(0usize);
        struct Counting<'a> {
            inner: &'a mut MemoryDisplay<Rgb565>,
            calls: &'a std::cell::Cell<usize>,
        }
        impl Display<Rgb565> for Counting<'_> {
            fn draw_row(&mut self, pixels: &[u16], x: u32, y: u32, w: u32, h: u32) {
                self.calls.set(self.calls.get() + 1);
                self.inner.draw_row(pixels, x, y, w, h);
            }
        }
        let mut display = Counting {
            inner: &mut lcd,
            calls: &calls,
        };
        scanout.render_frame(&guest, &mut display, || rows_at_poll.push(calls.get()));
    }
    assert_eq!(rows_at_poll, vec![80, 160, 240, 320]);
}

proptest! {
    #[test]
    fn viewport_stays_in_bounds_and_moves_at_most_one_step(
        pointers in prop::collection::vec((-50i32..700, -50i32..530), 1..200)
    ) {
        let mut t = ViewportTracker::new(ScreenGeometry::default()).unwrap();
        let max = ScreenGeometry::default().max_offset();
        for (x, y) in pointers {
            let before = t.offset();
            t.follow(x, y);
            let after = t.offset();
            prop_assert!((0..=max.x).contains(&after.x));
            prop_assert!((0..=max.y).contains(&after.y));
            prop_assert!((after.x - before.x).abs() <= 1);
            prop_assert!((after.y - before.y).abs() <= 1);
        }
    }
}

use crate::pixel::PixelFormat;

/// Physical panel capability: blit a rectangle of native pixels.
///
/// `pixels` holds `width * height` values in row-major order.
pub trait Display<P: PixelFormat> {
    fn draw_row(&mut self, pixels: &[P::Pixel], x: u32, y: u32, width: u32, height: u32);
}

impl<P: PixelFormat, D: Display<P> + ?Sized> Display<P> for &mut D {
    fn draw_row(&mut self, pixels: &[P::Pixel], x: u32, y: u32, width: u32, height: u32) {
        (**self).draw_row(pixels, x, y, width, height);
    }
}

/// Panel backed by a host buffer. Draws outside the panel are clipped.
#[derive(Debug, Clone)]
pub struct MemoryDisplay<P: PixelFormat> {
    width: u32,
    height: u32,
    pixels: Vec<P::Pixel>,
    draw_calls: usize,
}

impl<P: PixelFormat> MemoryDisplay<P> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![P::Pixel::default(); width as usize * height as usize],
            draw_calls: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn pixels(&self) -> &[P::Pixel] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<P::Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn row(&self, y: u32) -> Option<&[P::Pixel]> {
        if y >= self.height {
            return None;
        }
        let w = self.width as usize;
        let start = y as usize * w;
        self.pixels.get(start..start + w)
    }

    /// Packed RGB8 copy of the panel, suitable for image encoders.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|&p| P::to_rgb8(p)).collect()
    }
}

impl<P: PixelFormat> Display<P> for MemoryDisplay<P> {
    fn draw_row(&mut self, pixels: &[P::Pixel], x: u32, y: u32, width: u32, height: u32) {
        self.draw_calls += 1;
        let w = width as usize;
        if w == 0 {
            return;
        }
        for (dy, src_row) in pixels.chunks(w).take(height as usize).enumerate() {
            let py = y as usize + dy;
            if py >= self.height as usize {
                break;
            }
            let px = x as usize;
            if px >= self.width as usize {
                continue;
            }
            let n = src_row.len().min(self.width as usize - px);
            let dst = py * self.width as usize + px;
            self.pixels[dst..dst + n].copy_from_slice(&src_row[..n]);
        }
    }
}

use mandelzoom_core::{PixelPoint, PixelSize};

use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::palette::Rgb;

/// An RGBA framebuffer that plays the role of a window surface.
///
/// Drawing writes into `pixels`; [`present`](Canvas::present) only bumps the
/// frame counter, so whoever owns the buffer decides how a frame reaches the
/// screen (or a test).
#[derive(Debug, Clone)]
pub struct RenderBuffer {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, 4 bytes per pixel, row-major order.
    pub pixels: Vec<u8>,
    frames_presented: u64,
}

impl RenderBuffer {
    /// Create a new buffer filled with black (opaque).
    pub fn new(size: PixelSize) -> Self {
        let mut pixels = vec![0u8; size.pixel_count() * 4];
        for chunk in pixels.chunks_exact_mut(4) {
            chunk[3] = 255;
        }
        Self {
            width: size.width,
            height: size.height,
            pixels,
            frames_presented: 0,
        }
    }

    /// Validate the dimensions before allocating.
    pub fn try_new(width: u32, height: u32) -> crate::Result<Self> {
        let size = PixelSize::new(width, height)?;
        if size.pixel_count().checked_mul(4).is_none() {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self::new(size))
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    /// RGBA value at `p`, or `None` outside the buffer.
    pub fn pixel(&self, p: PixelPoint) -> Option<[u8; 4]> {
        self.index(p.x, p.y).map(|i| {
            let mut px = [0u8; 4];
            px.copy_from_slice(&self.pixels[i..i + 4]);
            px
        })
    }

    /// How many times [`present`](Canvas::present) has been called.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Canvas for RenderBuffer {
    fn size(&self) -> PixelSize {
        PixelSize {
            width: self.width,
            height: self.height,
        }
    }

    fn clear(&mut self) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&Rgb::BLACK.to_rgba());
        }
    }

    #[inline]
    fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i..i + 4].copy_from_slice(&color.to_rgba());
        }
    }

    fn present(&mut self) {
        self.frames_presented += 1;
    }
}

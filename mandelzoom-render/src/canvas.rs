use mandelzoom_core::{PixelPoint, PixelSize};

use crate::palette::Rgb;

/// The drawing surface the plot controller renders into.
///
/// Implementations only need the three primitives; drawing order matches the
/// sample grid, and nothing is visible until [`present`](Self::present).
pub trait Canvas {
    fn size(&self) -> PixelSize;

    /// Fill the whole surface with black.
    fn clear(&mut self);

    /// Set one pixel. Coordinates outside the surface are ignored.
    fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb);

    /// Make everything drawn since the last present visible.
    fn present(&mut self);

    /// Outline the axis-aligned rectangle spanned by two corners.
    fn draw_rect_outline(&mut self, a: PixelPoint, b: PixelPoint, color: Rgb) {
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        for x in x0..=x1 {
            self.draw_pixel(x, y0, color);
            self.draw_pixel(x, y1, color);
        }
        for y in y0..=y1 {
            self.draw_pixel(x0, y, color);
            self.draw_pixel(x1, y, color);
        }
    }
}

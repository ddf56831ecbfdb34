use crate::complex::Complex;
use crate::plane::{PixelSize, PlaneRect};
use crate::real::Real;

/// Integer pixel coordinate, `(0, 0)` at the top-left.
///
/// Signed because samples on the far edge of the plane rectangle can land one
/// step past the viewport, and selection outlines may be partly off-screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Fractional screen coordinate, before snapping to a pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPos {
    pub x: f64,
    pub y: f64,
}

impl ScreenPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest integer pixel.
    #[inline]
    pub fn to_pixel(self) -> PixelPoint {
        PixelPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl From<PixelPoint> for ScreenPos {
    fn from(p: PixelPoint) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// Affine map between the plane rectangle and the pixel viewport.
///
/// `min.re` sits on screen column 0 and `max.re` on column `width`; `max.im`
/// sits on row 0 and `min.im` on row `height`, so increasing pixel-y moves
/// down the imaginary axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper<R = f64> {
    rect: PlaneRect<R>,
    size: PixelSize,
}

impl<R: Real> CoordinateMapper<R> {
    /// `rect` must have non-zero extent on both axes.
    pub fn new(rect: PlaneRect<R>, size: PixelSize) -> Self {
        debug_assert!(!rect.is_degenerate(), "plane rectangle has zero extent");
        Self { rect, size }
    }

    /// Validating constructor for rectangles that come from outside the
    /// controller (configuration, tests).
    pub fn try_new(rect: PlaneRect<R>, size: PixelSize) -> crate::Result<Self> {
        rect.ensure_non_degenerate()?;
        Ok(Self { rect, size })
    }

    pub fn rect(&self) -> &PlaneRect<R> {
        &self.rect
    }

    pub fn size(&self) -> PixelSize {
        self.size
    }

    /// Map a plane point to fractional screen coordinates.
    #[inline]
    pub fn plane_to_screen(&self, p: Complex<R>) -> ScreenPos {
        let w = R::from_f64(self.size.width as f64);
        let h = R::from_f64(self.size.height as f64);
        let x = w * (p.re - self.rect.min.re) / self.rect.width();
        let y = h * (self.rect.max.im - p.im) / self.rect.height();
        ScreenPos::new(x.to_f64(), y.to_f64())
    }

    /// Map a plane point straight to the nearest pixel.
    #[inline]
    pub fn plane_to_pixel(&self, p: Complex<R>) -> PixelPoint {
        self.plane_to_screen(p).to_pixel()
    }

    /// Map screen coordinates back onto the plane.
    pub fn screen_to_plane(&self, q: ScreenPos) -> Complex<R> {
        let w = R::from_f64(self.size.width as f64);
        let h = R::from_f64(self.size.height as f64);
        Complex::new(
            self.rect.min.re + self.rect.width() * R::from_f64(q.x) / w,
            self.rect.max.im - self.rect.height() * R::from_f64(q.y) / h,
        )
    }

    pub fn pixel_to_plane(&self, q: PixelPoint) -> Complex<R> {
        self.screen_to_plane(q.into())
    }
}

use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::CoreError;
use crate::real::Real;

/// Size of the pixel viewport the plot is drawn into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> crate::Result<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("dimensions must be > 0, got {width}×{height}"),
            });
        }
        Ok(Self { width, height })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// The visible bounding rectangle on the complex plane.
///
/// Always normalised: `max.re >= min.re` and `max.im >= min.im`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneRect<R = f64> {
    pub max: Complex<R>,
    pub min: Complex<R>,
}

impl<R: Real> PlaneRect<R> {
    /// Build a rectangle from two arbitrary opposite corners.
    ///
    /// Corner order does not matter; the componentwise max and min are taken.
    pub fn from_corners(a: Complex<R>, b: Complex<R>) -> Self {
        Self {
            max: Complex::new(a.re.max(b.re), a.im.max(b.im)),
            min: Complex::new(a.re.min(b.re), a.im.min(b.im)),
        }
    }

    /// Extent along the real axis.
    #[inline]
    pub fn width(&self) -> R {
        self.max.re - self.min.re
    }

    /// Extent along the imaginary axis.
    #[inline]
    pub fn height(&self) -> R {
        self.max.im - self.min.im
    }

    /// `true` when either extent is zero, i.e. the rectangle cannot be mapped
    /// onto a pixel viewport.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > R::ZERO && self.height() > R::ZERO)
    }

    /// Fails with [`CoreError::DegenerateRect`] if either extent is zero.
    pub fn ensure_non_degenerate(&self) -> crate::Result<()> {
        if self.is_degenerate() {
            return Err(CoreError::DegenerateRect {
                width: self.width().to_f64(),
                height: self.height().to_f64(),
            });
        }
        Ok(())
    }

    /// `true` if stepping from the min corner by `resolution` moves both
    /// coordinates. Below that the lattice scan cannot advance.
    pub fn can_step(&self, resolution: R) -> bool {
        self.min.re + resolution != self.min.re && self.min.im + resolution != self.min.im
    }

    /// Fails with [`CoreError::BelowPrecision`] unless [`can_step`](Self::can_step).
    pub fn ensure_steppable(&self, resolution: R) -> crate::Result<()> {
        if !self.can_step(resolution) {
            return Err(CoreError::BelowPrecision {
                resolution: resolution.to_f64(),
            });
        }
        Ok(())
    }

    pub fn contains(&self, p: Complex<R>) -> bool {
        p.re >= self.min.re && p.re <= self.max.re && p.im >= self.min.im && p.im <= self.max.im
    }
}

impl Default for PlaneRect<f64> {
    /// The classic overview window `[-2 - 1i, 1 + 1i]`.
    fn default() -> Self {
        Self::from_corners(Complex::new(1.0, 1.0), Complex::new(-2.0, -1.0))
    }
}

/// Plane units per pixel for `rect` drawn into `size`.
///
/// The finer of the two axis scales wins, so the lattice never outgrows the
/// viewport in either dimension and both axes share one step.
pub fn determine_resolution<R: Real>(rect: &PlaneRect<R>, size: PixelSize) -> R {
    let per_x = rect.width() / R::from_f64(size.width as f64);
    let per_y = rect.height() / R::from_f64(size.height as f64);
    per_x.min(per_y)
}

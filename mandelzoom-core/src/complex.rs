use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::real::Real;

/// A point on the complex plane, generic over its scalar precision.
///
/// `Copy` value type; the iteration loop works on the components directly
/// and only uses the operators for readability elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex<R = f64> {
    pub re: R,
    pub im: R,
}

impl<R: Real> Complex<R> {
    pub const ZERO: Self = Self {
        re: R::ZERO,
        im: R::ZERO,
    };

    #[inline]
    pub fn new(re: R, im: R) -> Self {
        Self { re, im }
    }

    /// Build from `f64` components, widening to `R`.
    #[inline]
    pub fn from_f64(re: f64, im: f64) -> Self {
        Self {
            re: R::from_f64(re),
            im: R::from_f64(im),
        }
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(self) -> R {
        self.re * self.re + self.im * self.im
    }

    /// Narrow both components to `f64`.
    #[inline]
    pub fn to_f64(self) -> Complex<f64> {
        Complex::new(self.re.to_f64(), self.im.to_f64())
    }
}

impl<R: Real> Add for Complex<R> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl<R: Real> Sub for Complex<R> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl<R: Real> Mul for Complex<R> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl<R: Real> Neg for Complex<R> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl<R: Real> std::fmt::Display for Complex<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.im >= R::ZERO {
            write!(f, "{} + {}i", self.re, self.im)
        } else {
            write!(f, "{} - {}i", self.re, -self.im)
        }
    }
}

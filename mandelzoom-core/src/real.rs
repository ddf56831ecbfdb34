use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Scalar type used for plane coordinates and resolution arithmetic.
///
/// The whole plot pipeline is generic over `Real` so the numeric precision
/// is a configuration choice rather than a hardcoded type. `f64` is the
/// default; [`DoubleDouble`](crate::DoubleDouble) roughly doubles the number
/// of significant digits at several times the cost per iteration.
///
/// Neither implementation solves deep zoom: past ~1e-14 (`f64`) or ~1e-30
/// (`DoubleDouble`) plane units per pixel, neighbouring samples collapse onto
/// the same value.
pub trait Real:
    Copy
    + Debug
    + Display
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    const ZERO: Self;

    fn from_f64(v: f64) -> Self;

    /// Nearest `f64` (drops any extra precision).
    fn to_f64(self) -> f64;

    #[inline]
    fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
}

impl Real for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Which [`Real`] implementation the application instantiates at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Plain `f64`.
    #[default]
    Double,
    /// [`DoubleDouble`](crate::DoubleDouble), ~31 significant digits.
    DoubleDouble,
}

impl Precision {
    pub fn label(self) -> &'static str {
        match self {
            Self::Double => "f64",
            Self::DoubleDouble => "double-double",
        }
    }
}

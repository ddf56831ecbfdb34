use crate::complex::Complex;
use crate::error::CoreError;
use crate::real::Real;

/// Escape-time iteration with a fixed cap.
///
/// Wraps the cap so it is validated once and carried through the pipeline
/// as a value; [`iterate`] does the actual work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeEvaluator {
    cap: u32,
}

impl EscapeEvaluator {
    pub fn new(cap: u32) -> crate::Result<Self> {
        if cap < 1 {
            return Err(CoreError::InvalidIterationCap(cap));
        }
        Ok(Self { cap })
    }

    #[inline]
    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// The evaluator to use after a zoom: twice the cap, saturating at
    /// `u32::MAX` and clamped to `limit` when one is configured.
    pub fn doubled(self, limit: Option<u32>) -> Self {
        let cap = self.cap.saturating_mul(2);
        let cap = match limit {
            Some(limit) => cap.min(limit.max(1)),
            None => cap,
        };
        Self { cap }
    }

    #[inline]
    pub fn evaluate<R: Real>(&self, c: Complex<R>) -> u32 {
        iterate(c, self.cap)
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
#[inline]
fn in_cardioid<R: Real>(x: R, y: R) -> bool {
    let quarter = R::from_f64(0.25);
    let y2 = y * y;
    let xq = x - quarter;
    let q = xq * xq + y2;
    q * (q + xq) <= quarter * y2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb<R: Real>(x: R, y: R) -> bool {
    let xp = x + R::from_f64(1.0);
    xp * xp + y * y <= R::from_f64(0.0625)
}

/// Closed-form membership test for the two largest interior regions.
#[inline]
pub fn is_known_interior<R: Real>(c: Complex<R>) -> bool {
    in_cardioid(c.re, c.im) || in_period2_bulb(c.re, c.im)
}

/// Escape time of `c` under `z ← z² + c`, `z₀ = 0`.
///
/// Returns the 1-based step at which `|z|² ≥ 4` first holds, or `0` if `c`
/// is inside the cardioid / period-2 bulb or the orbit survives until the
/// count reaches `cap`. Both interior cases share the `0` sentinel.
#[inline]
pub fn iterate<R: Real>(c: Complex<R>, cap: u32) -> u32 {
    if is_known_interior(c) {
        return 0;
    }

    let four = R::from_f64(4.0);
    let two = R::from_f64(2.0);
    let (mut zr, mut zi) = (R::ZERO, R::ZERO);
    let mut count: u32 = 1;

    while count < cap {
        let zr2 = zr * zr;
        let zi2 = zi * zi;
        zi = two * zr * zi + c.im;
        zr = zr2 - zi2 + c.re;
        if zr * zr + zi * zi >= four {
            break;
        }
        count += 1;
    }

    if count == cap {
        0
    } else {
        count
    }
}

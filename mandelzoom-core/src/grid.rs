use tracing::debug;

use crate::complex::Complex;
use crate::plane::PlaneRect;
use crate::real::Real;

/// Upper bound on the up-front allocation for a grid.
const MAX_PREALLOC: usize = 1 << 24;

/// `floor(extent / resolution) + 1`, the samples an axis should hold.
fn axis_samples<R: Real>(extent: R, resolution: R) -> usize {
    // `as` saturates, and maps NaN to 0.
    ((extent / resolution).to_f64() as usize).saturating_add(1)
}

/// One lattice sample and its escape time (`0` until evaluated, and `0` for
/// points judged to be in the set).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint<R = f64> {
    pub coord: Complex<R>,
    pub escape_time: u32,
}

impl<R: Real> SamplePoint<R> {
    pub fn new(coord: Complex<R>) -> Self {
        Self {
            coord,
            escape_time: 0,
        }
    }
}

/// The lattice of samples covering a plane rectangle at a fixed resolution.
///
/// Points are stored column by column: the outer scan walks the real axis
/// from `min.re`, the inner scan walks the imaginary axis from `min.im`. A
/// grid is never patched; any change of rectangle or resolution builds a new
/// one.
#[derive(Debug, Clone)]
pub struct PlotGrid<R = f64> {
    points: Vec<SamplePoint<R>>,
    columns: usize,
    rows: usize,
}

impl<R: Real> PlotGrid<R> {
    /// Scan `rect` with step `resolution` on both axes.
    ///
    /// Each axis runs while `coordinate <= max`, accumulating the step, so
    /// the last sample may fall on or just short of `max` depending on
    /// rounding drift. An axis also stops once it holds one sample more than
    /// `extent / resolution + 1`, or when adding the step no longer moves the
    /// coordinate, so the scan always terminates. `resolution` must be
    /// positive.
    pub fn generate(rect: &PlaneRect<R>, resolution: R) -> Self {
        debug_assert!(resolution > R::ZERO, "resolution must be positive");

        let max_cols = axis_samples(rect.width(), resolution).saturating_add(1);
        let max_rows = axis_samples(rect.height(), resolution).saturating_add(1);
        let capacity = max_cols.saturating_mul(max_rows).min(MAX_PREALLOC);
        let mut points = Vec::with_capacity(capacity);

        let mut columns = 0;
        let mut rows = 0;
        let mut re = rect.min.re;
        while columns < max_cols && re <= rect.max.re {
            let mut im = rect.min.im;
            rows = 0;
            while rows < max_rows && im <= rect.max.im {
                points.push(SamplePoint::new(Complex::new(re, im)));
                rows += 1;
                let next = im + resolution;
                if next == im {
                    break;
                }
                im = next;
            }
            columns += 1;
            let next = re + resolution;
            if next == re {
                break;
            }
            re = next;
        }

        if columns == max_cols || rows == max_rows {
            debug!(columns, rows, "Sample grid hit its axis bound");
        }
        debug!(columns, rows, points = points.len(), "Generated sample grid");

        Self {
            points,
            columns,
            rows,
        }
    }

    /// Number of samples along the real axis.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of samples along the imaginary axis in each column.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SamplePoint<R>] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [SamplePoint<R>] {
        &mut self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SamplePoint<R>> {
        self.points.iter()
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.points.clear();
        self.columns = 0;
        self.rows = 0;
    }
}

impl<R> Default for PlotGrid<R> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            columns: 0,
            rows: 0,
        }
    }
}

impl<'a, R: Real> IntoIterator for &'a PlotGrid<R> {
    type Item = &'a SamplePoint<R>;
    type IntoIter = std::slice::Iter<'a, SamplePoint<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

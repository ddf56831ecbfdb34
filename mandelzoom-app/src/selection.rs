use mandelzoom_core::{Complex, Real};

/// The two-click zoom gesture.
///
/// Holds the first corner (in plane coordinates) between the first and
/// second primary click; empty otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZoomSelection<R> {
    corner1: Option<Complex<R>>,
}

impl<R: Real> ZoomSelection<R> {
    pub(crate) fn new() -> Self {
        Self { corner1: None }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.corner1.is_some()
    }

    pub(crate) fn corner1(&self) -> Option<Complex<R>> {
        self.corner1
    }

    /// Record a click. Returns both corners once the second one arrives,
    /// leaving the selection empty again.
    pub(crate) fn click(&mut self, at: Complex<R>) -> Option<(Complex<R>, Complex<R>)> {
        match self.corner1.take() {
            None => {
                self.corner1 = Some(at);
                None
            }
            Some(first) => Some((first, at)),
        }
    }

    /// Abandon an in-progress selection. Returns whether one was active.
    pub(crate) fn cancel(&mut self) -> bool {
        self.corner1.take().is_some()
    }
}

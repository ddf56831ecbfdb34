use thiserror::Error;

/// Errors originating from the core plot engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid iteration cap: {0} (must be >= 1)")]
    InvalidIterationCap(u32),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },

    #[error("degenerate plane rectangle: {width} × {height} (both extents must be > 0)")]
    DegenerateRect { width: f64, height: f64 },

    #[error("resolution {resolution:e} is below the precision of the plane coordinates")]
    BelowPrecision { resolution: f64 },
}

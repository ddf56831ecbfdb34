pub mod complex;
pub mod double_double;
pub mod error;
pub mod escape;
pub mod grid;
pub mod mapper;
pub mod plane;
pub mod real;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use double_double::DoubleDouble;
pub use error::CoreError;
pub use escape::{iterate, EscapeEvaluator};
pub use grid::{PlotGrid, SamplePoint};
pub use mapper::{CoordinateMapper, PixelPoint, ScreenPos};
pub use plane::{determine_resolution, PixelSize, PlaneRect};
pub use real::{Precision, Real};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

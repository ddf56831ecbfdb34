pub mod buffer;
pub mod canvas;
pub mod error;
pub mod palette;
pub mod renderer;

pub use buffer::RenderBuffer;
pub use canvas::Canvas;
pub use error::RenderError;
pub use palette::{BandWeights, Palette, Rgb};
pub use renderer::{
    compute_escape_times, compute_escape_times_for, draw_grid, EscapeStats, RenderCancel,
};

/// Convenience result type for the render crate.
pub type Result<T> = std::result::Result<T, RenderError>;

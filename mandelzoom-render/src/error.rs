use thiserror::Error;

/// Errors originating from the rendering side of the pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid canvas dimensions: {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Core(#[from] mandelzoom_core::CoreError),
}

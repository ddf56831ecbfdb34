use thiserror::Error;

use mandelzoom_core::CoreError;

/// Startup failures. None of these are retried.
#[derive(Debug, Error)]
pub(crate) enum InitError {
    #[error("invalid configuration: {0}")]
    Config(#[from] CoreError),

    #[error("windowing system unavailable: {0}")]
    Platform(#[from] eframe::Error),
}

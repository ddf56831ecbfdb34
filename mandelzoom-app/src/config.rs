use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use mandelzoom_core::{Complex, EscapeEvaluator, PixelSize, PlaneRect, Precision, Real};
use mandelzoom_render::{Palette, Rgb};

/// Name of the optional configuration file next to the executable.
const CONFIG_FILE: &str = "mandelzoom.json";

// ---------------------------------------------------------------------------
// Palette selection
// ---------------------------------------------------------------------------

/// Serializable choice of [`Palette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum PaletteSetting {
    #[default]
    Banded,
    Flat {
        #[serde(default = "default_flat_grey")]
        grey: u8,
    },
}

impl PaletteSetting {
    pub(crate) fn to_palette(self) -> Palette {
        match self {
            Self::Banded => Palette::banded(),
            Self::Flat { grey } => Palette::Flat(Rgb::grey(grey)),
        }
    }
}

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

/// Everything the plot needs at startup. Read once; never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PlotConfig {
    #[serde(default = "default_plane_max")]
    pub plane_max: Complex,
    #[serde(default = "default_plane_min")]
    pub plane_min: Complex,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_initial_iteration_cap")]
    pub initial_iteration_cap: u32,
    /// Upper bound for the cap after repeated zooms. `None` lets it double
    /// until it saturates at `u32::MAX`.
    #[serde(default)]
    pub iteration_cap_limit: Option<u32>,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default)]
    pub palette: PaletteSetting,
}

fn default_plane_max() -> Complex {
    Complex::new(1.0, 1.0)
}
fn default_plane_min() -> Complex {
    Complex::new(-2.0, -1.0)
}
fn default_width() -> u32 {
    2800
}
fn default_height() -> u32 {
    1860
}
fn default_initial_iteration_cap() -> u32 {
    1000
}
fn default_flat_grey() -> u8 {
    Palette::FLAT_GREY.r
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            plane_max: default_plane_max(),
            plane_min: default_plane_min(),
            width: default_width(),
            height: default_height(),
            initial_iteration_cap: default_initial_iteration_cap(),
            iteration_cap_limit: None,
            precision: Precision::default(),
            palette: PaletteSetting::default(),
        }
    }
}

impl PlotConfig {
    /// Load `mandelzoom.json` from the executable's directory, falling back
    /// to defaults when it is missing or unreadable.
    pub(crate) fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub(crate) fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                error!("Failed to read config {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                error!("Failed to parse config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Reject settings the plot cannot start from.
    pub(crate) fn validate(&self) -> mandelzoom_core::Result<()> {
        self.pixel_size()?;
        self.evaluator()?;
        self.plane_rect::<f64>().ensure_non_degenerate()
    }

    pub(crate) fn pixel_size(&self) -> mandelzoom_core::Result<PixelSize> {
        PixelSize::new(self.width, self.height)
    }

    pub(crate) fn evaluator(&self) -> mandelzoom_core::Result<EscapeEvaluator> {
        EscapeEvaluator::new(self.initial_iteration_cap)
    }

    /// The initial window, normalised from the two configured corners.
    pub(crate) fn plane_rect<R: Real>(&self) -> PlaneRect<R> {
        PlaneRect::from_corners(
            Complex::from_f64(self.plane_max.re, self.plane_max.im),
            Complex::from_f64(self.plane_min.re, self.plane_min.im),
        )
    }
}

/// `mandelzoom.json` next to the running executable, or in the current
/// directory when the executable path is unavailable.
fn config_path() -> PathBuf {
    let dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(CONFIG_FILE)
}

/// An opaque display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(level: u8) -> Self {
        Self::new(level, level, level)
    }

    #[inline]
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// Lowest value the blue band can take for an escaped point.
const BLUE_FLOOR: u32 = 64;

/// Per-channel multipliers and thresholds for [`Palette::Banded`].
///
/// Channel `k` is `(weights[k] * e) mod 256` once `e > thresholds[k]`, and
/// `0` below it. Blue is then compressed into `BLUE_FLOOR..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandWeights {
    pub weights: [u32; 3],
    pub thresholds: [u32; 3],
}

impl Default for BandWeights {
    fn default() -> Self {
        Self {
            weights: [10, 14, 7],
            thresholds: [200, 100, 0],
        }
    }
}

/// Maps an escape time to a display color.
///
/// Escape time `0` (did not escape) is always black; every other escape time
/// maps to a color that is never black, and the mapping is a pure function
/// of the escape time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    /// Repeating bands from modular arithmetic on weighted escape times.
    Banded(BandWeights),
    /// One color for every escaped point.
    Flat(Rgb),
}

impl Palette {
    /// The single flat grey used for a two-tone plot.
    pub const FLAT_GREY: Rgb = Rgb::grey(175);

    pub fn banded() -> Self {
        Self::Banded(BandWeights::default())
    }

    pub fn flat() -> Self {
        Self::Flat(Self::FLAT_GREY)
    }

    #[inline]
    pub fn color_for(&self, escape_time: u32) -> Rgb {
        if escape_time == 0 {
            return Rgb::BLACK;
        }
        match *self {
            Self::Banded(bands) => {
                let e = escape_time as u64;
                let band = |k: usize| -> u32 {
                    if escape_time > bands.thresholds[k] {
                        ((bands.weights[k] as u64 * e) % 256) as u32
                    } else {
                        0
                    }
                };
                let blue = BLUE_FLOOR + band(2) * (255 - BLUE_FLOOR) / 255;
                Rgb::new(band(0) as u8, band(1) as u8, blue as u8)
            }
            Self::Flat(color) if color == Rgb::BLACK => Self::FLAT_GREY,
            Self::Flat(color) => color,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::banded()
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lowest channel value for generated colors, keeps markers away from near-black.
pub const COLOR_CHANNEL_MIN: f64 = 0.3;
pub const COLOR_CHANNEL_MAX: f64 = 1.0;

/// RGB display color of a marker, each component in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct MarkerColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl MarkerColor {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Draws each channel independently and uniformly from `[0.3, 1.0]`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            r: rng.random_range(COLOR_CHANNEL_MIN..=COLOR_CHANNEL_MAX),
            g: rng.random_range(COLOR_CHANNEL_MIN..=COLOR_CHANNEL_MAX),
            b: rng.random_range(COLOR_CHANNEL_MIN..=COLOR_CHANNEL_MAX),
        }
    }

    pub fn components(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[f64; 3]> for MarkerColor {
    fn from([r, g, b]: [f64; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<MarkerColor> for [f64; 3] {
    fn from(color: MarkerColor) -> Self {
        color.components()
    }
}

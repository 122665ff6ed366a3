use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;

/// Colormaps for rendering intensity frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    #[default]
    Viridis,
    Gray,
    Magma,
    Inferno,
}

// Nine evenly spaced samples of each perceptual map.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

const MAGMA: [[u8; 3]; 9] = [
    [0, 0, 4],
    [28, 16, 68],
    [79, 18, 123],
    [129, 37, 129],
    [181, 54, 122],
    [229, 80, 100],
    [251, 135, 97],
    [254, 194, 135],
    [252, 253, 191],
];

const INFERNO: [[u8; 3]; 9] = [
    [0, 0, 4],
    [31, 12, 72],
    [85, 15, 109],
    [136, 34, 106],
    [186, 54, 85],
    [227, 89, 51],
    [249, 140, 10],
    [249, 201, 50],
    [252, 255, 164],
];

impl Colormap {
    /// Map `t` in [0, 1] to a color. Out-of-range values are clamped.
    pub fn map(&self, t: f32) -> Rgb<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Gray => {
                let v = (t * 255.0).round() as u8;
                Rgb([v, v, v])
            }
            Self::Viridis => interpolate(&VIRIDIS, t),
            Self::Magma => interpolate(&MAGMA, t),
            Self::Inferno => interpolate(&INFERNO, t),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Viridis => "viridis",
            Self::Gray => "gray",
            Self::Magma => "magma",
            Self::Inferno => "inferno",
        }
    }
}

fn interpolate(stops: &[[u8; 3]], t: f32) -> Rgb<u8> {
    let pos = t * (stops.len() - 1) as f32;
    let lo = (pos.floor() as usize).min(stops.len() - 1);
    let hi = (lo + 1).min(stops.len() - 1);
    let frac = pos - lo as f32;

    let mut out = [0u8; 3];
    for (c, o) in out.iter_mut().enumerate() {
        let a = stops[lo][c] as f32;
        let b = stops[hi][c] as f32;
        *o = (a + (b - a) * frac).round() as u8;
    }
    Rgb(out)
}

impl std::str::FromStr for Colormap {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "viridis" => Ok(Self::Viridis),
            "gray" | "grey" | "greys_r" => Ok(Self::Gray),
            "magma" => Ok(Self::Magma),
            "inferno" => Ok(Self::Inferno),
            _ => Err(TrackError::UnknownColormap(s.to_string())),
        }
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

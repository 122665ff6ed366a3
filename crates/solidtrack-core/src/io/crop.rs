use ndarray::s;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_CROP;
use crate::error::{Result, TrackError};
use crate::frame::Frame;

/// A rectangle in image coordinates for cropping.
///
/// `(x1, y1)` is the top-left corner and `(x2, y2)` the exclusive
/// bottom-right corner, so the crop keeps `data[y1..y2, x1..x2]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl CropBox {
    /// Crop of the nickel solidification dataset.
    pub const NICKEL_DEFAULT: CropBox = CropBox {
        x1: DEFAULT_CROP.0,
        y1: DEFAULT_CROP.1,
        x2: DEFAULT_CROP.2,
        y2: DEFAULT_CROP.3,
    };

    pub fn new(x1: usize, y1: usize, x2: usize, y2: usize) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> usize {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> usize {
        self.y2.saturating_sub(self.y1)
    }

    /// Check that the crop is non-empty and lies within a `width`x`height` frame.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        if self.x1 >= self.x2 || self.y1 >= self.y2 || self.x2 > width || self.y2 > height {
            return Err(TrackError::CropOutOfBounds {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
                width,
                height,
            });
        }
        Ok(())
    }

    /// Crop a frame, copying the selected window into a new frame.
    pub fn apply(&self, frame: &Frame) -> Result<Frame> {
        self.validate(frame.width(), frame.height())?;
        let data = frame
            .data
            .slice(s![self.y1..self.y2, self.x1..self.x2])
            .to_owned();
        Ok(frame.with_data(data))
    }
}

impl From<(usize, usize, usize, usize)> for CropBox {
    fn from((x1, y1, x2, y2): (usize, usize, usize, usize)) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl std::str::FromStr for CropBox {
    type Err = TrackError;

    /// Parse `"x1,y1,x2,y2"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<usize> = s
            .split(',')
            .map(|p| p.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| TrackError::InvalidParameter(format!("crop '{s}': {e}")))?;
        match parts.as_slice() {
            &[x1, y1, x2, y2] => Ok(Self::new(x1, y1, x2, y2)),
            _ => Err(TrackError::InvalidParameter(format!(
                "crop '{s}' needs exactly 4 values: x1,y1,x2,y2"
            ))),
        }
    }
}

impl std::fmt::Display for CropBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

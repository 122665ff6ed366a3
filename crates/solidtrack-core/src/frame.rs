use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Binary mask: 1 marks foreground, 0 background.
pub type Mask = Array2<u8>;

/// A single grayscale micrograph frame.
/// Pixel values are f32, in [0.0, 1.0] straight out of the loader.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Original bit depth before conversion (8, 16, 32 or 64)
    pub original_bit_depth: u8,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array2<f32>, bit_depth: u8) -> Self {
        Self {
            data,
            original_bit_depth: bit_depth,
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a frame carrying over bit depth and metadata from `self`.
    pub fn with_data(&self, data: Array2<f32>) -> Self {
        Self {
            data,
            original_bit_depth: self.original_bit_depth,
            metadata: self.metadata.clone(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
}

/// Axis-aligned box in pixel coordinates.
///
/// `max_row` and `max_col` are exclusive, so `max_row - min_row` is the
/// box height and `max_col - min_col` its width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
}

impl BoundingBox {
    pub fn new(min_row: usize, min_col: usize, max_row: usize, max_col: usize) -> Self {
        debug_assert!(min_row <= max_row && min_col <= max_col);
        Self {
            min_row,
            min_col,
            max_row,
            max_col,
        }
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row
    }

    pub fn width(&self) -> usize {
        self.max_col - self.min_col
    }

    pub fn area(&self) -> usize {
        self.height() * self.width()
    }

    /// Smallest box enclosing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_row: self.min_row.min(other.min_row),
            min_col: self.min_col.min(other.min_col),
            max_row: self.max_row.max(other.max_row),
            max_col: self.max_col.max(other.max_col),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.min_row && row < self.max_row && col >= self.min_col && col < self.max_col
    }

    /// `(min_row, min_col, max_row, max_col)`
    pub fn as_tuple(&self) -> (usize, usize, usize, usize) {
        (self.min_row, self.min_col, self.max_row, self.max_col)
    }
}

impl From<(usize, usize, usize, usize)> for BoundingBox {
    fn from((min_row, min_col, max_row, max_col): (usize, usize, usize, usize)) -> Self {
        Self::new(min_row, min_col, max_row, max_col)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.min_row, self.min_col, self.max_row, self.max_col
        )
    }
}

/// Metadata about a frame source.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub total_frames: usize,
    pub width: usize,
    pub height: usize,
    pub format: &'static str,
}

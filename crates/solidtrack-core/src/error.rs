use thiserror::Error;

use crate::pipeline::PipelineStage;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error(
        "Crop ({x1},{y1})-({x2},{y2}) is empty or exceeds frame dimensions ({width}x{height})"
    )]
    CropOutOfBounds {
        x1: usize,
        y1: usize,
        x2: usize,
        y2: usize,
        width: usize,
        height: usize,
    },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Division by zero: {percentile}th percentile intensity is zero")]
    DivisionByZero { percentile: f32 },

    #[error("No region larger than {min_region_size} pixels")]
    NoRegionFound { min_region_size: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown colormap: {0}")]
    UnknownColormap(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Empty frame sequence")]
    EmptySequence,

    #[error("Empty frame")]
    EmptyFrame,
}

pub type Result<T> = std::result::Result<T, TrackError>;

/// A pipeline failure tagged with the frame and stage that produced it.
#[derive(Error, Debug)]
#[error("frame {frame_index}: {stage} failed: {source}")]
pub struct FrameError {
    pub frame_index: usize,
    pub stage: PipelineStage,
    #[source]
    pub source: TrackError,
}

impl FrameError {
    pub fn new(frame_index: usize, stage: PipelineStage, source: TrackError) -> Self {
        Self {
            frame_index,
            stage,
            source,
        }
    }

    /// True when the frame simply had no qualifying feature.
    pub fn is_no_region(&self) -> bool {
        matches!(self.source, TrackError::NoRegionFound { .. })
    }
}

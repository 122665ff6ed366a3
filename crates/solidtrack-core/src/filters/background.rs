use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_BLUR_SIGMA, DEFAULT_BLUR_TRUNCATE, DEFAULT_REFERENCE_INDEX};
use crate::error::{Result, TrackError};
use crate::frame::Frame;
use crate::io::FrameSource;

use super::gaussian_blur::{gaussian_blur, kernel_radius};

/// Background subtraction against a pre-event reference frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Index of the reference frame in the source stack.
    pub reference_index: usize,
    /// Gaussian sigma applied to both frames before subtracting.
    pub sigma: f32,
    /// Kernel half-width in units of sigma.
    pub truncate: f32,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            reference_index: DEFAULT_REFERENCE_INDEX,
            sigma: DEFAULT_BLUR_SIGMA,
            truncate: DEFAULT_BLUR_TRUNCATE,
        }
    }
}

impl BackgroundConfig {
    /// `sigma` must be finite and non-negative, `truncate` finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(TrackError::InvalidParameter(format!(
                "background sigma must be finite and >= 0, got {}",
                self.sigma
            )));
        }
        if !self.truncate.is_finite() || self.truncate <= 0.0 {
            return Err(TrackError::InvalidParameter(format!(
                "background truncate must be finite and > 0, got {}",
                self.truncate
            )));
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and also require the blur kernel
    /// radius to fit within a `height`x`width` frame.
    pub fn validate_for(&self, height: usize, width: usize) -> Result<()> {
        self.validate()?;
        let radius = kernel_radius(self.sigma, self.truncate);
        if radius > height.max(width) {
            return Err(TrackError::InvalidParameter(format!(
                "background blur radius {radius} exceeds the {height}x{width} frame"
            )));
        }
        Ok(())
    }
}

/// A smoothed reference frame, ready to be subtracted from many frames.
#[derive(Clone, Debug)]
pub struct Background {
    smoothed: Frame,
    sigma: f32,
    truncate: f32,
}

impl Background {
    pub fn new(reference: &Frame, config: &BackgroundConfig) -> Self {
        Self {
            smoothed: gaussian_blur(reference, config.sigma, config.truncate),
            sigma: config.sigma,
            truncate: config.truncate,
        }
    }

    /// Read `config.reference_index` from `source` and smooth it.
    pub fn from_source(source: &dyn FrameSource, config: &BackgroundConfig) -> Result<Self> {
        let reference = source.read_frame(config.reference_index)?;
        debug!(
            reference_index = config.reference_index,
            sigma = config.sigma,
            "Loaded background reference"
        );
        Ok(Self::new(&reference, config))
    }

    pub fn reference(&self) -> &Frame {
        &self.smoothed
    }

    /// Smooth `frame` and subtract the smoothed reference.
    ///
    /// Negative differences are kept; they mark regions that darkened.
    pub fn subtract(&self, frame: &Frame) -> Result<Frame> {
        if frame.dim() != self.smoothed.dim() {
            return Err(TrackError::ShapeMismatch {
                expected: self.smoothed.dim(),
                actual: frame.dim(),
            });
        }
        let smoothed = gaussian_blur(frame, self.sigma, self.truncate);
        Ok(frame.with_data(&smoothed.data - &self.smoothed.data))
    }
}

/// Smooth both frames and return `current - reference`.
pub fn subtract_background(
    current: &Frame,
    reference: &Frame,
    config: &BackgroundConfig,
) -> Result<Frame> {
    Background::new(reference, config).subtract(current)
}

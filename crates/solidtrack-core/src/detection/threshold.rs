use crate::frame::{Frame, Mask};

use super::config::{ThresholdConfig, ThresholdDirection};

/// Binarize a frame: 1 where the pixel is strictly on the configured side of
/// the threshold, 0 elsewhere (including pixels equal to it).
pub fn threshold(frame: &Frame, config: &ThresholdConfig) -> Mask {
    let t = config.value;
    match config.direction {
        ThresholdDirection::Greater => frame.data.mapv(|v| u8::from(v > t)),
        ThresholdDirection::Less => frame.data.mapv(|v| u8::from(v < t)),
    }
}

use serde::{Deserialize, Serialize};

use crate::detection::{RegionFilterConfig, ThresholdConfig};
use crate::error::{Result, TrackError};
use crate::filters::{BackgroundConfig, ClipConfig, DenoiseConfig};
use crate::io::CropBox;

/// Settings for the per-frame tracking pipeline.
///
/// Every section falls back to its defaults when missing from a config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Subtract the smoothed reference frame before clipping.
    pub subtract_background: bool,
    /// Crop applied to every frame as read, `None` keeps full frames.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropBox>,
    pub background: BackgroundConfig,
    pub clip: ClipConfig,
    pub denoise: DenoiseConfig,
    pub threshold: ThresholdConfig,
    pub regions: RegionFilterConfig,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            subtract_background: true,
            crop: None,
            background: BackgroundConfig::default(),
            clip: ClipConfig::default(),
            denoise: DenoiseConfig::default(),
            threshold: ThresholdConfig::default(),
            regions: RegionFilterConfig::default(),
        }
    }
}

impl TrackConfig {
    /// Settings for the nickel solidification dataset.
    pub fn nickel() -> Self {
        Self {
            crop: Some(CropBox::NICKEL_DEFAULT),
            ..Self::default()
        }
    }

    /// Reject parameter combinations the stages would fail on for every frame.
    pub fn validate(&self) -> Result<()> {
        self.background.validate()?;
        self.clip.validate()?;
        if self.denoise.weight.is_nan() || self.denoise.weight <= 0.0 {
            return Err(TrackError::InvalidParameter(format!(
                "denoise weight must be > 0, got {}",
                self.denoise.weight
            )));
        }
        Ok(())
    }
}

pub mod config;
pub mod info;
pub mod stages;
pub mod track;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use solidtrack_core::io::CropBox;
use solidtrack_core::pipeline::TrackConfig;
use tracing::debug;

/// Options shared by every command that builds a pipeline.
#[derive(Args)]
pub struct PipelineArgs {
    /// Tracking config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Crop box as x1,y1,x2,y2
    #[arg(long, conflicts_with = "no_crop")]
    pub crop: Option<CropBox>,

    /// Process full frames
    #[arg(long)]
    pub no_crop: bool,

    /// Frame used as the background reference
    #[arg(long)]
    pub reference: Option<usize>,

    /// Regions must be strictly larger than this many pixels
    #[arg(long)]
    pub min_region_size: Option<usize>,

    /// Binarization threshold on the denoised frame
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Keep pixels below the threshold instead of above
    #[arg(long)]
    pub less: bool,
}

impl PipelineArgs {
    /// Config file (or the nickel defaults) with command-line overrides applied.
    pub fn build_config(&self) -> Result<TrackConfig> {
        let mut config = if let Some(ref path) = self.config {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&contents).context("Invalid tracking config")?
        } else {
            TrackConfig::nickel()
        };

        if self.no_crop {
            config.crop = None;
        } else if let Some(crop) = self.crop {
            config.crop = Some(crop);
        }
        if let Some(reference) = self.reference {
            config.background.reference_index = reference;
        }
        if let Some(min) = self.min_region_size {
            config.regions.min_region_size = min;
        }
        if let Some(value) = self.threshold {
            config.threshold.value = value;
        }
        if self.less {
            config.threshold.direction = solidtrack_core::detection::ThresholdDirection::Less;
        }

        config.validate()?;
        debug!(?config, "Resolved tracking config");
        Ok(config)
    }
}

/// Parse a frame selection such as `all`, `7`, `0-9` or `0,2,10-12`.
///
/// Ranges are inclusive. Indices are returned in the order given.
pub fn parse_frames(selection: &str, total: usize) -> Result<Vec<usize>> {
    let selection = selection.trim();
    if selection.eq_ignore_ascii_case("all") {
        return Ok((0..total).collect());
    }

    let mut frames = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let start: usize = start
                .trim()
                .parse()
                .with_context(|| format!("Invalid frame range '{part}'"))?;
            let end: usize = end
                .trim()
                .parse()
                .with_context(|| format!("Invalid frame range '{part}'"))?;
            if end < start {
                bail!("Frame range '{part}' is reversed");
            }
            frames.extend(start..=end);
        } else {
            frames.push(
                part.parse()
                    .with_context(|| format!("Invalid frame index '{part}'"))?,
            );
        }
    }

    if frames.is_empty() {
        bail!("No frames selected by '{selection}'");
    }
    if let Some(&bad) = frames.iter().find(|&&i| i >= total) {
        bail!("Frame {bad} out of range ({total} frames)");
    }
    Ok(frames)
}

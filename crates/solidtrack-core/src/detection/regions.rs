use tracing::debug;

use crate::error::{Result, TrackError};
use crate::frame::{BoundingBox, Mask};

use super::components::{label, regions, LabelMap, Region};
use super::config::{OutputMode, RegionFilterConfig};

/// Result of [`filter_region_size`], shaped by the requested [`OutputMode`].
#[derive(Clone, Debug, PartialEq)]
pub enum RegionOutput {
    Mask(Mask),
    BoundingBox(BoundingBox),
}

/// Regions of a mask that passed the area filter, with their label map.
#[derive(Clone, Debug)]
pub struct RetainedRegions {
    pub labels: LabelMap,
    pub regions: Vec<Region>,
}

impl RetainedRegions {
    /// Mask holding only the retained regions' pixels.
    pub fn mask(&self) -> Mask {
        let max_label = self.regions.iter().map(|r| r.label as usize).max().unwrap_or(0);
        let mut keep = vec![false; max_label + 1];
        for r in &self.regions {
            keep[r.label as usize] = true;
        }
        self.labels
            .mapv(|l| u8::from(l != 0 && keep.get(l as usize).copied().unwrap_or(false)))
    }

    /// Box enclosing every retained region.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.regions
            .iter()
            .map(|r| r.bbox)
            .reduce(|acc, b| acc.union(&b))
    }
}

/// Label the mask and keep regions whose area is strictly greater than
/// `min_region_size`. Fails with `NoRegionFound` when none qualify.
pub fn retain_regions(mask: &Mask, config: &RegionFilterConfig) -> Result<RetainedRegions> {
    let (labels, total) = label(mask, config.connectivity);
    let retained: Vec<Region> = regions(&labels)
        .into_iter()
        .filter(|r| r.area > config.min_region_size)
        .collect();

    debug!(
        total,
        retained = retained.len(),
        min_region_size = config.min_region_size,
        "Region filter"
    );

    if retained.is_empty() {
        return Err(TrackError::NoRegionFound {
            min_region_size: config.min_region_size,
        });
    }

    Ok(RetainedRegions {
        labels,
        regions: retained,
    })
}

/// Filter a mask by region area and return either the filtered mask or the
/// bounding box of the surviving regions.
pub fn filter_region_size(
    mask: &Mask,
    config: &RegionFilterConfig,
    mode: OutputMode,
) -> Result<RegionOutput> {
    let retained = retain_regions(mask, config)?;
    Ok(match mode {
        OutputMode::FilteredMask => RegionOutput::Mask(retained.mask()),
        OutputMode::BoundingBox => RegionOutput::BoundingBox(retained.bounding_box().ok_or(
            TrackError::NoRegionFound {
                min_region_size: config.min_region_size,
            },
        )?),
    })
}

/// Mask of the regions larger than `min_region_size`.
pub fn filter_regions(mask: &Mask, config: &RegionFilterConfig) -> Result<Mask> {
    Ok(retain_regions(mask, config)?.mask())
}

/// Box enclosing all regions larger than `min_region_size`.
pub fn region_bounding_box(mask: &Mask, config: &RegionFilterConfig) -> Result<BoundingBox> {
    retain_regions(mask, config)?
        .bounding_box()
        .ok_or(TrackError::NoRegionFound {
            min_region_size: config.min_region_size,
        })
}

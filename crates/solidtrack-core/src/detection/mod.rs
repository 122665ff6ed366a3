pub mod components;
pub mod config;
pub mod regions;
pub mod threshold;

pub use components::{label, regions, LabelMap, Region};
pub use config::{Connectivity, OutputMode, RegionFilterConfig, ThresholdConfig, ThresholdDirection};
pub use regions::{
    filter_region_size, filter_regions, region_bounding_box, retain_regions, RegionOutput,
    RetainedRegions,
};
pub use threshold::threshold;

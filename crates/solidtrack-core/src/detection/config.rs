use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MIN_REGION_SIZE, DEFAULT_THRESHOLD};

/// Which side of the threshold becomes foreground.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdDirection {
    /// Pixels strictly greater than the threshold.
    #[default]
    Greater,
    /// Pixels strictly less than the threshold.
    Less,
}

impl std::fmt::Display for ThresholdDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Greater => write!(f, ">"),
            Self::Less => write!(f, "<"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub value: f32,
    pub direction: ThresholdDirection,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_THRESHOLD,
            direction: ThresholdDirection::Greater,
        }
    }
}

/// Neighborhood used when grouping foreground pixels into regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Horizontal and vertical neighbors only.
    Four,
    /// Diagonal neighbors too.
    #[default]
    Eight,
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Four => write!(f, "4-connected"),
            Self::Eight => write!(f, "8-connected"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionFilterConfig {
    /// Regions need strictly more pixels than this to be kept.
    pub min_region_size: usize,
    pub connectivity: Connectivity,
}

impl Default for RegionFilterConfig {
    fn default() -> Self {
        Self {
            min_region_size: DEFAULT_MIN_REGION_SIZE,
            connectivity: Connectivity::Eight,
        }
    }
}

/// What [`filter_region_size`](super::filter_region_size) returns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// A mask holding only the retained regions.
    FilteredMask,
    /// The box enclosing every retained region.
    #[default]
    BoundingBox,
}

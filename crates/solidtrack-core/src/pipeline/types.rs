use crate::error::FrameError;
use crate::frame::{BoundingBox, Frame, Mask};

/// Per-frame processing stage, used for error attribution and progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Loading,
    BackgroundSubtraction,
    Clipping,
    Denoising,
    RegionFiltering,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading frame"),
            Self::BackgroundSubtraction => write!(f, "Background subtraction"),
            Self::Clipping => write!(f, "Percentile clipping"),
            Self::Denoising => write!(f, "Invert and denoise"),
            Self::RegionFiltering => write!(f, "Region filtering"),
        }
    }
}

/// Outcome of running the pipeline on one frame of a batch.
#[derive(Debug)]
pub struct FrameOutcome {
    pub frame_index: usize,
    pub result: Result<BoundingBox, FrameError>,
}

impl FrameOutcome {
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.result.as_ref().ok().copied()
    }
}

/// Counts over a finished batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackSummary {
    /// Frames that produced a bounding box.
    pub tracked: usize,
    /// Frames where no region passed the area filter.
    pub no_region: usize,
    /// Frames that failed for any other reason.
    pub failed: usize,
}

impl TrackSummary {
    pub fn from_outcomes(outcomes: &[FrameOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut acc, o| {
                match &o.result {
                    Ok(_) => acc.tracked += 1,
                    Err(e) if e.is_no_region() => acc.no_region += 1,
                    Err(_) => acc.failed += 1,
                }
                acc
            })
    }
}

/// Every intermediate product of one pipeline run.
#[derive(Clone, Debug)]
pub struct FrameTrace {
    pub frame_index: usize,
    /// Frame as loaded (after crop).
    pub raw: Frame,
    /// Background-subtracted frame, when subtraction is enabled.
    pub subtracted: Option<Frame>,
    pub clipped: Frame,
    pub denoised: Frame,
    pub mask: Mask,
    pub filtered_mask: Mask,
    pub bbox: BoundingBox,
}

/// Thread-safe progress reporting for batch tracking.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A batch has started with `total_frames` frames.
    fn begin(&self, _total_frames: usize) {}

    /// `frames_done` frames have completed so far.
    fn advance(&self, _frames_done: usize) {}

    /// The batch is finished.
    fn finish(&self) {}
}

/// No-op progress reporter, used when `track_frames` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

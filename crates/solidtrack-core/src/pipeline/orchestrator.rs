use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::consts::PARALLEL_FRAME_THRESHOLD;
use crate::detection::{region_bounding_box, retain_regions, threshold};
use crate::error::{FrameError, Result, TrackError};
use crate::filters::{clip_percentiles, invert_denoise, Background};
use crate::frame::{BoundingBox, Frame, Mask};
use crate::io::{CroppedSource, FrameSource};

use super::config::TrackConfig;
use super::types::{
    FrameOutcome, FrameTrace, NoOpReporter, PipelineStage, ProgressReporter, TrackSummary,
};

/// Attach frame and stage to a stage error.
trait AtStage<T> {
    fn at(self, frame_index: usize, stage: PipelineStage) -> std::result::Result<T, FrameError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, frame_index: usize, stage: PipelineStage) -> std::result::Result<T, FrameError> {
        self.map_err(|e| FrameError::new(frame_index, stage, e))
    }
}

/// The per-frame bounding-box pipeline bound to a frame source.
///
/// Stage order: load (+crop) -> background subtraction -> percentile clip ->
/// invert + TV denoise -> threshold -> region filter -> bounding box.
pub struct FramePipeline<S> {
    source: CroppedSource<S>,
    background: Option<Background>,
    config: TrackConfig,
}

impl<S: FrameSource> FramePipeline<S> {
    /// Validate the config, apply its crop to `source` and smooth the
    /// background reference once for all frames.
    pub fn new(source: S, config: TrackConfig) -> Result<Self> {
        config.validate()?;
        let source = CroppedSource::new(source, config.crop)?;
        let background = if config.subtract_background {
            let (h, w) = source.dimensions();
            config.background.validate_for(h, w)?;
            Some(Background::from_source(&source, &config.background)?)
        } else {
            None
        };

        info!(
            frames = source.frame_count(),
            crop = ?config.crop,
            background = config.subtract_background,
            "Frame pipeline ready"
        );

        Ok(Self {
            source,
            background,
            config,
        })
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    /// The cropped source frames are read from.
    pub fn source(&self) -> &CroppedSource<S> {
        &self.source
    }

    pub fn frame_count(&self) -> usize {
        self.source.frame_count()
    }

    /// Load one frame through the configured crop.
    pub fn load(&self, index: usize) -> std::result::Result<Frame, FrameError> {
        self.source.read_frame(index).at(index, PipelineStage::Loading)
    }

    /// Run every stage up to the binary mask.
    fn run_to_mask(&self, index: usize) -> std::result::Result<MaskStages, FrameError> {
        let raw = self.load(index)?;

        let subtracted = match &self.background {
            Some(bg) => Some(
                bg.subtract(&raw)
                    .at(index, PipelineStage::BackgroundSubtraction)?,
            ),
            None => None,
        };

        let clipped = clip_percentiles(subtracted.as_ref().unwrap_or(&raw), &self.config.clip)
            .at(index, PipelineStage::Clipping)?;
        let denoised =
            invert_denoise(&clipped, &self.config.denoise).at(index, PipelineStage::Denoising)?;
        let mask = threshold(&denoised, &self.config.threshold);

        Ok(MaskStages {
            raw,
            subtracted,
            clipped,
            denoised,
            mask,
        })
    }

    /// Bounding box of the region of interest in frame `index`.
    pub fn process_frame(&self, index: usize) -> std::result::Result<BoundingBox, FrameError> {
        let stages = self.run_to_mask(index)?;
        let bbox = region_bounding_box(&stages.mask, &self.config.regions)
            .at(index, PipelineStage::RegionFiltering)?;
        debug!(frame = index, %bbox, "Frame tracked");
        Ok(bbox)
    }

    /// Run the pipeline on frame `index` and keep every intermediate product.
    pub fn trace_frame(&self, index: usize) -> std::result::Result<FrameTrace, FrameError> {
        let stages = self.run_to_mask(index)?;
        let retained = retain_regions(&stages.mask, &self.config.regions)
            .at(index, PipelineStage::RegionFiltering)?;
        let bbox = retained
            .bounding_box()
            .ok_or(TrackError::NoRegionFound {
                min_region_size: self.config.regions.min_region_size,
            })
            .at(index, PipelineStage::RegionFiltering)?;

        Ok(FrameTrace {
            frame_index: index,
            raw: stages.raw,
            subtracted: stages.subtracted,
            clipped: stages.clipped,
            denoised: stages.denoised,
            mask: stages.mask,
            filtered_mask: retained.mask(),
            bbox,
        })
    }
}

struct MaskStages {
    raw: Frame,
    subtracted: Option<Frame>,
    clipped: Frame,
    denoised: Frame,
    mask: Mask,
}

/// Run the pipeline over `indices` with a thread-safe progress reporter.
///
/// A failing frame never aborts the batch; its error is returned in its
/// outcome. Outcomes come back in the order of `indices`.
pub fn track_frames_reported<S: FrameSource>(
    pipeline: &FramePipeline<S>,
    indices: &[usize],
    reporter: Arc<dyn ProgressReporter>,
) -> Vec<FrameOutcome> {
    reporter.begin(indices.len());
    let done = AtomicUsize::new(0);

    let run_one = |&index: &usize| {
        let result = pipeline.process_frame(index);
        if let Err(ref e) = result {
            if e.is_no_region() {
                debug!(frame = index, "No qualifying region");
            } else {
                warn!(frame = index, stage = %e.stage, error = %e.source, "Frame failed");
            }
        }
        reporter.advance(done.fetch_add(1, Ordering::Relaxed) + 1);
        FrameOutcome {
            frame_index: index,
            result,
        }
    };

    let outcomes: Vec<FrameOutcome> = if indices.len() >= PARALLEL_FRAME_THRESHOLD {
        indices.par_iter().map(run_one).collect()
    } else {
        indices.iter().map(run_one).collect()
    };

    reporter.finish();
    let summary = TrackSummary::from_outcomes(&outcomes);
    info!(
        tracked = summary.tracked,
        no_region = summary.no_region,
        failed = summary.failed,
        "Tracking complete"
    );
    outcomes
}

/// Run the pipeline over `indices`.
pub fn track_frames<S: FrameSource>(
    pipeline: &FramePipeline<S>,
    indices: &[usize],
) -> Vec<FrameOutcome> {
    track_frames_reported(pipeline, indices, Arc::new(NoOpReporter))
}

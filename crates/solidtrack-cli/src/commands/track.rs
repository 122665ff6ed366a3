use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use solidtrack_core::frame::BoundingBox;
use solidtrack_core::io::{open_source, source_info, FrameSource};
use solidtrack_core::pipeline::{
    track_frames_reported, FrameOutcome, FramePipeline, ProgressReporter, TrackSummary,
};
use solidtrack_core::viz::{plot_bboxes, Colormap, FigureConfig};

use super::{parse_frames, PipelineArgs};
use crate::summary::{print_outcomes, print_track_summary};

#[derive(Args)]
pub struct TrackArgs {
    /// Input stack (TIFF, SER or image directory)
    pub source: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Frames to track, e.g. "all", "0-9" or "1,3,5-7"
    #[arg(long, default_value = "all")]
    pub frames: String,

    /// Write per-frame results as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Save an overlay figure of tracked frames
    #[arg(long)]
    pub figure: Option<PathBuf>,

    /// Most frames drawn in the overlay figure
    #[arg(long, default_value = "6")]
    pub figure_frames: usize,

    /// Colormap for the overlay figure
    #[arg(long, default_value = "viridis")]
    pub colormap: Colormap,
}

/// Drives an indicatif bar from the batch's worker threads.
struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin(&self, total_frames: usize) {
        self.bar.set_length(total_frames as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, frames_done: usize) {
        self.bar.set_position(frames_done as u64);
    }

    fn finish(&self) {
        self.bar.finish_with_message("Done");
    }
}

/// One line of the JSON report.
#[derive(Serialize)]
struct FrameRecord {
    frame: usize,
    bbox: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&FrameOutcome> for FrameRecord {
    fn from(outcome: &FrameOutcome) -> Self {
        match &outcome.result {
            Ok(bbox) => Self {
                frame: outcome.frame_index,
                bbox: Some(*bbox),
                stage: None,
                error: None,
            },
            Err(e) => Self {
                frame: outcome.frame_index,
                bbox: None,
                stage: Some(e.stage.to_string()),
                error: Some(e.source.to_string()),
            },
        }
    }
}

pub fn run(args: &TrackArgs) -> Result<()> {
    let config = args.pipeline.build_config()?;
    let source = open_source(&args.source)
        .with_context(|| format!("Failed to open {}", args.source.display()))?;
    let info = source_info(&args.source, source.as_ref());
    let indices = parse_frames(&args.frames, info.total_frames)?;

    print_track_summary(&config, &info, indices.len());

    let pipeline = FramePipeline::new(source, config)?;

    let bar = ProgressBar::new(indices.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:12} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    bar.set_message("Tracking");
    let reporter = Arc::new(BarReporter { bar });

    let outcomes = track_frames_reported(&pipeline, &indices, reporter);
    print_outcomes(&outcomes, &TrackSummary::from_outcomes(&outcomes));

    if let Some(ref path) = args.json {
        let records: Vec<FrameRecord> = outcomes.iter().map(FrameRecord::from).collect();
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        println!("Results saved to {}", path.display());
    }

    if let Some(ref path) = args.figure {
        let chosen = spread(&outcomes, args.figure_frames);
        let mut items = Vec::with_capacity(chosen.len());
        for outcome in chosen {
            let frame = pipeline.source().read_frame(outcome.frame_index)?;
            items.push((outcome.frame_index, frame, outcome.bbox()));
        }
        let figure_config = FigureConfig {
            colormap: args.colormap,
            ..Default::default()
        };
        plot_bboxes(&items, &figure_config)?.save(path)?;
        println!("Figure saved to {}", path.display());
    }

    Ok(())
}

/// Up to `max` outcomes evenly spaced across the batch.
fn spread(outcomes: &[FrameOutcome], max: usize) -> Vec<&FrameOutcome> {
    if max == 0 || outcomes.is_empty() {
        return Vec::new();
    }
    if outcomes.len() <= max {
        return outcomes.iter().collect();
    }
    let step = (outcomes.len() - 1) as f64 / (max - 1).max(1) as f64;
    (0..max)
        .map(|i| &outcomes[((i as f64 * step).round() as usize).min(outcomes.len() - 1)])
        .collect()
}

pub mod config;
mod orchestrator;
mod types;

pub use config::TrackConfig;
pub use orchestrator::{track_frames, track_frames_reported, FramePipeline};
pub use types::{FrameOutcome, FrameTrace, PipelineStage, ProgressReporter, TrackSummary};

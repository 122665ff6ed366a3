use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use solidtrack_core::io::image_io::{save_mask_png, save_png};
use solidtrack_core::io::open_source;
use solidtrack_core::pipeline::FramePipeline;
use solidtrack_core::viz::{plot_trace, Colormap, FigureConfig};

use super::PipelineArgs;

#[derive(Args)]
pub struct StagesArgs {
    /// Input stack (TIFF, SER or image directory)
    pub source: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Frame to trace
    #[arg(long, default_value = "0")]
    pub frame: usize,

    /// Directory the stage images are written to
    #[arg(long, default_value = "stages")]
    pub out_dir: PathBuf,

    /// Colormap for the stage figure
    #[arg(long, default_value = "viridis")]
    pub colormap: Colormap,
}

pub fn run(args: &StagesArgs) -> Result<()> {
    let config = args.pipeline.build_config()?;
    let source = open_source(&args.source)
        .with_context(|| format!("Failed to open {}", args.source.display()))?;
    let pipeline = FramePipeline::new(source, config)?;
    let trace = pipeline.trace_frame(args.frame)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;
    let out = |name: &str| args.out_dir.join(format!("frame{:04}_{name}.png", args.frame));

    save_png(&trace.raw, &out("1_raw"))?;
    if let Some(ref sub) = trace.subtracted {
        save_png(sub, &out("2_subtracted"))?;
    }
    save_png(&trace.clipped, &out("3_clipped"))?;
    save_png(&trace.denoised, &out("4_denoised"))?;
    save_mask_png(&trace.mask, &out("5_mask"))?;
    save_mask_png(&trace.filtered_mask, &out("6_filtered"))?;

    let figure_config = FigureConfig {
        colormap: args.colormap,
        figsize: (16.0, 4.0),
        row_title: Some(format!("Frame {}", args.frame)),
        ..Default::default()
    };
    plot_trace(&trace, &figure_config)?.save(&out("stages"))?;

    println!("Frame {}: bbox {}", args.frame, trace.bbox);
    println!("Stages saved to {}", args.out_dir.display());
    Ok(())
}

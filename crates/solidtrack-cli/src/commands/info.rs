use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use solidtrack_core::io::{open_source, source_info};

#[derive(Args)]
pub struct InfoArgs {
    /// Input stack (TIFF, SER or image directory)
    pub source: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = open_source(&args.source)?;
    let info = source_info(&args.source, source.as_ref());

    println!("Source:      {}", info.path.display());
    println!("Format:      {}", info.format);
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);

    let total_mb = (info.width * info.height * info.total_frames * 4) as f64 / (1024.0 * 1024.0);
    println!("In memory:   {:.1} MB as f32", total_mb);

    Ok(())
}

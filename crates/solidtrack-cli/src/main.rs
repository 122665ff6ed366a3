mod commands;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "solidtrack", about = "Solidification front tracking for image stacks")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show frame count and dimensions of a stack
    Info(commands::info::InfoArgs),
    /// Track the bounding box of the melt region across frames
    Track(commands::track::TrackArgs),
    /// Write every pipeline stage of one frame as images
    Stages(commands::stages::StagesArgs),
    /// Print or save the default tracking config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Track(args) => commands::track::run(args),
        Commands::Stages(args) => commands::stages::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

use console::Style;
use solidtrack_core::frame::SourceInfo;
use solidtrack_core::pipeline::{FrameOutcome, TrackConfig, TrackSummary};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
    ok: Style,
    warn: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            error: Style::new().red().bold(),
        }
    }
}

pub fn print_track_summary(config: &TrackConfig, info: &SourceInfo, frames: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Solidification Tracking"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(23)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Source"),
        s.path.apply_to(info.path.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(format!("{frames} of {} ({})", info.total_frames, info.format))
    );
    match config.crop {
        Some(crop) => println!(
            "  {:<14}{}",
            s.label.apply_to("Crop"),
            s.value.apply_to(crop)
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Crop"),
            s.disabled.apply_to("full frame")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Stages"));
    if config.subtract_background {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Background"),
            s.value.apply_to(format!(
                "frame {}, sigma {}",
                config.background.reference_index, config.background.sigma
            ))
        );
    } else {
        println!(
            "    {:<14}{}",
            s.label.apply_to("Background"),
            s.disabled.apply_to("disabled")
        );
    }
    println!(
        "    {:<14}{}",
        s.label.apply_to("Clip"),
        s.value.apply_to(format!("{}-{} pct", config.clip.low, config.clip.high))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Denoise"),
        s.value.apply_to(format!("TV weight {}", config.denoise.weight))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(format!(
            "{} {}",
            config.threshold.direction, config.threshold.value
        ))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Regions"),
        s.value.apply_to(format!(
            "area > {}, {}",
            config.regions.min_region_size, config.regions.connectivity
        ))
    );
    println!();
}

pub fn print_outcomes(outcomes: &[FrameOutcome], summary: &TrackSummary) {
    let s = Styles::new();

    println!();
    for outcome in outcomes {
        match &outcome.result {
            Ok(bbox) => println!(
                "  {:>6}  {}",
                s.label.apply_to(outcome.frame_index),
                s.ok.apply_to(bbox)
            ),
            Err(e) if e.is_no_region() => println!(
                "  {:>6}  {}",
                s.label.apply_to(outcome.frame_index),
                s.warn.apply_to("no region")
            ),
            Err(e) => println!(
                "  {:>6}  {}",
                s.label.apply_to(outcome.frame_index),
                s.error.apply_to(format!("{}: {}", e.stage, e.source))
            ),
        }
    }
    println!();
    println!(
        "  {} tracked, {} without region, {} failed",
        s.ok.apply_to(summary.tracked),
        s.warn.apply_to(summary.no_region),
        s.error.apply_to(summary.failed)
    );
    println!();
}

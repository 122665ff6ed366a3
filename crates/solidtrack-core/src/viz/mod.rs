pub mod colormap;
pub mod figure;

pub use colormap::Colormap;
pub use figure::{plot_bboxes, plot_frames, plot_trace, plot_tracked, Figure, FigureConfig, Panel};

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::consts::{
    AXIS_TICK_SPACING, DEFAULT_DPI, DEFAULT_FIGSIZE, DEFAULT_LINE_WIDTH, DEFAULT_MIN_REGION_SIZE,
};
use crate::detection::{label, regions, Connectivity};
use crate::error::{Result, TrackError};
use crate::frame::{BoundingBox, Frame, Mask};
use crate::io::FrameSource;
use crate::pipeline::{FramePipeline, FrameTrace};

use super::colormap::Colormap;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS_COLOR: Rgb<u8> = Rgb([64, 64, 64]);
const TICK_LENGTH: f32 = 4.0;

/// Display settings for a multi-panel figure.
#[derive(Clone, Debug)]
pub struct FigureConfig {
    pub colormap: Colormap,
    /// Draw axis spines and tick marks around each panel.
    pub show_axis: bool,
    /// Shrink the whitespace between panels.
    pub tight_layout: bool,
    /// Figure size in inches (width, height).
    pub figsize: (f32, f32),
    pub dpi: u32,
    /// Label for the row of panels; reserves a left margin.
    pub row_title: Option<String>,
    pub box_color: Rgb<u8>,
    /// Outline thickness in figure pixels.
    pub line_width: u32,
    /// Regions at or below this area get no box in region overlays.
    pub region_min_area: usize,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            colormap: Colormap::default(),
            show_axis: false,
            tight_layout: true,
            figsize: DEFAULT_FIGSIZE,
            dpi: DEFAULT_DPI,
            row_title: None,
            box_color: Rgb([255, 0, 0]),
            line_width: DEFAULT_LINE_WIDTH,
            region_min_area: DEFAULT_MIN_REGION_SIZE,
        }
    }
}

/// Handle to one panel of a rendered figure.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub title: String,
    pub frame_index: usize,
    /// Top-left corner of the panel in figure pixels.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Figure pixels per source pixel.
    pub scale: f32,
}

impl Panel {
    /// Figure coordinates `(x, y)` of a source `(row, col)` position.
    pub fn to_figure(&self, row: f32, col: f32) -> (f32, f32) {
        (
            self.x as f32 + col * self.scale,
            self.y as f32 + row * self.scale,
        )
    }
}

/// A rendered multi-panel figure.
#[derive(Clone, Debug)]
pub struct Figure {
    pub image: RgbImage,
    pub panels: Vec<Panel>,
    pub row_title: Option<String>,
}

impl Figure {
    pub fn save(&self, path: &Path) -> Result<()> {
        self.image.save(path)?;
        debug!(path = %path.display(), panels = self.panels.len(), "Figure saved");
        Ok(())
    }
}

/// What goes into one panel.
struct PanelSpec<'a> {
    title: String,
    frame_index: usize,
    frame: &'a Frame,
    boxes: Vec<BoundingBox>,
}

/// One panel per frame, titled `Image {index}`.
///
/// With `show_region_bbox`, every 8-connected nonzero region larger than
/// `config.region_min_area` gets its own box. Frames are treated as binary
/// for this: any nonzero pixel is foreground, so touching areas of different
/// gray levels form one region. Pass masks (or mask-like frames) here.
pub fn plot_frames(
    frames: &[(usize, Frame)],
    config: &FigureConfig,
    show_region_bbox: bool,
) -> Result<Figure> {
    let specs = frames
        .iter()
        .map(|(index, frame)| PanelSpec {
            title: format!("Image {index}"),
            frame_index: *index,
            frame,
            boxes: if show_region_bbox {
                region_boxes(frame, config.region_min_area)
            } else {
                Vec::new()
            },
        })
        .collect::<Vec<_>>();
    render(&specs, config)
}

/// One panel per frame with its bounding box drawn on top; `None` draws no box.
pub fn plot_bboxes(
    items: &[(usize, Frame, Option<BoundingBox>)],
    config: &FigureConfig,
) -> Result<Figure> {
    let specs = items
        .iter()
        .map(|(index, frame, bbox)| PanelSpec {
            title: format!("Image {index}"),
            frame_index: *index,
            frame,
            boxes: bbox.iter().copied().collect(),
        })
        .collect::<Vec<_>>();
    render(&specs, config)
}

/// Run the pipeline on each frame and draw the resulting box over the
/// corresponding frame of `display`.
///
/// Frames the pipeline cannot box are drawn without one.
pub fn plot_tracked<S: FrameSource>(
    pipeline: &FramePipeline<S>,
    display: &dyn FrameSource,
    indices: &[usize],
    config: &FigureConfig,
) -> Result<Figure> {
    let mut items = Vec::with_capacity(indices.len());
    for &index in indices {
        let frame = display.read_frame(index)?;
        let bbox = match pipeline.process_frame(index) {
            Ok(b) => Some(b),
            Err(e) => {
                warn!(frame = index, error = %e, "No box for frame");
                None
            }
        };
        items.push((index, frame, bbox));
    }
    plot_bboxes(&items, config)
}

/// Every stage of one pipeline run side by side, boxed where meaningful.
pub fn plot_trace(trace: &FrameTrace, config: &FigureConfig) -> Result<Figure> {
    let mask_frame = mask_to_frame(&trace.mask, &trace.raw);
    let filtered_frame = mask_to_frame(&trace.filtered_mask, &trace.raw);
    let idx = trace.frame_index;

    let mut specs = vec![PanelSpec {
        title: format!("Image {idx}"),
        frame_index: idx,
        frame: &trace.raw,
        boxes: vec![trace.bbox],
    }];
    if let Some(ref sub) = trace.subtracted {
        specs.push(PanelSpec {
            title: "Subtracted".into(),
            frame_index: idx,
            frame: sub,
            boxes: Vec::new(),
        });
    }
    specs.push(PanelSpec {
        title: "Clipped".into(),
        frame_index: idx,
        frame: &trace.clipped,
        boxes: Vec::new(),
    });
    specs.push(PanelSpec {
        title: "Denoised".into(),
        frame_index: idx,
        frame: &trace.denoised,
        boxes: Vec::new(),
    });
    specs.push(PanelSpec {
        title: "Mask".into(),
        frame_index: idx,
        frame: &mask_frame,
        boxes: Vec::new(),
    });
    specs.push(PanelSpec {
        title: "Filtered".into(),
        frame_index: idx,
        frame: &filtered_frame,
        boxes: vec![trace.bbox],
    });

    render(&specs, config)
}

fn mask_to_frame(mask: &Mask, like: &Frame) -> Frame {
    like.with_data(mask.mapv(f32::from))
}

/// Boxes of the nonzero regions of `frame` larger than `min_area`, with the
/// frame read as a binary mask.
fn region_boxes(frame: &Frame, min_area: usize) -> Vec<BoundingBox> {
    let mask = frame.data.mapv(|v| u8::from(v != 0.0));
    let (labels, _) = label(&mask, Connectivity::Eight);
    regions(&labels)
        .into_iter()
        .filter(|r| r.area > min_area)
        .map(|r| r.bbox)
        .collect()
}

fn render(specs: &[PanelSpec<'_>], config: &FigureConfig) -> Result<Figure> {
    if specs.is_empty() {
        return Err(TrackError::EmptySequence);
    }
    let (fig_w, fig_h) = config.figsize;
    if fig_w.is_nan() || fig_h.is_nan() || fig_w <= 0.0 || fig_h <= 0.0 || config.dpi == 0 {
        return Err(TrackError::InvalidParameter(format!(
            "figure size must be positive, got {fig_w}x{fig_h} in at {} dpi",
            config.dpi
        )));
    }

    let width = (fig_w * config.dpi as f32).round() as u32;
    let height = (fig_h * config.dpi as f32).round() as u32;
    let pad = if config.tight_layout {
        config.dpi / 20
    } else {
        config.dpi / 5
    };
    let left = pad + if config.row_title.is_some() { config.dpi / 4 } else { 0 };

    let n = specs.len() as u32;
    let used = left + pad * n;
    if used >= width || 2 * pad >= height {
        return Err(TrackError::InvalidParameter(format!(
            "{n} panels do not fit in a {width}x{height} px figure"
        )));
    }
    let cell_w = (width - used) / n;
    let cell_h = height - 2 * pad;

    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let mut panels = Vec::with_capacity(specs.len());

    for (i, spec) in specs.iter().enumerate() {
        let (rows, cols) = spec.frame.dim();
        if rows == 0 || cols == 0 {
            return Err(TrackError::EmptyFrame);
        }
        let scale = (cell_w as f32 / cols as f32).min(cell_h as f32 / rows as f32);
        let pw = ((cols as f32 * scale).floor() as u32).max(1);
        let ph = ((rows as f32 * scale).floor() as u32).max(1);
        let cell_x = left + i as u32 * (cell_w + pad);
        let panel = Panel {
            title: spec.title.clone(),
            frame_index: spec.frame_index,
            x: cell_x + (cell_w.saturating_sub(pw)) / 2,
            y: pad + (cell_h.saturating_sub(ph)) / 2,
            width: pw,
            height: ph,
            scale,
        };

        blit(&mut image, &panel, spec.frame, config.colormap);
        if config.show_axis {
            draw_axes(&mut image, &panel, rows, cols);
        }
        for bbox in &spec.boxes {
            draw_box(&mut image, &panel, bbox, config.box_color, config.line_width);
        }
        panels.push(panel);
    }

    Ok(Figure {
        image,
        panels,
        row_title: config.row_title.clone(),
    })
}

/// Nearest-neighbor render of `frame`, scaled by its own min/max.
fn blit(image: &mut RgbImage, panel: &Panel, frame: &Frame, colormap: Colormap) {
    let (rows, cols) = frame.dim();
    let (lo, hi) = frame
        .data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = if hi > lo { hi - lo } else { 1.0 };

    for py in 0..panel.height {
        let row = ((py as f32 / panel.scale) as usize).min(rows - 1);
        for px in 0..panel.width {
            let col = ((px as f32 / panel.scale) as usize).min(cols - 1);
            let t = (frame.data[[row, col]] - lo) / range;
            let (x, y) = (panel.x + px, panel.y + py);
            if x < image.width() && y < image.height() {
                image.put_pixel(x, y, colormap.map(t));
            }
        }
    }
}

fn draw_axes(image: &mut RgbImage, panel: &Panel, rows: usize, cols: usize) {
    let x0 = panel.x as f32 - 1.0;
    let y0 = panel.y as f32 - 1.0;
    let x1 = (panel.x + panel.width) as f32;
    let y1 = (panel.y + panel.height) as f32;
    draw_line_segment_mut(image, (x0, y0), (x1, y0), AXIS_COLOR);
    draw_line_segment_mut(image, (x0, y1), (x1, y1), AXIS_COLOR);
    draw_line_segment_mut(image, (x0, y0), (x0, y1), AXIS_COLOR);
    draw_line_segment_mut(image, (x1, y0), (x1, y1), AXIS_COLOR);

    for row in (0..rows).step_by(AXIS_TICK_SPACING) {
        let (_, y) = panel.to_figure(row as f32, 0.0);
        draw_line_segment_mut(image, (x0 - TICK_LENGTH, y), (x0, y), AXIS_COLOR);
    }
    for col in (0..cols).step_by(AXIS_TICK_SPACING) {
        let (x, _) = panel.to_figure(0.0, col as f32);
        draw_line_segment_mut(image, (x, y1), (x, y1 + TICK_LENGTH), AXIS_COLOR);
    }
}

fn draw_box(image: &mut RgbImage, panel: &Panel, bbox: &BoundingBox, color: Rgb<u8>, width: u32) {
    let (x, y) = panel.to_figure(bbox.min_row as f32, bbox.min_col as f32);
    let w = (bbox.width() as f32 * panel.scale).round() as i64;
    let h = (bbox.height() as f32 * panel.scale).round() as i64;

    for inset in 0..width as i64 {
        let (rw, rh) = (w - 2 * inset, h - 2 * inset);
        if rw <= 0 || rh <= 0 {
            break;
        }
        let rect = Rect::at(x.round() as i32 + inset as i32, y.round() as i32 + inset as i32)
            .of_size(rw as u32, rh as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum frame count to use frame-level Rayon parallelism.
pub const PARALLEL_FRAME_THRESHOLD: usize = 4;

/// Small epsilon to avoid division by zero in floating-point comparisons.
pub const EPSILON: f32 = 1e-10;

/// Default crop of the nickel solidification dataset: (x1, y1, x2, y2).
pub const DEFAULT_CROP: (usize, usize, usize, usize) = (175, 60, 250, 110);

/// Frame used as the pre-event reference for background subtraction.
pub const DEFAULT_REFERENCE_INDEX: usize = 0;

/// Gaussian sigma used to smooth both frames before subtraction.
pub const DEFAULT_BLUR_SIGMA: f32 = 1.0;

/// Gaussian kernel half-width in units of sigma.
pub const DEFAULT_BLUR_TRUNCATE: f32 = 4.0;

/// Lower clipping percentile.
pub const DEFAULT_CLIP_LOW: f32 = 5.0;

/// Upper clipping percentile.
pub const DEFAULT_CLIP_HIGH: f32 = 95.0;

/// Total-variation regularization weight.
pub const DEFAULT_DENOISE_WEIGHT: f32 = 0.15;

/// Relative energy change below which Chambolle iteration stops.
pub const TV_CHAMBOLLE_EPS: f32 = 2.0e-4;

/// Iteration cap for Chambolle's projection algorithm.
pub const TV_CHAMBOLLE_MAX_ITERATIONS: usize = 200;

/// Binarization threshold applied to the denoised frame.
pub const DEFAULT_THRESHOLD: f32 = 0.4;

/// Regions with area at or below this pixel count are discarded.
pub const DEFAULT_MIN_REGION_SIZE: usize = 100;

/// Default figure size in inches (width, height).
pub const DEFAULT_FIGSIZE: (f32, f32) = (10.0, 6.0);

/// Pixels per inch when rasterizing figures.
pub const DEFAULT_DPI: u32 = 100;

/// Bounding-box outline thickness in figure pixels.
pub const DEFAULT_LINE_WIDTH: u32 = 2;

/// Spacing of axis tick marks, in source pixels.
pub const AXIS_TICK_SPACING: usize = 10;

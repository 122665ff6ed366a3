pub mod background;
pub mod denoise;
pub mod gaussian_blur;
pub mod percentile;

pub use background::{subtract_background, Background, BackgroundConfig};
pub use denoise::{denoise_tv_chambolle, invert, invert_denoise, DenoiseConfig};
pub use gaussian_blur::{gaussian_blur, gaussian_blur_array, kernel_radius};
pub use percentile::{clip_percentiles, clip_percentiles_after, percentile, percentiles, ClipConfig};

use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::{Result, TrackError};
use crate::frame::{Frame, Mask};

use super::source::{check_index, FrameSource};

const SEQUENCE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "jpg", "jpeg", "bmp"];

/// Save a frame as 16-bit grayscale TIFF. Values are clamped to [0, 1].
pub fn save_tiff(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w) = frame.dim();
    let pixels: Vec<u16> = frame
        .data
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 65535.0) as u16)
        .collect();

    let img = image::ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .ok_or(TrackError::InvalidDimensions {
            width: w as u32,
            height: h as u32,
        })?;
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save a frame as 8-bit grayscale PNG. Values are clamped to [0, 1].
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let (h, w) = frame.dim();
    let mut img = GrayImage::new(w as u32, h as u32);
    for ((row, col), &v) in frame.data.indexed_iter() {
        let val = (v.clamp(0.0, 1.0) * 255.0) as u8;
        img.put_pixel(col as u32, row as u32, Luma([val]));
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save frame, choosing format from file extension.
pub fn save_image(frame: &Frame, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => save_tiff(frame, path),
        Some("png") => save_png(frame, path),
        _ => save_tiff(frame, path),
    }
}

/// Save a binary mask as an 8-bit PNG (foreground white).
pub fn save_mask_png(mask: &Mask, path: &Path) -> Result<()> {
    let (h, w) = mask.dim();
    let mut img = GrayImage::new(w as u32, h as u32);
    for ((row, col), &v) in mask.indexed_iter() {
        img.put_pixel(col as u32, row as u32, Luma([if v != 0 { 255 } else { 0 }]));
    }
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Load a grayscale image file into a Frame.
pub fn load_image(path: &Path) -> Result<Frame> {
    let img = image::open(path)?;
    let color = img.color();
    let bit_depth = if color.bytes_per_pixel() / color.channel_count() <= 1 {
        8
    } else {
        16
    };

    let gray = img.to_luma16();
    let (w, h) = gray.dimensions();
    let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        gray.get_pixel(col as u32, row as u32).0[0] as f32 / 65535.0
    });

    Ok(Frame::new(data, bit_depth))
}

/// A directory of single-frame images, ordered by file name.
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    dims: (usize, usize),
}

impl ImageSequence {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| SEQUENCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if path.is_file() && supported {
                paths.push(path);
            }
        }
        paths.sort();

        let first = paths.first().ok_or(TrackError::EmptySequence)?;
        let (w, h) = image::image_dimensions(first)?;

        Ok(Self {
            paths,
            dims: (h as usize, w as usize),
        })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FrameSource for ImageSequence {
    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.dims
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        check_index(index, self.paths.len())?;
        let mut frame = load_image(&self.paths[index])?;
        if frame.dim() != self.dims {
            return Err(TrackError::ShapeMismatch {
                expected: self.dims,
                actual: frame.dim(),
            });
        }
        frame.metadata.frame_index = index;
        Ok(frame)
    }

    fn format_name(&self) -> &'static str {
        "image sequence"
    }
}

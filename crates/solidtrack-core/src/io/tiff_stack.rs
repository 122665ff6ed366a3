use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::error::{Result, TrackError};
use crate::frame::Frame;

use super::source::{check_index, FrameSource};

/// A multi-page grayscale TIFF, decoded eagerly into memory.
///
/// Integer samples are scaled by the maximum of their type; float samples
/// are kept unchanged.
pub struct TiffStack {
    pages: Vec<Array2<f32>>,
    bit_depth: u8,
}

impl TiffStack {
    pub fn open(path: &Path) -> Result<Self> {
        let file = BufReader::new(File::open(path)?);
        let mut decoder = Decoder::new(file)?;

        let mut pages = Vec::new();
        let mut bit_depth = 0u8;
        loop {
            let (w, h) = decoder.dimensions()?;
            match decoder.colortype()? {
                tiff::ColorType::Gray(bits) => bit_depth = bits,
                other => {
                    return Err(TrackError::UnsupportedFormat(format!(
                        "TIFF page {} has color type {other:?}, expected grayscale",
                        pages.len()
                    )));
                }
            }

            let image = decoder.read_image()?;
            pages.push(to_array(image, h as usize, w as usize)?);

            if !decoder.more_images() {
                break;
            }
            decoder.next_image()?;
        }

        let first = pages[0].dim();
        if let Some(bad) = pages.iter().find(|p| p.dim() != first) {
            return Err(TrackError::ShapeMismatch {
                expected: first,
                actual: bad.dim(),
            });
        }

        debug!(
            pages = pages.len(),
            height = first.0,
            width = first.1,
            bit_depth,
            "Decoded TIFF stack"
        );

        Ok(Self { pages, bit_depth })
    }
}

fn to_array(image: DecodingResult, height: usize, width: usize) -> Result<Array2<f32>> {
    let samples: Vec<f32> = match image {
        DecodingResult::U8(buf) => buf.iter().map(|&v| v as f32 / u8::MAX as f32).collect(),
        DecodingResult::U16(buf) => buf.iter().map(|&v| v as f32 / u16::MAX as f32).collect(),
        DecodingResult::U32(buf) => buf
            .iter()
            .map(|&v| (v as f64 / u32::MAX as f64) as f32)
            .collect(),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.iter().map(|&v| v as f32).collect(),
        _ => {
            return Err(TrackError::UnsupportedFormat(
                "TIFF sample type is not u8/u16/u32/f32/f64".into(),
            ));
        }
    };

    Array2::from_shape_vec((height, width), samples).map_err(|_| TrackError::InvalidDimensions {
        width: width as u32,
        height: height as u32,
    })
}

impl FrameSource for TiffStack {
    fn frame_count(&self) -> usize {
        self.pages.len()
    }

    fn dimensions(&self) -> (usize, usize) {
        self.pages[0].dim()
    }

    fn read_frame(&self, index: usize) -> Result<Frame> {
        check_index(index, self.pages.len())?;
        let mut frame = Frame::new(self.pages[index].clone(), self.bit_depth);
        frame.metadata.frame_index = index;
        Ok(frame)
    }

    fn format_name(&self) -> &'static str {
        "TIFF"
    }
}

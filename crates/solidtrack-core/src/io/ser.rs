use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;

use crate::error::{Result, TrackError};
use crate::frame::Frame;

use super::source::{check_index, FrameSource};

pub const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// Color IDs for interleaved three-plane pixels (RGB, BGR).
const SER_COLOR_RGB: i32 = 100;
const SER_COLOR_BGR: i32 = 101;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
}

impl SerHeader {
    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            SER_COLOR_RGB | SER_COLOR_BGR => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame, or `None` on overflow.
    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_pixel_plane() * self.planes_per_pixel())
    }
}

/// Memory-mapped SER file reader.
pub struct SerReader {
    mmap: Mmap,
    frame_bytes: usize,
    pub header: SerHeader,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and lives as long as the reader.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(TrackError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(TrackError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        let frame_bytes = header
            .frame_byte_size()
            .ok_or_else(|| TrackError::InvalidSer("Frame size overflows".into()))?;

        let expected_data_size = frame_bytes
            .checked_mul(header.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| TrackError::InvalidSer("Data size overflows".into()))?;
        if mmap.len() < expected_data_size {
            return Err(TrackError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected_data_size,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            frame_bytes,
            header,
        })
    }

    /// Get the raw bytes for a single frame (zero-copy from mmap).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        check_index(index, self.header.frame_count as usize)?;
        let offset = SER_HEADER_SIZE + index * self.frame_bytes;
        Ok(&self.mmap[offset..offset + self.frame_bytes])
    }
}

impl FrameSource for SerReader {
    fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.header.height as usize, self.header.width as usize)
    }

    /// Read a single frame, converting to f32 in [0.0, 1.0].
    ///
    /// RGB/BGR frames are reduced to their green plane.
    fn read_frame(&self, index: usize) -> Result<Frame> {
        let raw = self.frame_raw(index)?;
        let layout = PlaneLayout {
            height: self.header.height as usize,
            width: self.header.width as usize,
            bytes_per_sample: self.header.bytes_per_pixel_plane(),
            planes: self.header.planes_per_pixel(),
            bit_depth: self.header.pixel_depth,
            little_endian: self.header.little_endian,
        };
        let plane = if layout.planes == 1 { 0 } else { 1 };
        let data = decode_plane(raw, &layout, plane);

        let mut frame = Frame::new(data, layout.bytes_per_sample as u8 * 8);
        frame.metadata.frame_index = index;
        Ok(frame)
    }

    fn format_name(&self) -> &'static str {
        "SER"
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()? as u32;

    if width == 0 || height == 0 {
        return Err(TrackError::InvalidDimensions { width, height });
    }
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(TrackError::InvalidSer(format!(
            "Unsupported pixel depth {pixel_depth}"
        )));
    }

    // 0 is little-endian in practice (Siril convention), only 1 means big-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
    })
}

struct PlaneLayout {
    height: usize,
    width: usize,
    bytes_per_sample: usize,
    planes: usize,
    bit_depth: u32,
    little_endian: bool,
}

fn decode_plane(raw: &[u8], layout: &PlaneLayout, plane_index: usize) -> Array2<f32> {
    let max_val = ((1u32 << layout.bit_depth) - 1) as f32;
    let bps = layout.bytes_per_sample;

    Array2::from_shape_fn((layout.height, layout.width), |(row, col)| {
        let pixel_offset = (row * layout.width + col) * layout.planes * bps;
        let idx = pixel_offset + plane_index * bps;
        let val = if bps == 1 {
            raw[idx] as f32
        } else {
            let pair = [raw[idx], raw[idx + 1]];
            if layout.little_endian {
                u16::from_le_bytes(pair) as f32
            } else {
                u16::from_be_bytes(pair) as f32
            }
        };
        val / max_val
    })
}

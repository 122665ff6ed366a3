use std::path::Path;

use ndarray::Array2;
use solidtrack_core::io::ser::SER_HEADER_SIZE;

/// Build a mono SER header with the given bit depth.
pub fn build_ser_header(width: u32, height: u32, bit_depth: u32, num_frames: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID (mono)
    buf.extend_from_slice(&0i32.to_le_bytes());
    // LittleEndian
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&[0u8; 16]);

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Complete mono 8-bit SER file with the given frames.
pub fn build_ser_with_frames(width: u32, height: u32, frames: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = build_ser_header(width, height, 8, frames.len());
    for frame in frames {
        buf.extend_from_slice(frame);
    }
    buf
}

/// Write `data` to `name` inside `dir`.
pub fn write_temp(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write temp file");
    path
}

/// Write a multi-page 8-bit grayscale TIFF.
pub fn write_tiff_stack_u8(path: &Path, width: u32, height: u32, pages: &[Vec<u8>]) {
    use tiff::encoder::{colortype, TiffEncoder};
    let file = std::fs::File::create(path).expect("create tiff");
    let mut encoder = TiffEncoder::new(file).expect("tiff encoder");
    for page in pages {
        encoder
            .write_image::<colortype::Gray8>(width, height, page)
            .expect("write tiff page");
    }
}

/// Write a multi-page 32-bit float grayscale TIFF.
pub fn write_tiff_stack_f32(path: &Path, pages: &[Array2<f32>]) {
    use tiff::encoder::{colortype, TiffEncoder};
    let file = std::fs::File::create(path).expect("create tiff");
    let mut encoder = TiffEncoder::new(file).expect("tiff encoder");
    for page in pages {
        let (h, w) = page.dim();
        let samples: Vec<f32> = page.iter().copied().collect();
        encoder
            .write_image::<colortype::Gray32Float>(w as u32, h as u32, &samples)
            .expect("write tiff page");
    }
}

/// Frame filled with `background` except a `value` square at
/// rows/cols `start..start + size`.
pub fn square_frame(
    dim: usize,
    start: usize,
    size: usize,
    background: f32,
    value: f32,
) -> Array2<f32> {
    Array2::from_shape_fn((dim, dim), |(r, c)| {
        if (start..start + size).contains(&r) && (start..start + size).contains(&c) {
            value
        } else {
            background
        }
    })
}

/// Reference frame plus frames with a dark square on a bright field.
///
/// After background subtraction, clipping and inversion the square is the
/// only bright feature, so every frame after the first tracks to
/// `(14, 14, 26, 26)`.
pub fn melt_stack(frames: usize) -> Vec<Array2<f32>> {
    let mut stack = vec![Array2::from_elem((40, 40), 0.2)];
    for _ in 1..frames {
        stack.push(square_frame(40, 14, 12, 1.0, 0.2));
    }
    stack
}

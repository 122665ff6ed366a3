#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;
use image::{GrayImage, Luma};
use ndarray::Array2;
use tempfile::TempDir;

use solidtrack_core::error::TrackError;
use solidtrack_core::frame::Frame;
use solidtrack_core::io::image_io::{load_image, save_mask_png, save_png, save_tiff};
use solidtrack_core::io::{
    load_frame, open_source, source_info, CropBox, CroppedSource, FrameSource, MemoryStack,
    SerReader, TiffStack,
};

/// Five 5x5 pages where pixel (r, c) of page k holds `10 * k + r * 5 + c`.
fn numbered_pages() -> Vec<Vec<u8>> {
    (0..5u8)
        .map(|k| (0..25u8).map(|i| 10 * k + i).collect())
        .collect()
}

#[test]
fn test_tiff_stack_crop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.tif");
    common::write_tiff_stack_u8(&path, 5, 5, &numbered_pages());

    let frame = load_frame(2, &path, Some(CropBox::new(1, 1, 4, 4))).unwrap();
    assert_eq!(frame.dim(), (3, 3));
    // Top-left of the crop is source pixel (row 1, col 1).
    assert_abs_diff_eq!(frame.data[[0, 0]], (20.0 + 6.0) / 255.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.data[[2, 2]], (20.0 + 18.0) / 255.0, epsilon = 1e-6);
}

#[test]
fn test_first_frame_crop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.tif");
    common::write_tiff_stack_u8(&path, 5, 5, &numbered_pages());

    let frame = load_frame(0, &path, Some(CropBox::new(1, 1, 4, 4))).unwrap();
    assert_eq!(frame.dim(), (3, 3));
    assert_abs_diff_eq!(frame.data[[0, 0]], 6.0 / 255.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.data[[2, 2]], 18.0 / 255.0, epsilon = 1e-6);
}

#[test]
fn test_tiff_stack_without_crop() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.tiff");
    common::write_tiff_stack_u8(&path, 5, 5, &numbered_pages());

    let stack = TiffStack::open(&path).unwrap();
    assert_eq!(stack.frame_count(), 5);
    assert_eq!(stack.dimensions(), (5, 5));
    let frame = stack.read_frame(4).unwrap();
    assert_eq!(frame.original_bit_depth, 8);
    assert_eq!(frame.metadata.frame_index, 4);
    assert_abs_diff_eq!(frame.data[[4, 4]], 64.0 / 255.0, epsilon = 1e-6);
}

#[test]
fn test_tiff_float_pages_kept_as_is() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("float.tif");
    let page = Array2::from_shape_fn((3, 4), |(r, c)| r as f32 * 0.5 - c as f32 * 0.1);
    common::write_tiff_stack_f32(&path, &[page.clone(), page.clone()]);

    let stack = TiffStack::open(&path).unwrap();
    assert_eq!(stack.frame_count(), 2);
    assert_eq!(stack.read_frame(1).unwrap().data, page);
}

#[test]
fn test_frame_index_out_of_range() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.tif");
    common::write_tiff_stack_u8(&path, 5, 5, &numbered_pages());

    let err = load_frame(5, &path, None).unwrap_err();
    assert!(matches!(
        err,
        TrackError::FrameIndexOutOfRange { index: 5, total: 5 }
    ));
}

#[test]
fn test_crop_out_of_bounds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.tif");
    common::write_tiff_stack_u8(&path, 5, 5, &numbered_pages());

    let err = load_frame(0, &path, Some(CropBox::new(1, 1, 6, 4))).unwrap_err();
    assert!(matches!(err, TrackError::CropOutOfBounds { x2: 6, .. }));

    // Empty crops are rejected too.
    let err = load_frame(0, &path, Some(CropBox::new(2, 1, 2, 4))).unwrap_err();
    assert!(matches!(err, TrackError::CropOutOfBounds { .. }));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = common::write_temp(dir.path(), "frames.avi", b"not a stack");
    assert!(matches!(
        open_source(&path),
        Err(TrackError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_ser_source() {
    let dir = TempDir::new().unwrap();
    let frames: Vec<Vec<u8>> = (0..3u8).map(|k| vec![k * 100; 6 * 4]).collect();
    let path = common::write_temp(
        dir.path(),
        "capture.ser",
        &common::build_ser_with_frames(6, 4, &frames),
    );

    let source = open_source(&path).unwrap();
    assert_eq!(source.format_name(), "SER");
    assert_eq!(source.frame_count(), 3);
    assert_eq!(source.dimensions(), (4, 6));

    let frame = source.read_frame(2).unwrap();
    assert_abs_diff_eq!(frame.data[[3, 5]], 200.0 / 255.0, epsilon = 1e-6);

    let info = source_info(&path, source.as_ref());
    assert_eq!((info.width, info.height, info.total_frames), (6, 4, 3));
}

#[test]
fn test_ser_16bit_little_endian() {
    let dir = TempDir::new().unwrap();
    let mut data = common::build_ser_header(2, 1, 12, 1);
    data.extend_from_slice(&4095u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    let path = common::write_temp(dir.path(), "deep.ser", &data);

    let reader = SerReader::open(&path).unwrap();
    let frame = reader.read_frame(0).unwrap();
    assert_abs_diff_eq!(frame.data[[0, 0]], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(frame.data[[0, 1]], 0.0);
}

#[test]
fn test_ser_rejects_truncated_file() {
    let dir = TempDir::new().unwrap();
    let mut data = common::build_ser_header(8, 8, 8, 2);
    data.extend_from_slice(&[0u8; 64]);
    let path = common::write_temp(dir.path(), "short.ser", &data);

    assert!(matches!(SerReader::open(&path), Err(TrackError::InvalidSer(_))));
}

#[test]
fn test_ser_rejects_bad_magic() {
    let dir = TempDir::new().unwrap();
    let mut data = common::build_ser_with_frames(2, 2, &[vec![0; 4]]);
    data[0] = b'X';
    let path = common::write_temp(dir.path(), "bad.ser", &data);
    assert!(matches!(SerReader::open(&path), Err(TrackError::InvalidSer(_))));
}

#[test]
fn test_image_sequence_directory() {
    let dir = TempDir::new().unwrap();
    for (i, value) in [10u8, 20, 30].iter().enumerate() {
        let img = GrayImage::from_pixel(4, 3, Luma([*value]));
        img.save(dir.path().join(format!("frame_{i:03}.png"))).unwrap();
    }
    common::write_temp(dir.path(), "notes.txt", b"ignored");

    let source = open_source(dir.path()).unwrap();
    assert_eq!(source.frame_count(), 3);
    assert_eq!(source.dimensions(), (3, 4));
    let frame = source.read_frame(1).unwrap();
    assert_abs_diff_eq!(frame.data[[0, 0]], 20.0 / 255.0, epsilon = 1e-4);
}

#[test]
fn test_empty_directory_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        open_source(dir.path()),
        Err(TrackError::EmptySequence)
    ));
}

#[test]
fn test_memory_stack_and_cropped_source() {
    let frames = vec![Array2::from_elem((6, 8), 0.1f32), Array2::from_elem((6, 8), 0.9)];
    let stack = MemoryStack::new(frames).unwrap();
    let cropped = CroppedSource::new(stack, Some(CropBox::new(2, 1, 7, 4))).unwrap();

    assert_eq!(cropped.frame_count(), 2);
    assert_eq!(cropped.dimensions(), (3, 5));
    let frame = cropped.read_frame(1).unwrap();
    assert_eq!(frame.dim(), (3, 5));
    assert!(frame.data.iter().all(|&v| v == 0.9));
}

#[test]
fn test_memory_stack_rejects_mixed_shapes() {
    assert!(matches!(
        MemoryStack::new(vec![]),
        Err(TrackError::EmptySequence)
    ));
    let err = MemoryStack::new(vec![Array2::zeros((2, 2)), Array2::zeros((3, 2))]).unwrap_err();
    assert!(matches!(err, TrackError::ShapeMismatch { .. }));
}

#[test]
fn test_cropped_source_validates_up_front() {
    let stack = MemoryStack::new(vec![Array2::zeros((4, 4))]).unwrap();
    assert!(CroppedSource::new(stack, Some(CropBox::new(0, 0, 5, 4))).is_err());
}

#[test]
fn test_crop_box_parsing() {
    let crop: CropBox = "175, 60,250,110".parse().unwrap();
    assert_eq!(crop, CropBox::NICKEL_DEFAULT);
    assert_eq!((crop.width(), crop.height()), (75, 50));
    assert_eq!(crop.to_string().parse::<CropBox>().unwrap(), crop);
    assert!("1,2,3".parse::<CropBox>().is_err());
    assert!("a,b,c,d".parse::<CropBox>().is_err());
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let data = Array2::from_shape_fn((6, 9), |(r, c)| (r + c) as f32 / 13.0);
    let frame = Frame::new(data, 16);

    let tiff = dir.path().join("frame.tiff");
    save_tiff(&frame, &tiff).unwrap();
    let back = load_image(&tiff).unwrap();
    assert_eq!(back.dim(), (6, 9));
    assert_eq!(back.original_bit_depth, 16);
    assert_abs_diff_eq!(back.data[[5, 8]], 1.0, epsilon = 1e-4);

    let png = dir.path().join("frame.png");
    save_png(&frame, &png).unwrap();
    let back = load_image(&png).unwrap();
    assert_eq!(back.original_bit_depth, 8);
    assert_abs_diff_eq!(back.data[[3, 3]], 6.0 / 13.0, epsilon = 1.0 / 255.0);

    let mask_path = dir.path().join("mask.png");
    let mask = Array2::from_shape_fn((4, 4), |(r, _)| u8::from(r < 2));
    save_mask_png(&mask, &mask_path).unwrap();
    let back = load_image(&mask_path).unwrap();
    assert_eq!(back.data[[0, 0]], 1.0);
    assert_eq!(back.data[[3, 0]], 0.0);
}

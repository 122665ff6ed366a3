#[allow(dead_code)]
mod common;

use ndarray::Array2;
use solidtrack_core::detection::{
    filter_region_size, filter_regions, label, region_bounding_box, regions, threshold,
    Connectivity, OutputMode, RegionFilterConfig, RegionOutput, ThresholdConfig,
    ThresholdDirection,
};
use solidtrack_core::error::TrackError;
use solidtrack_core::frame::{BoundingBox, Frame, Mask};

fn mask_with_block(dim: usize, r0: usize, c0: usize, h: usize, w: usize) -> Mask {
    Array2::from_shape_fn((dim, dim), |(r, c)| {
        u8::from((r0..r0 + h).contains(&r) && (c0..c0 + w).contains(&c))
    })
}

fn min_size(n: usize) -> RegionFilterConfig {
    RegionFilterConfig {
        min_region_size: n,
        ..Default::default()
    }
}

#[test]
fn test_threshold_is_strict() {
    let frame = Frame::new(
        Array2::from_shape_vec((1, 4), vec![0.3, 0.4, 0.41, 0.9]).unwrap(),
        32,
    );
    let mask = threshold(&frame, &ThresholdConfig::default());
    assert_eq!(mask.iter().copied().collect::<Vec<_>>(), vec![0, 0, 1, 1]);

    let less = ThresholdConfig {
        value: 0.4,
        direction: ThresholdDirection::Less,
    };
    let mask = threshold(&frame, &less);
    assert_eq!(mask.iter().copied().collect::<Vec<_>>(), vec![1, 0, 0, 0]);
}

#[test]
fn test_block_bounding_box() {
    let mask = mask_with_block(10, 2, 2, 4, 4);
    let bbox = region_bounding_box(&mask, &min_size(10)).unwrap();
    assert_eq!(bbox, BoundingBox::new(2, 2, 6, 6));
    assert_eq!(bbox.area(), 16);
}

#[test]
fn test_small_region_is_rejected() {
    let mask = mask_with_block(10, 2, 2, 4, 4);
    let err = region_bounding_box(&mask, &min_size(20)).unwrap_err();
    assert!(matches!(err, TrackError::NoRegionFound { min_region_size: 20 }));

    // Area must be strictly greater than the minimum.
    assert!(region_bounding_box(&mask, &min_size(16)).is_err());
    assert!(region_bounding_box(&mask, &min_size(15)).is_ok());
}

#[test]
fn test_zero_minimum_keeps_single_pixel() {
    let mut mask = Mask::zeros((9, 9));
    mask[[3, 7]] = 1;

    let bbox = region_bounding_box(&mask, &min_size(0)).unwrap();
    assert_eq!(bbox, BoundingBox::new(3, 7, 4, 8));

    // One pixel does not exceed a minimum of one.
    assert!(matches!(
        region_bounding_box(&mask, &min_size(1)),
        Err(TrackError::NoRegionFound { min_region_size: 1 })
    ));
}

#[test]
fn test_all_zero_mask_has_no_region() {
    let mask = Mask::zeros((8, 8));
    let err = filter_region_size(&mask, &min_size(0), OutputMode::FilteredMask).unwrap_err();
    assert!(matches!(err, TrackError::NoRegionFound { .. }));
}

#[test]
fn test_bbox_spans_all_retained_regions() {
    let mut mask = mask_with_block(20, 1, 1, 4, 4);
    mask += &mask_with_block(20, 12, 10, 5, 6);
    // A speck that must not widen the box.
    mask[[19, 19]] = 1;

    let bbox = region_bounding_box(&mask, &min_size(5)).unwrap();
    assert_eq!(bbox, BoundingBox::new(1, 1, 17, 16));
}

#[test]
fn test_filtered_mask_drops_small_regions() {
    let mut mask = mask_with_block(12, 0, 0, 5, 5);
    mask[[10, 10]] = 1;

    let out = filter_region_size(&mask, &min_size(3), OutputMode::FilteredMask).unwrap();
    let RegionOutput::Mask(filtered) = out else {
        panic!("expected a mask");
    };
    assert_eq!(filtered[[10, 10]], 0);
    assert_eq!(filtered.iter().filter(|&&v| v != 0).count(), 25);
}

#[test]
fn test_filter_is_idempotent() {
    let mut mask = mask_with_block(16, 3, 3, 6, 6);
    mask[[0, 15]] = 1;
    mask[[15, 0]] = 1;
    let cfg = min_size(4);

    let once = filter_regions(&mask, &cfg).unwrap();
    let twice = filter_regions(&once, &cfg).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_connectivity_controls_diagonal_joins() {
    let mut mask = Mask::zeros((4, 4));
    mask[[0, 0]] = 1;
    mask[[1, 1]] = 1;
    mask[[2, 2]] = 1;

    let (_, n8) = label(&mask, Connectivity::Eight);
    let (_, n4) = label(&mask, Connectivity::Four);
    assert_eq!(n8, 1);
    assert_eq!(n4, 3);
}

#[test]
fn test_u_shape_merges_into_one_label() {
    // Two arms joined only at the bottom need the union step.
    let mut mask = Mask::zeros((5, 5));
    for r in 0..5 {
        mask[[r, 0]] = 1;
        mask[[r, 4]] = 1;
    }
    for c in 0..5 {
        mask[[4, c]] = 1;
    }

    let (labels, n) = label(&mask, Connectivity::Four);
    assert_eq!(n, 1);
    let regs = regions(&labels);
    assert_eq!(regs.len(), 1);
    assert_eq!(regs[0].area, 13);
    assert_eq!(regs[0].bbox, BoundingBox::new(0, 0, 5, 5));
}

#[test]
fn test_labels_follow_raster_order() {
    let mut mask = Mask::zeros((6, 6));
    mask[[4, 0]] = 1;
    mask[[0, 5]] = 1;

    let (labels, n) = label(&mask, Connectivity::Eight);
    assert_eq!(n, 2);
    assert_eq!(labels[[0, 5]], 1);
    assert_eq!(labels[[4, 0]], 2);
}

#[test]
fn test_bounding_box_output_mode() {
    let mask = mask_with_block(10, 3, 4, 2, 5);
    let out = filter_region_size(&mask, &min_size(1), OutputMode::BoundingBox).unwrap();
    assert_eq!(out, RegionOutput::BoundingBox(BoundingBox::new(3, 4, 5, 9)));
}

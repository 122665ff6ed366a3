use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_CLIP_HIGH, DEFAULT_CLIP_LOW, EPSILON};
use crate::error::{Result, TrackError};
use crate::frame::Frame;

/// Percentile bounds for contrast normalization, in percent (0..=100).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    pub low: f32,
    pub high: f32,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            low: DEFAULT_CLIP_LOW,
            high: DEFAULT_CLIP_HIGH,
        }
    }
}

impl ClipConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.low) || !(0.0..=100.0).contains(&self.high) {
            return Err(TrackError::InvalidParameter(format!(
                "clip percentiles must lie in [0, 100], got low={} high={}",
                self.low, self.high
            )));
        }
        if self.low >= self.high {
            return Err(TrackError::InvalidParameter(format!(
                "clip low percentile {} must be below high percentile {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Compute one percentile of the array, `q` in percent.
pub fn percentile(data: &Array2<f32>, q: f32) -> Result<f32> {
    Ok(percentiles(data, &[q])?[0])
}

/// Compute several percentiles with a single sort.
///
/// Uses linear interpolation between the two closest ranks, so the 50th
/// percentile of an even-length array is the mean of the middle pair.
pub fn percentiles(data: &Array2<f32>, qs: &[f32]) -> Result<Vec<f32>> {
    if data.is_empty() {
        return Err(TrackError::EmptyFrame);
    }
    if let Some(q) = qs.iter().find(|q| !(0.0..=100.0).contains(*q)) {
        return Err(TrackError::InvalidParameter(format!(
            "percentile {q} outside [0, 100]"
        )));
    }

    let mut sorted: Vec<f32> = data.iter().copied().collect();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let last = (sorted.len() - 1) as f64;

    Ok(qs
        .iter()
        .map(|&q| {
            let rank = q as f64 / 100.0 * last;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            let (a, b) = (sorted[lo] as f64, sorted[hi] as f64);
            (a + (b - a) * frac) as f32
        })
        .collect())
}

/// Stretch contrast between two percentiles.
///
/// Subtracts the low-percentile value, clamps negatives to 0, divides by the
/// high-percentile value and clamps the result to 1. Fails with
/// `DivisionByZero` when the high-percentile value is zero.
pub fn clip_percentiles(frame: &Frame, config: &ClipConfig) -> Result<Frame> {
    config.validate()?;
    let p = percentiles(&frame.data, &[config.low, config.high])?;
    let (p_low, p_high) = (p[0], p[1]);
    debug!(p_low, p_high, "Clip percentiles");

    if p_high.abs() < EPSILON {
        return Err(TrackError::DivisionByZero {
            percentile: config.high,
        });
    }

    // A negative p_high would flip the sign of every pixel; the lower clamp
    // keeps the output inside [0, 1] regardless.
    let data = frame
        .data
        .mapv(|v| ((v - p_low).max(0.0) / p_high).clamp(0.0, 1.0));
    Ok(frame.with_data(data))
}

/// Apply `preprocess` and then clip the result.
pub fn clip_percentiles_after<F>(frame: &Frame, preprocess: F, config: &ClipConfig) -> Result<Frame>
where
    F: FnOnce(&Frame) -> Result<Frame>,
{
    let pre = preprocess(frame)?;
    clip_percentiles(&pre, config)
}

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::consts::{DEFAULT_DENOISE_WEIGHT, TV_CHAMBOLLE_EPS, TV_CHAMBOLLE_MAX_ITERATIONS};
use crate::error::{Result, TrackError};
use crate::frame::Frame;

/// Total-variation denoising parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    /// Regularization strength. Larger values give smoother output.
    pub weight: f32,
    /// Stop once the relative energy change drops below this.
    pub eps: f32,
    pub max_iterations: usize,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            weight: DEFAULT_DENOISE_WEIGHT,
            eps: TV_CHAMBOLLE_EPS,
            max_iterations: TV_CHAMBOLLE_MAX_ITERATIONS,
        }
    }
}

/// `1 - v` for every pixel.
pub fn invert(frame: &Frame) -> Frame {
    frame.with_data(frame.data.mapv(|v| 1.0 - v))
}

/// Invert a normalized frame, then apply total-variation denoising.
///
/// The output is not clamped.
pub fn invert_denoise(frame: &Frame, config: &DenoiseConfig) -> Result<Frame> {
    let inverted = invert(frame);
    let data = denoise_tv_chambolle(&inverted.data, config)?;
    Ok(frame.with_data(data))
}

/// Chambolle's projection algorithm for 2D total-variation denoising.
///
/// Solves the ROF problem by iterating on the dual field `p`; the primal
/// estimate is `image - div(p)`.
pub fn denoise_tv_chambolle(image: &Array2<f32>, config: &DenoiseConfig) -> Result<Array2<f32>> {
    if config.weight.is_nan() || config.weight <= 0.0 {
        return Err(TrackError::InvalidParameter(format!(
            "denoise weight must be > 0, got {}",
            config.weight
        )));
    }
    let (h, w) = image.dim();
    if image.is_empty() {
        return Ok(image.clone());
    }

    let weight = config.weight;
    let tau = 0.25f32;
    let size = (h * w) as f64;

    // Dual field, one component per axis.
    let mut p_row = Array2::<f32>::zeros((h, w));
    let mut p_col = Array2::<f32>::zeros((h, w));
    let mut d = Array2::<f32>::zeros((h, w));
    let mut out = image.clone();

    let mut energy_init = 0.0f64;
    let mut energy_prev = 0.0f64;

    for i in 0..config.max_iterations {
        if i > 0 {
            // d = -div(p), with p treated as zero past the leading edges.
            for row in 0..h {
                for col in 0..w {
                    let mut v = -(p_row[[row, col]] + p_col[[row, col]]);
                    if row > 0 {
                        v += p_row[[row - 1, col]];
                    }
                    if col > 0 {
                        v += p_col[[row, col - 1]];
                    }
                    d[[row, col]] = v;
                }
            }
            out = image + &d;
        }

        let mut energy: f64 = d.iter().map(|&v| (v as f64) * (v as f64)).sum();

        for row in 0..h {
            for col in 0..w {
                let g_row = if row + 1 < h {
                    out[[row + 1, col]] - out[[row, col]]
                } else {
                    0.0
                };
                let g_col = if col + 1 < w {
                    out[[row, col + 1]] - out[[row, col]]
                } else {
                    0.0
                };
                let norm = (g_row * g_row + g_col * g_col).sqrt();
                energy += (weight * norm) as f64;

                let scale = 1.0 + norm * tau / weight;
                p_row[[row, col]] = (p_row[[row, col]] - tau * g_row) / scale;
                p_col[[row, col]] = (p_col[[row, col]] - tau * g_col) / scale;
            }
        }

        energy /= size;
        if i == 0 {
            energy_init = energy;
            energy_prev = energy;
            if energy_init == 0.0 {
                break;
            }
        } else {
            if (energy_prev - energy).abs() < config.eps as f64 * energy_init {
                trace!(iterations = i, energy, "TV denoise converged");
                break;
            }
            energy_prev = energy;
        }
    }

    Ok(out)
}

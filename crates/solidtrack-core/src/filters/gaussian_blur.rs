use ndarray::{Array2, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::Frame;

/// Apply Gaussian blur to a frame using separable 1D convolution.
pub fn gaussian_blur(frame: &Frame, sigma: f32, truncate: f32) -> Frame {
    frame.with_data(gaussian_blur_array(&frame.data, sigma, truncate))
}

/// Apply Gaussian blur to a raw array.
///
/// The kernel spans `round(truncate * sigma)` pixels on each side and edge
/// pixels are replicated past the border. A NaN or non-positive `sigma` returns
/// a copy.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32, truncate: f32) -> Array2<f32> {
    if sigma.is_nan() || sigma <= 0.0 || data.is_empty() {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma, truncate);
    let row_pass = convolve(data, &kernel, Pass::AlongRows);
    convolve(&row_pass, &kernel, Pass::AlongCols)
}

/// Half-width in pixels of the kernel for `sigma` and `truncate`.
pub fn kernel_radius(sigma: f32, truncate: f32) -> usize {
    (truncate * sigma + 0.5) as usize
}

fn make_gaussian_kernel(sigma: f32, truncate: f32) -> Vec<f32> {
    let radius = kernel_radius(sigma, truncate);
    let size = 2 * radius + 1;
    let mut kernel = vec![0.0f32; size];
    let s2 = 2.0 * sigma * sigma;
    let mut sum = 0.0f32;

    for (i, k) in kernel.iter_mut().enumerate() {
        let x = i as f32 - radius as f32;
        *k = (-x * x / s2).exp();
        sum += *k;
    }

    for v in &mut kernel {
        *v /= sum;
    }

    kernel
}

#[derive(Clone, Copy)]
enum Pass {
    /// Convolve each row horizontally.
    AlongRows,
    /// Convolve each column vertically.
    AlongCols,
}

fn convolve(data: &Array2<f32>, kernel: &[f32], pass: Pass) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;

    let sample = |row: usize, col: usize| -> f32 {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let offset = ki as isize - radius;
            let v = match pass {
                Pass::AlongRows => {
                    let c = (col as isize + offset).clamp(0, w as isize - 1) as usize;
                    data[[row, c]]
                }
                Pass::AlongCols => {
                    let r = (row as isize + offset).clamp(0, h as isize - 1) as usize;
                    data[[r, col]]
                }
            };
            sum += v * kv;
        }
        sum
    };

    let mut result = Array2::<f32>::zeros((h, w));
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        Zip::indexed(&mut result).par_for_each(|(row, col), out| *out = sample(row, col));
    } else {
        Zip::indexed(&mut result).for_each(|(row, col), out| *out = sample(row, col));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized_and_symmetric() {
        let k = make_gaussian_kernel(1.0, 4.0);
        assert_eq!(k.len(), 9);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-7);
        }
    }
}

//! Matrix-multiply upsampled DFT (Guizar-Sicairos et al., 2008).
//!
//! Evaluates the inverse DFT of a small spectrum over a narrow window of
//! fractionally spaced output positions, one dense kernel matrix per axis,
//! instead of zero-padding the whole array and running a full oversampled
//! FFT. Cost is bounded by `O(input_len * region_len)`.

use std::f64::consts::TAU;

use ndarray::{Array2, ArrayD, IxDyn};
use num_complex::Complex;
use num_traits::Zero;
use rayon::prelude::*;

use crate::consts::PARALLEL_SAMPLE_THRESHOLD;

/// Evaluate the unnormalized inverse DFT of `data` over a rectangular window
/// of output positions at `1 / upsample_factor` sample spacing.
///
/// The entry at multi-index `k` is the inverse DFT of `data` evaluated at
/// position `(k[axis] - axis_offsets[axis]) / upsample_factor` along each
/// axis. Frequencies follow the usual FFT layout (positive half first, then
/// the negative half), which makes the evaluation match zero-pad-and-FFT
/// interpolation.
///
/// `region_size` and `axis_offsets` must have one entry per axis of `data`,
/// region sizes and `upsample_factor` must be positive; violations are
/// programmer errors and panic.
pub fn upsampled_dft(
    data: &ArrayD<Complex<f64>>,
    region_size: &[usize],
    upsample_factor: f64,
    axis_offsets: &[f64],
) -> ArrayD<Complex<f64>> {
    assert_eq!(region_size.len(), data.ndim(), "one region size per axis");
    assert_eq!(axis_offsets.len(), data.ndim(), "one offset per axis");
    assert!(upsample_factor > 0.0, "upsample factor must be positive");
    assert!(
        region_size.iter().all(|&s| s > 0),
        "region sizes must be positive"
    );

    // Contract the last axis repeatedly; each pass prepends the new output
    // axis, so walking the original axes in reverse restores their order.
    let mut work = data.to_owned();
    for ax in (0..data.ndim()).rev() {
        let kernel = dft_kernel(
            data.len_of(ndarray::Axis(ax)),
            region_size[ax],
            axis_offsets[ax],
            upsample_factor,
        );
        work = contract_last_axis(&work, &kernel);
    }
    work
}

/// Kernel matrix of shape `(region, n)` whose `(m, k)` entry is
/// `exp(+2πi * freq_k * (m - offset) / (n * upsample_factor))`, with `freq_k`
/// the signed frequency index of bin `k`.
fn dft_kernel(n: usize, region: usize, offset: f64, upsample_factor: f64) -> Array2<Complex<f64>> {
    let mut kernel = Array2::zeros((region, n));
    let denom = n as f64 * upsample_factor;
    for m in 0..region {
        let pos = m as f64 - offset;
        for k in 0..n {
            let freq = if k < (n + 1) / 2 {
                k as f64
            } else {
                k as f64 - n as f64
            };
            kernel[[m, k]] = Complex::from_polar(1.0, TAU * freq * pos / denom);
        }
    }
    kernel
}

/// Contract the last axis of `data` against `kernel` (shape `(region, n)`),
/// producing an array of shape `(region, ...leading axes of data)`.
fn contract_last_axis(
    data: &ArrayD<Complex<f64>>,
    kernel: &Array2<Complex<f64>>,
) -> ArrayD<Complex<f64>> {
    let shape = data.shape().to_vec();
    let n = *shape.last().expect("array has at least one axis");
    let rest = data.len() / n;
    let region = kernel.nrows();

    // Row-major copy; lane j occupies buf[j * n .. (j + 1) * n].
    let buf: Vec<Complex<f64>> = data.iter().copied().collect();

    let compute_row = |m: usize| -> Vec<Complex<f64>> {
        (0..rest)
            .map(|j| {
                let lane = &buf[j * n..(j + 1) * n];
                let mut acc = Complex::zero();
                for (k, v) in lane.iter().enumerate() {
                    acc += kernel[[m, k]] * v;
                }
                acc
            })
            .collect()
    };

    let rows: Vec<Vec<Complex<f64>>> = if region * data.len() >= PARALLEL_SAMPLE_THRESHOLD {
        (0..region).into_par_iter().map(compute_row).collect()
    } else {
        (0..region).map(compute_row).collect()
    };

    let mut out_shape = Vec::with_capacity(shape.len());
    out_shape.push(region);
    out_shape.extend_from_slice(&shape[..shape.len() - 1]);

    let flat: Vec<Complex<f64>> = rows.into_iter().flatten().collect();
    ArrayD::from_shape_vec(IxDyn(&out_shape), flat)
        .expect("contraction output matches its declared shape")
}

use std::sync::Arc;

use ndarray::{ArrayD, Axis};
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::consts::PARALLEL_SAMPLE_THRESHOLD;

/// In-place forward FFT over every axis of an N-dimensional complex array.
pub fn fftn(data: &mut ArrayD<Complex<f64>>) {
    let mut planner = FftPlanner::new();
    for ax in 0..data.ndim() {
        let len = data.len_of(Axis(ax));
        if len < 2 {
            continue;
        }
        let fft = planner.plan_fft_forward(len);
        transform_axis(data, ax, &fft);
    }
}

/// In-place inverse FFT over every axis, normalized by `1 / total_len`.
pub fn ifftn(data: &mut ArrayD<Complex<f64>>) {
    let mut planner = FftPlanner::new();
    for ax in 0..data.ndim() {
        let len = data.len_of(Axis(ax));
        if len < 2 {
            continue;
        }
        let fft = planner.plan_fft_inverse(len);
        transform_axis(data, ax, &fft);
    }
    let scale = 1.0 / data.len() as f64;
    data.mapv_inplace(|v| v * scale);
}

/// Run a planned 1-D transform along every lane of the given axis.
///
/// Lanes are gathered into contiguous buffers, processed, and scattered back,
/// so the transform works for any memory layout.
fn transform_axis(data: &mut ArrayD<Complex<f64>>, ax: usize, fft: &Arc<dyn Fft<f64>>) {
    if data.len() >= PARALLEL_SAMPLE_THRESHOLD {
        transform_axis_parallel(data, ax, fft);
    } else {
        transform_axis_sequential(data, ax, fft);
    }
}

fn transform_axis_parallel(data: &mut ArrayD<Complex<f64>>, ax: usize, fft: &Arc<dyn Fft<f64>>) {
    let mut lanes: Vec<Vec<Complex<f64>>> = data
        .lanes(Axis(ax))
        .into_iter()
        .map(|lane| lane.to_vec())
        .collect();

    lanes.par_iter_mut().for_each(|lane| fft.process(lane));

    for (mut dst, src) in data.lanes_mut(Axis(ax)).into_iter().zip(lanes) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = s;
        }
    }
}

fn transform_axis_sequential(data: &mut ArrayD<Complex<f64>>, ax: usize, fft: &Arc<dyn Fft<f64>>) {
    let len = data.len_of(Axis(ax));
    let mut buf = vec![Complex::new(0.0, 0.0); len];
    for mut lane in data.lanes_mut(Axis(ax)) {
        for (b, v) in buf.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        fft.process(&mut buf);
        for (d, b) in lane.iter_mut().zip(buf.iter()) {
            *d = *b;
        }
    }
}

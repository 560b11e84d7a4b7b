use std::f64::consts::TAU;

use ndarray::{ArrayD, Dimension, IxDyn};
use num_complex::Complex;

use subpix::fft::{fftn, ifftn};

/// Deterministic xorshift64* generator for reproducible test images.
pub struct XorShift64(pub u64);

impl XorShift64 {
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform sample in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Array of independent uniform samples in [0, 1).
pub fn random_image(shape: &[usize], seed: u64) -> ArrayD<f64> {
    let mut rng = XorShift64(seed);
    let total: usize = shape.iter().product();
    let values: Vec<f64> = (0..total).map(|_| rng.next_f64()).collect();
    ArrayD::from_shape_vec(IxDyn(shape), values).expect("shape matches value count")
}

/// Smooth bright disk with quadratic falloff at the given center.
pub fn make_disk(h: usize, w: usize, cy: f64, cx: f64, radius: f64) -> ArrayD<f64> {
    let mut data = ArrayD::zeros(IxDyn(&[h, w]));
    for r in 0..h {
        for c in 0..w {
            let dy = r as f64 - cy;
            let dx = c as f64 - cx;
            let dist = (dy * dy + dx * dx).sqrt();
            if dist < radius {
                data[[r, c]] = 1.0 - (dist / radius).powi(2);
            }
        }
    }
    data
}

/// Circularly shift the array contents by `shift` samples per axis: the
/// element at `idx` moves to `idx + shift` (mod axis length).
pub fn circular_shift(data: &ArrayD<f64>, shift: &[isize]) -> ArrayD<f64> {
    let shape = data.shape().to_vec();
    let mut out = ArrayD::zeros(IxDyn(&shape));
    for (idx, &v) in data.indexed_iter() {
        let dst: Vec<usize> = idx
            .slice()
            .iter()
            .enumerate()
            .map(|(i, &s)| (s as isize + shift[i]).rem_euclid(shape[i] as isize) as usize)
            .collect();
        out[IxDyn(&dst)] = v;
    }
    out
}

/// Shift the array contents by a fractional `shift` per axis via a
/// Fourier-domain phase ramp (periodic boundary).
pub fn fourier_shift(data: &ArrayD<f64>, shift: &[f64]) -> ArrayD<f64> {
    let shape = data.shape().to_vec();
    let mut freq = data.mapv(|v| Complex::new(v, 0.0));
    fftn(&mut freq);

    for (idx, value) in freq.indexed_iter_mut() {
        let mut phase = 0.0;
        for (i, &k) in idx.slice().iter().enumerate() {
            let n = shape[i];
            let f = if k < (n + 1) / 2 {
                k as f64
            } else {
                k as f64 - n as f64
            };
            phase -= TAU * f * shift[i] / n as f64;
        }
        *value *= Complex::from_polar(1.0, phase);
    }

    ifftn(&mut freq);
    freq.mapv(|v| v.re)
}

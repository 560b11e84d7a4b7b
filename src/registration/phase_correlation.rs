//! Subpixel translation registration via FFT phase correlation.
//!
//! Two-stage approach:
//! 1. **Coarse**: full FFT cross-correlation, integer-pixel peak with
//!    wraparound folding.
//! 2. **Fine**: matrix-multiply upsampled DFT over a small window around the
//!    coarse peak, giving ~`1/upsample_factor` pixel accuracy.
//!
//! Reference: "Efficient subpixel image registration algorithms",
//!            M. Guizar-Sicairos, S. T. Thurman, J. R. Fienup,
//!            Optics Letters 33(2), 2008.

use ndarray::{Array, ArrayD, Dimension, IxDyn};
use num_complex::Complex;
use tracing::debug;

use crate::consts::{CROSS_POWER_EPS, UPSAMPLE_REGION_MARGIN};
use crate::error::{Result, SubpixError};
use crate::fft::{fftn, ifftn};

use super::upsampled_dft::upsampled_dft;

/// How the cross-power spectrum is scaled before the peak search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Normalization {
    /// Plain cross-correlation. Keeps the amplitude information the RMS
    /// error estimate relies on.
    #[default]
    None,
    /// Whiten every bin to unit magnitude (pure phase correlation). Bins
    /// with near-zero magnitude pass through unchanged. The `error` field of
    /// the result is not meaningful in this mode.
    Phase,
}

#[derive(Clone, Debug)]
pub struct RegistrationConfig {
    /// Subpixel refinement density; 1 disables refinement.
    pub upsample_factor: usize,
    pub normalization: Normalization,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            upsample_factor: 1,
            normalization: Normalization::None,
        }
    }
}

/// Outcome of a registration run.
#[derive(Clone, Debug)]
pub struct RegistrationResult {
    /// Estimated translation of `src` relative to `target`, one component
    /// per axis, in samples. Circularly shifting `target` by this vector
    /// reproduces `src`. Magnitudes never exceed half the axis extent at
    /// coarse precision; shifts past the midpoint fold to their negative
    /// equivalent.
    pub shift: Vec<f64>,
    /// Translation-invariant RMS error between the two inputs.
    pub error: f64,
    /// Phase angle of the cross-correlation value at the detected peak.
    /// Nonzero values indicate a global phase offset between the inputs.
    pub phase_diff: f64,
}

/// Estimate the translation between two equal-shape complex arrays.
///
/// `upsample_factor == 1` returns the whole-pixel estimate; larger values
/// refine it to ~`1 / upsample_factor` samples via a localized upsampled
/// DFT around the coarse peak.
///
/// Identically-zero inputs produce a flat correlation surface; the shift
/// then resolves (deterministically) to zero, but the error and phase
/// figures carry no information and may be NaN.
pub fn register<D: Dimension>(
    src: &Array<Complex<f64>, D>,
    target: &Array<Complex<f64>, D>,
    upsample_factor: usize,
) -> Result<RegistrationResult> {
    register_configured(
        src,
        target,
        &RegistrationConfig {
            upsample_factor,
            normalization: Normalization::None,
        },
    )
}

/// [`register`] for real-valued inputs.
pub fn register_real<D: Dimension>(
    src: &Array<f64, D>,
    target: &Array<f64, D>,
    upsample_factor: usize,
) -> Result<RegistrationResult> {
    let src = src.mapv(|v| Complex::new(v, 0.0));
    let target = target.mapv(|v| Complex::new(v, 0.0));
    register(&src, &target, upsample_factor)
}

/// Full-control registration entry point.
pub fn register_configured<D: Dimension>(
    src: &Array<Complex<f64>, D>,
    target: &Array<Complex<f64>, D>,
    config: &RegistrationConfig,
) -> Result<RegistrationResult> {
    if src.shape() != target.shape() {
        return Err(SubpixError::ShapeMismatch {
            src: src.shape().to_vec(),
            target: target.shape().to_vec(),
        });
    }
    if config.upsample_factor == 0 {
        return Err(SubpixError::InvalidUpsampleFactor(0));
    }

    let mut src_freq = src.to_owned().into_dyn();
    let mut target_freq = target.to_owned().into_dyn();
    fftn(&mut src_freq);
    fftn(&mut target_freq);

    let shape: Vec<usize> = src_freq.shape().to_vec();
    let total = src_freq.len() as f64;

    let mut image_product = &src_freq * &target_freq.mapv(|v| v.conj());
    if config.normalization == Normalization::Phase {
        image_product.mapv_inplace(|c| {
            let mag = c.norm();
            if mag > CROSS_POWER_EPS {
                c / mag
            } else {
                c
            }
        });
    }

    let mut cross_correlation = image_product.clone();
    ifftn(&mut cross_correlation);

    // Coarse peak; indices past the axis midpoint fold to negative shifts.
    let peak = argmax_magnitude(&cross_correlation);
    let mut shift: Vec<f64> = peak
        .iter()
        .zip(&shape)
        .map(|(&idx, &len)| {
            if idx > len / 2 {
                idx as f64 - len as f64
            } else {
                idx as f64
            }
        })
        .collect();
    debug!(?shift, "coarse correlation peak located");

    let ccmax;
    let src_amp;
    let target_amp;

    if config.upsample_factor == 1 {
        ccmax = cross_correlation[IxDyn(&peak)];
        src_amp = power_sum(&src_freq) / total;
        target_amp = power_sum(&target_freq) / total;
    } else {
        // Refine within one coarse pixel on the 1/upsample grid.
        let upsample = config.upsample_factor as f64;
        for s in shift.iter_mut() {
            *s = (*s * upsample).round() / upsample;
        }

        let region = (upsample * UPSAMPLE_REGION_MARGIN).ceil() as usize;
        let dftshift = (region / 2) as f64;
        let normalization = total * upsample * upsample;

        // Window centered on the rounded coarse estimate.
        let region_size = vec![region; shape.len()];
        let offsets: Vec<f64> = shift.iter().map(|&s| dftshift - s * upsample).collect();

        let mut patch = upsampled_dft(&image_product, &region_size, upsample, &offsets);
        patch.mapv_inplace(|v| v / normalization);

        let patch_peak = argmax_magnitude(&patch);
        ccmax = patch[IxDyn(&patch_peak)];
        for (s, &idx) in shift.iter_mut().zip(&patch_peak) {
            *s += (idx as f64 - dftshift) / upsample;
        }

        src_amp = power_sum(&src_freq) / normalization;
        target_amp = power_sum(&target_freq) / normalization;
    }

    // A size-1 axis carries no spatial information.
    for (s, &len) in shift.iter_mut().zip(&shape) {
        if len == 1 {
            *s = 0.0;
        }
    }

    let error = rms_error(ccmax, src_amp, target_amp);
    let phase_diff = ccmax.arg();
    debug!(?shift, error, phase_diff, "registration complete");

    Ok(RegistrationResult {
        shift,
        error,
        phase_diff,
    })
}

/// Multi-index of the magnitude maximum. Strict comparison over logical
/// row-major order, so ties resolve to the lowest flat index.
fn argmax_magnitude(data: &ArrayD<Complex<f64>>) -> Vec<usize> {
    let mut best_idx = vec![0; data.ndim()];
    let mut best_val = f64::NEG_INFINITY;
    for (idx, value) in data.indexed_iter() {
        let mag = value.norm();
        if mag > best_val {
            best_val = mag;
            best_idx = idx.slice().to_vec();
        }
    }
    best_idx
}

fn power_sum(freq: &ArrayD<Complex<f64>>) -> f64 {
    freq.iter().map(|v| v.norm_sqr()).sum()
}

/// Translation-invariant RMS error from the correlation peak and the two
/// input amplitudes. Floating-point error can push the magnitude ratio
/// slightly past 1, hence the absolute value under the root.
fn rms_error(ccmax: Complex<f64>, src_amp: f64, target_amp: f64) -> f64 {
    (1.0 - ccmax.norm_sqr() / (src_amp * target_amp)).abs().sqrt()
}

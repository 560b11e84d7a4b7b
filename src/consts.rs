/// Minimum total sample count to use Rayon parallelism in the FFT and
/// upsampled-DFT helpers.
pub const PARALLEL_SAMPLE_THRESHOLD: usize = 65_536;

/// Width (in coarse pixels) of the upsampled-DFT refinement window around the
/// coarse correlation peak. 1.5 keeps the true peak inside the window even
/// when it sits halfway between two coarse samples.
pub const UPSAMPLE_REGION_MARGIN: f64 = 1.5;

/// Magnitude below which a cross-power bin is left untouched by phase
/// normalization, to avoid dividing by zero.
pub const CROSS_POWER_EPS: f64 = 1e-12;

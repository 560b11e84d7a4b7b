pub mod phase_correlation;
pub mod upsampled_dft;

pub use phase_correlation::{
    register, register_configured, register_real, Normalization, RegistrationConfig,
    RegistrationResult,
};
pub use upsampled_dft::upsampled_dft;

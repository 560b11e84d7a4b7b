pub mod consts;
pub mod error;
pub mod fft;
pub mod registration;

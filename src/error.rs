use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubpixError {
    #[error("Shape mismatch: src {src:?} vs target {target:?}")]
    ShapeMismatch {
        src: Vec<usize>,
        target: Vec<usize>,
    },

    #[error("Invalid upsample factor: {0} (must be a positive integer)")]
    InvalidUpsampleFactor(usize),
}

pub type Result<T> = std::result::Result<T, SubpixError>;

use thiserror::Error;

/// Failures at the edges of the crate. Geometry generation itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("font data could not be parsed")]
    InvalidFont,

    #[error("frame buffer holds {actual} bytes but {expected} are required")]
    FrameSize { expected: usize, actual: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

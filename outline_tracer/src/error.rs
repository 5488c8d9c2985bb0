use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("Invalid mask: width and height must both be positive, but the mask is {width}x{height}.")]
    InvalidMask { width: usize, height: usize },

    #[error("Invalid mask dimensions: The data length must be equal to width * height = {0}, but is equal to {1}.")]
    InvalidDataDimensions(usize, usize),

    #[error("Tracing inconsistency: {0}")]
    TracingInconsistency(String),

    #[error("Invalid font metrics: {0}")]
    InvalidMetrics(String),
}
